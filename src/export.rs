use crate::errors::ExportError;
use chrono::{DateTime, TimeZone};
use reqwest::StatusCode;
use std::io::{Cursor, Write};
use std::time::Duration;
use tracing;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

pub fn caption_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("caption_{}.txt", now.format("%Y%m%d_%H%M"))
}

pub fn bundle_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("post_{}.zip", now.format("%Y%m%d_%H%M"))
}

/// Fetches the chosen image so it can be bundled with the caption.
pub async fn download_image(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, ExportError> {
    tracing::debug!(%url, "Export: downloading image");
    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        tracing::warn!(%url, status = %response.status(), "Export: image download refused");
        return Err(ExportError::DownloadStatus(response.status().as_u16()));
    }
    let bytes = response.bytes().await?;
    tracing::debug!(%url, size = bytes.len(), "Export: image downloaded");
    Ok(bytes.to_vec())
}

/// Zip archive holding `caption.txt` and `image.jpg`.
pub fn build_bundle(caption: &str, image: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("caption.txt", options)?;
    zip.write_all(caption.as_bytes())?;
    zip.start_file("image.jpg", options)?;
    zip.write_all(image)?;

    Ok(zip.finish()?.into_inner())
}
