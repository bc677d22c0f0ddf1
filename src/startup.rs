use crate::errors::AppError;
use aws_sdk_dynamodb::{
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
    Client as DynamoDbClient, error::SdkError as DynamoSdkError,
};
use tracing;

/// Creates the posts table if it doesn't exist.
async fn create_posts_table_if_not_exists(client: &DynamoDbClient, table_name: &str) -> Result<(), AppError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("post_id")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("post_id")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;
    match result {
        Ok(_) => {
            tracing::info!("Startup: Table '{}' created successfully or setup initiated.", table_name);
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: Table '{}' already exists, no action needed.", table_name);
                    Ok(())
                } else {
                    let context = format!("Startup: Service error creating DynamoDB table '{}'", table_name);
                    tracing::error!("{}: {:?}", context, service_err);
                    Err(AppError::InitError(format!("{}: {}", context, e)))
                }
            } else {
                let context = format!("Startup: SDK error creating DynamoDB table '{}'", table_name);
                tracing::error!("{}: {}", context, e);
                Err(AppError::InitError(format!("{}: {}", context, e)))
            }
        }
    }
}

/// Initializes the AWS resources the post history needs.
pub async fn init_resources(db_client: &DynamoDbClient, table_name: &str) -> Result<(), AppError> {
    tracing::info!("Startup: Initializing AWS resources...");
    create_posts_table_if_not_exists(db_client, table_name).await?;
    tracing::info!("Startup: AWS resource initialization complete.");
    Ok(())
}
