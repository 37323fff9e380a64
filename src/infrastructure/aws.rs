//! Shared AWS SDK configuration loading

/// Load the AWS SDK configuration, optionally pinned to a region
pub async fn load_sdk_config(region: Option<&str>) -> aws_config::SdkConfig {
    match region {
        Some(region) => {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region.to_string()))
                .load()
                .await
        }
        None => aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await,
    }
}
