use lambda_runtime::{service_fn, Error, LambdaEvent};
use log_pipeline_core::clock::SystemClock;
use log_pipeline_core::contract::SuccessEnvelope;
use log_pipeline_lambda::adapters::s3::S3ObjectStore;
use log_pipeline_lambda::config::HandlerConfig;
use log_pipeline_lambda::handlers::batch::LogProcessor;
use log_pipeline_lambda::logging::init_tracing;
use serde_json::Value;

type S3LogProcessor = LogProcessor<S3ObjectStore, SystemClock>;

async fn handle_request(
    processor: &S3LogProcessor,
    event: LambdaEvent<Value>,
) -> Result<SuccessEnvelope, Error> {
    processor
        .handle_event(&event.payload)
        .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = HandlerConfig::from_env().map_err(|error| {
        tracing::error!(%error, "invalid handler configuration");
        error
    })?;
    tracing::info!(
        destination_bucket = %config.destination_bucket,
        key_strategy = config.key_strategy.as_str(),
        required_fields = ?config.required_fields.fields(),
        "log processor configured"
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let processor = LogProcessor::new(
        config,
        S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)),
        SystemClock,
    );

    lambda_runtime::run(service_fn(|event| handle_request(&processor, event))).await
}
