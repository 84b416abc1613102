mod consumer;
mod setup;

use cloudlens_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    setup::init_telemetry();

    // Wire storage, classifier, and the pipeline
    let pipeline = setup::build_pipeline(&config).await?;

    // Consume object-created events until shutdown
    consumer::run(&config, pipeline).await?;

    Ok(())
}
