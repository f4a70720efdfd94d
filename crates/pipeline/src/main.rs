use imgharvest_pipeline::cli::Cli;
use imgharvest_pipeline::HarvestConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "imgharvest=info,imgharvest_pipeline=info,imgharvest_search=info,imgharvest_db=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse_normalized();

    let config = match HarvestConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return;
        }
    };
    tracing::info!(
        query = %config.query,
        max = config.max_images,
        output_dir = %config.output_dir.display(),
        "Loaded configuration"
    );

    // Failures are reported, not turned into a non-zero exit status.
    if let Err(e) = imgharvest_pipeline::run(&config).await {
        tracing::error!(error = %e, "Harvest aborted");
    }
}
