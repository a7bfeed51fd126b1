use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use search_reindexer::cli::Cli;
use search_reindexer::logging::init_tracing;
use search_reindexer::shutdown::{self, ExitCode};
use search_reindexer::{Dependencies, Settings};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env();
    let log_format = settings
        .as_ref()
        .map(|settings| settings.log_format)
        .unwrap_or_default();
    init_tracing(cli.verbose, log_format);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::GeneralError.into();
        }
    };

    let cancel = CancellationToken::new();
    shutdown::register_handlers(cancel.clone());

    let result = async {
        let mut dependencies = Dependencies::new(&settings, &cli, cancel).await?;
        dependencies.run().await
    }
    .await;

    match result {
        Ok(summary) => {
            info!(%summary, "Search reindexer finished");
            ExitCode::Success.into()
        }
        Err(e) => {
            error!(error = %e, "Search reindexer failed");
            e.exit_code().into()
        }
    }
}
