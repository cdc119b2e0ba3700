use tracing::error;
use wellscrape::commands::command_argument_builder;
use wellscrape::handlers::run;
use wellscrape::logging::{init_logging, init_logging_stderr};
use wellscrape_core::ScraperConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Only --help and --version; clap exits on either
    let _ = command_argument_builder().get_matches();

    let config = ScraperConfig::default();
    if let Err(e) = init_logging(&config.data_root) {
        eprintln!("Could not open log file under {}: {:#}", config.data_root.display(), e);
        init_logging_stderr();
    }

    if let Err(e) = run(config).await {
        error!("Run failed: {:#}", e);
        std::process::exit(1);
    }
}
