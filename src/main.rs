use clap::Parser;
use rollcall::app::App;
use rollcall::cli::{self, Cli, Commands};
use rollcall::config::Config;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let mut config = if args.config.exists() {
        match Config::load(&args.config) {
            Ok(config) => config,
            Err(e) => {
                cli::output::error(&format!("Failed to load config: {e}"));
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    config.logging.init();

    let app = match App::build(config) {
        Ok(app) => app,
        Err(e) => {
            cli::output::error(&format!("Failed to start: {e}"));
            std::process::exit(1);
        }
    };

    let result = match &args.command {
        Commands::Enroll(enroll_args) => cli::enroll::execute(&app, enroll_args).await,
        Commands::Scan(scan_args) => cli::scan::execute(&app, scan_args).await,
        Commands::Record(record_args) => cli::record::execute(&app, record_args).await,
        Commands::Sync => cli::sync::execute(&app).await,
        Commands::Stats(stats_args) => cli::stats::execute(&app, stats_args).await,
        Commands::Status => cli::status::execute(&app).await,
        Commands::Seed => cli::seed::execute(&app).await,
    };

    app.shutdown().await;

    if let Err(e) = result {
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
    info!("done");
}
