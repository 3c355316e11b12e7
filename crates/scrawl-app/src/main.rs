//! Main application entry point (native).

use clap::Parser;
use scrawl_app::{now_epoch_ms, App, AppConfig, AppResult, Cli};

fn run(cli: Cli) -> AppResult<String> {
    let app = App::new(AppConfig::from_env()?)?;
    app.run(cli.command(), now_epoch_ms())
}

fn main() {
    let cli = Cli::parse();
    env_logger::init();
    log::info!("Starting Scrawl");

    match run(cli) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("scrawl: {}", e);
            std::process::exit(1);
        }
    }
}
