use std::process::ExitCode;

use dotenvy::dotenv;
use log::{debug, error};
use vibelist::{config::Config, server};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    debug!("{config:?}");

    if let Err(err) = server::serve(config).await {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
