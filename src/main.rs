// main.rs
mod api_auth;
mod api_routes;
mod catalog;
mod config;
mod data_loader;
mod error;
mod generator;
mod input_process;
mod interactive_mode;
mod logging_setup;
mod randomness;

use actix_web::HttpServer;
use anyhow::anyhow;
use dotenv::dotenv;
use log::{debug, error, info};
use std::io;

use api_routes::AppState;
use config::Config;
use data_loader::{load_dataset, DataOrigin};
use generator::IdeaGenerator;
use randomness::{RandomSource, SeededRandom, ThreadRandom};

fn to_io_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, anyhow!(e.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env().map_err(to_io_error)?;
    let backend = logging_setup::setup_logging(&config.log_config).map_err(to_io_error)?;

    info!("Starting Oráculo Alucinado (logging via {})", backend);
    debug!("Configuration: {:?}", config);

    let source = config.data_source();
    let dataset = load_dataset(&source).await;
    if dataset.origin == DataOrigin::Fallback {
        error!("Serving the built-in fallback dataset, {} was unusable", source);
    }
    info!(
        "Dataset ready: {} themes, {} connectors ({})",
        dataset.catalog.len(),
        dataset.connectors.phrases().len(),
        dataset.origin
    );

    let state = AppState {
        generator: IdeaGenerator::new(dataset.catalog, dataset.connectors),
        origin: dataset.origin,
    };

    if config.interactive {
        let generator = state.generator.clone();
        let seed = config.seed;
        // Spawn a new thread for the interactive console mode
        std::thread::spawn(move || {
            let stdin = io::stdin();
            // A fixed seed makes console sessions reproducible
            let mut rng: Box<dyn RandomSource> = match seed {
                Some(seed) => Box::new(SeededRandom::new(seed)),
                None => Box::new(ThreadRandom::default()),
            };
            if let Err(e) = interactive_mode::run_interactive_mode(stdin.lock(), io::stdout(), &generator, rng.as_mut()) {
                error!("Error in interactive mode: {}", e);
            }
        });
    }

    let api_key = config.api_key.clone();
    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        api_routes::build_app(state.clone(), api_key.clone())
    })
    .bind(config.bind_address())?
    .run()
    .await
}
