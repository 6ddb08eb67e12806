use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use consola_api::config::ApiConfig;
use consola_api::handlers::configure_routes;
use consola_api::logging::init_logging;
use consola_api::{build_key_validator, build_state};

#[derive(Debug, Parser)]
#[command(name = "consola-api", version, about = "Settings and API key service")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project directory to open at startup
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, config_path) =
        ApiConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_logging(config.log_directory().as_deref())?;
    info!("Loaded configuration from {}", config_path.display());

    let validator = build_key_validator(&config).context("Failed to create key validator")?;
    let state = web::Data::new(build_state(&config, validator));

    let store = state.settings.current()?;
    info!("Using global settings at {}", store.global_path()?.display());
    if let Some(project) = args.project.as_deref() {
        store.open_project(project)?;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting consola-api server at http://{}", bind_addr);

    let allowed_origins = config.allowed_origins();
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Exiting ...");
    Ok(())
}
