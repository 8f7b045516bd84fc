use std::process::ExitCode;
use std::sync::Arc;

use fastfood::config::ServerConfig;
use fastfood::endpoints::create_http_router;
use fastfood::errors::Result;
use fastfood::http::HttpServer;
use fastfood::logging::setup_tracing;
use fastfood::state::AppState;
use tracing::{error, info};

fn run() -> Result<()> {
    let config = ServerConfig::load()?;
    let address = config.bind_address();
    let server = HttpServer::new(&address)?;
    let router = Arc::new(create_http_router()?);
    let state = Arc::new(AppState::new(config));

    info!("Fast Food Ordering App started");
    info!("Server: http://{}", address);
    info!("Health: http://{}/health", address);
    info!(
        "Menu items loaded: {}, static files from {}",
        state.catalog.len(),
        state.config.static_dir.display()
    );
    if state.config.strict_orders {
        info!("Strict order validation enabled");
    }

    server.serve(move |request| router.handle(request, &state));
    Ok(())
}

fn main() -> ExitCode {
    setup_tracing("info");
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Server stopped: {}", err);
            ExitCode::FAILURE
        }
    }
}
