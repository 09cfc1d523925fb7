use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::StartupError;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = config::Config::load()?;
    let addr = cfg.get_socket_addr().map_err(StartupError::InvalidAddress)?;
    let state = config::AppState::new(&cfg).map_err(|source| StartupError::Root {
        root: cfg.server.root.clone(),
        source,
    })?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Create the Tokio runtime; `workers` overrides the CPU-count default
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(addr, Arc::new(state)))
}

async fn async_main(
    addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
) -> Result<(), StartupError> {
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&state.config);

    server::run_server(listener, state, async {
        let signal = server::signal::wait_for_shutdown().await;
        logger::log_shutdown(signal);
    })
    .await;

    Ok(())
}
