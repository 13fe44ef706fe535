use std::process::ExitCode;
use std::sync::Arc;

use static_file_server::config::{AppState, Config};
use static_file_server::error::StartupError;
use static_file_server::{logger, server};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = Config::load()?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {workers} worker threads");
    } else {
        println!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;

    println!("Server is running on :{}...", cfg.server.port);
    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

    let state = Arc::new(AppState::new(&cfg));
    logger::log_server_start(&addr, &cfg, &state.root);

    server::start_server_loop(listener, state).await;
    Ok(())
}
