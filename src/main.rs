//! # Static CORS Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: logging, configuración, señales y arranque.
//! Sale con 0 al detenerse con Ctrl+C y con 1 si no pudo arrancar.

use static_cors_server::app;
use static_cors_server::config::Config;
use static_cors_server::console;
use static_cors_server::server::{install_signal_handler, ShutdownHandle};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

fn main() {
    // Las señales se bloquean antes de crear cualquier thread
    let shutdown = ShutdownHandle::new();
    if let Err(e) = install_signal_handler(shutdown.clone()) {
        eprintln!("💥 No se pudo instalar el manejo de señales: {}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_target(false)
        .init();

    let config = match Config::new().into_server_config() {
        Ok(config) => config,
        Err(e) => {
            console::print_startup_error(&e);
            std::process::exit(e.exit_code());
        }
    };

    config.print_summary();

    if let Err(e) = app::run(config, shutdown) {
        tracing::error!("{}", e);
        console::print_startup_error(&e);
        std::process::exit(e.exit_code());
    }
}
