//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `port`: elige el primer puerto libre del rango
//! - `tcp`: accept loop, un thread por conexión
//! - `shutdown`: bandera de apagado y espera de señales

pub mod port;
pub mod shutdown;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use port::find_free_port;
pub use shutdown::{install_signal_handler, ShutdownHandle, SignalAction};
pub use tcp::Server;
