//! # Selección de Puerto
//! src/server/port.rs
//!
//! Recorre el rango `[start, end)` en orden ascendente e intenta bindear
//! cada puerto; el primero que funciona gana. El socket de prueba se
//! libera en seguida, antes de retornar.

use crate::error::{ServerError, ServerResult};
use std::net::TcpListener;

/// Primer puerto libre en `[start, end)` para `host`
///
/// # Errores
///
/// `NoAvailablePort` si ningún puerto del rango se pudo bindear.
pub fn find_free_port(host: &str, start: u16, end: u16) -> ServerResult<u16> {
    for port in start..end {
        match TcpListener::bind((host, port)) {
            Ok(probe) => {
                drop(probe);
                return Ok(port);
            }
            Err(e) => {
                tracing::debug!("port {} unavailable: {}", port, e);
            }
        }
    }

    Err(ServerError::NoAvailablePort { start, end })
}
