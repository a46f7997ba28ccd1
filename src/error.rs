//! # Errores del servidor
//! src/error.rs
//!
//! Solo los errores que terminan el proceso llegan a ser `ServerError`.
//! Los errores por request (archivo inexistente, path inválido) se
//! responden como status HTTP y los fallos del navegador solo se loguean.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Falta el archivo de entrada del dashboard en el document root
    #[error("required file not found: {}", path.display())]
    MissingRequiredFile { path: PathBuf },

    /// Ningún puerto del rango se pudo bindear
    #[error("no available port between {start} and {end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot load headers file {}: {reason}", path.display())]
    HeadersFile { path: PathBuf, reason: String },

    /// Cualquier otro fallo de I/O durante el arranque
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    /// Código de salida del proceso; toda falla de arranque es 1
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ServerError::NoAvailablePort { start: 8000, end: 8100 };
        assert_eq!(err.to_string(), "no available port between 8000 and 8100");

        let err = ServerError::MissingRequiredFile {
            path: PathBuf::from("site/dashboard-modern.html"),
        };
        assert!(err.to_string().contains("dashboard-modern.html"));
    }

    #[test]
    fn test_io_conversion() {
        let err: ServerError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ServerError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
