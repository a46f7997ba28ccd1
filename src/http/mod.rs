//! # Módulo HTTP
//!
//! Implementa la parte del protocolo que necesita un servidor de archivos
//! estáticos, sin librerías de alto nivel:
//!
//! - Parsing de la cabecera de requests HTTP/1.0 y HTTP/1.1
//! - Construcción de responses
//! - Status codes
//! - Fechas HTTP para `Date`, `Last-Modified` e `If-Modified-Since`
//!
//! Las respuestas salen como HTTP/1.0 con `Connection: close`: una
//! conexión, un request.

pub mod date;
pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
