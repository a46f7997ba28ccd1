//! # Static CORS Server
//! src/lib.rs
//!
//! Servidor HTTP local para desarrollo: sirve los archivos estáticos del
//! dashboard y del sitio agregando headers CORS permisivos, para que el
//! frontend pueda hablar con el backend de Storage/Auth en la nube.
//!
//! ## Arquitectura
//!
//! - `config`: CLI, variables de entorno y perfiles de headers
//! - `error`: errores que terminan el proceso
//! - `http`: parsing de requests y serialización de responses
//! - `headers`: CORS, seguridad y cache por extensión
//! - `static_files`: resolución de paths, archivos y listados
//! - `handler`: arma la respuesta de cada request
//! - `server`: selección de puerto, accept loop y apagado
//! - `browser`: apertura diferida del navegador
//! - `console`: banners e instrucciones
//! - `app`: orden de arranque
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use static_cors_server::app;
//! use static_cors_server::config::ServerConfig;
//! use static_cors_server::server::ShutdownHandle;
//!
//! let config = ServerConfig::default();
//! app::run(config, ShutdownHandle::new()).expect("Error al iniciar servidor");
//! ```

pub mod app;
pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod handler;
pub mod headers;
pub mod http;
pub mod server;
pub mod static_files;
