//! # Handler de Requests
//! src/handler/mod.rs
//!
//! ## Arquitectura
//!
//! ```text
//! Request → RequestHandler ─┬─ OPTIONS    → 200 vacío
//!                           ├─ GET/HEAD   → StaticFiles
//!                           └─ otro       → 501
//!                                 ↓
//!                     HeaderPolicy::decorate + headers comunes
//!                                 ↓
//!                              Response
//! ```
//!
//! El handler no guarda estado entre requests: se comparte entre los
//! threads de conexión detrás de un `Arc`.

use crate::config::ServerConfig;
use crate::headers::HeaderPolicy;
use crate::http::date::format_http_date;
use crate::http::{Method, ParseError, Request, Response, StatusCode};
use crate::static_files::StaticFiles;
use std::time::SystemTime;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct RequestHandler {
    files: StaticFiles,
    policy: HeaderPolicy,
}

impl RequestHandler {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            files: StaticFiles::new(config.document_root.clone()),
            policy: HeaderPolicy::new(config),
        }
    }

    /// Produce la respuesta completa para un request ya parseado
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::config::ServerConfig;
    /// use static_cors_server::handler::RequestHandler;
    /// use static_cors_server::http::{Request, StatusCode};
    ///
    /// let handler = RequestHandler::new(&ServerConfig::default());
    /// let request = Request::parse(b"OPTIONS /anything HTTP/1.1\r\n\r\n").unwrap();
    /// let response = handler.handle(&request);
    ///
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// assert!(response.body().is_empty());
    /// assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    /// ```
    pub fn handle(&self, request: &Request) -> Response {
        let response = match request.method() {
            // Preflight: no se toca el filesystem
            Method::OPTIONS => Response::new(StatusCode::Ok).with_body(""),
            Method::GET | Method::HEAD => self.files.serve(request),
            other => Response::error(
                StatusCode::NotImplemented,
                &format!("Unsupported method ('{}')", other.as_str()),
            ),
        };

        self.finish(request.path(), response)
    }

    /// Respuesta para un request que no se pudo parsear
    pub fn reject(&self, error: &ParseError) -> Response {
        let response = match error {
            ParseError::UnsupportedMethod(method) => Response::error(
                StatusCode::NotImplemented,
                &format!("Unsupported method ('{}')", method),
            ),
            other => Response::error(StatusCode::BadRequest, &format!("Bad request ({})", other)),
        };

        self.finish("", response)
    }

    /// Headers de la política más los comunes a toda respuesta
    fn finish(&self, path: &str, mut response: Response) -> Response {
        self.policy.decorate(path, &mut response);
        add_common_headers(&mut response);
        response
    }
}

fn add_common_headers(response: &mut Response) {
    response.add_header("Server", SERVER_NAME);
    response.add_header("Date", &format_http_date(SystemTime::now()));
    response.add_header("Connection", "close");
}

/// Paths que no vale la pena loguear: favicons y sondas `/.well-known/...`
/// que el navegador y las DevTools piden solos.
///
/// # Ejemplo
/// ```
/// use static_cors_server::handler::is_noise;
///
/// assert!(is_noise("/favicon.ico"));
/// assert!(is_noise("/.well-known/appspecific/com.chrome.devtools.json"));
/// assert!(!is_noise("/dashboard-modern.html"));
/// ```
pub fn is_noise(path: &str) -> bool {
    path.ends_with(".ico") || path.starts_with("/.well-known")
}

/// Una línea de access log por request, salvo ruido.
///
/// Formato: `"GET /index.html HTTP/1.1" 200 1534`
pub fn log_access(request: &Request, status: StatusCode, bytes: usize) {
    if is_noise(request.path()) {
        return;
    }

    let line = format!(
        "{} {} {}",
        request.method().as_str(),
        request.target(),
        request.version()
    );
    tracing::info!("{}", access_line(&line, status, bytes));
}

/// Access log de un request que no se pudo parsear: se usa la primera
/// línea tal como llegó.
pub fn log_rejected(raw_head: &[u8], status: StatusCode, bytes: usize) {
    tracing::info!("{}", access_line(&request_line(raw_head), status, bytes));
}

/// Primera línea de la cabecera, con bytes inválidos reemplazados y
/// caracteres de control escapados
pub fn request_line(raw_head: &[u8]) -> String {
    let end = raw_head
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(raw_head.len());
    let end = end.min(MAX_LOGGED_LINE);

    String::from_utf8_lossy(&raw_head[..end])
        .chars()
        .flat_map(char::escape_default)
        .collect()
}

const MAX_LOGGED_LINE: usize = 200;

fn access_line(request_line: &str, status: StatusCode, bytes: usize) -> String {
    format!("\"{}\" {} {}", request_line, status.as_u16(), bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderProfile;
    use std::fs;
    use tempfile::TempDir;

    fn handler_for(dir: &TempDir, profile: HeaderProfile) -> RequestHandler {
        let config = ServerConfig {
            document_root: dir.path().to_path_buf(),
            profile,
            cors_headers: profile.cors_headers(),
            security_headers: profile.security_headers(),
            cache_rules: profile.cache_rules(),
            ..ServerConfig::default()
        };
        RequestHandler::new(&config)
    }

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Site</h1>").unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        dir
    }

    fn request(raw: &str) -> Request {
        Request::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_options_short_circuits_on_any_path() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Optimized);

        for path in ["/anything", "/missing.xyz", "/index.html", "/"] {
            let response = handler.handle(&request(&format!("OPTIONS {} HTTP/1.1\r\n\r\n", path)));
            assert_eq!(response.status(), StatusCode::Ok, "path {}", path);
            assert!(response.body().is_empty());
            assert_eq!(response.header("Content-Length"), Some("0"));
            assert_eq!(
                response.header("Access-Control-Allow-Methods"),
                Some("GET, POST, PUT, DELETE, OPTIONS, PATCH")
            );
        }
    }

    #[test]
    fn test_options_in_local_profile() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Local);

        let response = handler.handle(&request("OPTIONS /upload HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Access-Control-Allow-Headers"), Some("Content-Type"));
    }

    #[test]
    fn test_get_is_decorated() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Optimized);

        let response = handler.handle(&request("GET /app.js HTTP/1.1\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Cache-Control"), Some("public, max-age=3600"));
        assert_eq!(response.header("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(response.header("Server"), Some(SERVER_NAME));
        assert_eq!(response.header("Connection"), Some("close"));
        assert!(response.header("Date").is_some());
    }

    #[test]
    fn test_not_found_is_decorated_too() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Optimized);

        let response = handler.handle(&request("GET /missing.xyz HTTP/1.1\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_write_methods_not_implemented() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Optimized);

        for method in ["POST", "PUT", "DELETE", "PATCH"] {
            let response = handler.handle(&request(&format!("{} /index.html HTTP/1.1\r\n\r\n", method)));
            assert_eq!(response.status(), StatusCode::NotImplemented);
            assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[test]
    fn test_reject_parse_errors() {
        let dir = site();
        let handler = handler_for(&dir, HeaderProfile::Simple);

        let response = handler.reject(&ParseError::UnsupportedMethod("BREW".to_string()));
        assert_eq!(response.status(), StatusCode::NotImplemented);

        let response = handler.reject(&ParseError::InvalidRequestLine);
        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_access_line_format() {
        assert_eq!(
            access_line("GET /index.html HTTP/1.1", StatusCode::Ok, 1534),
            "\"GET /index.html HTTP/1.1\" 200 1534"
        );
    }

    #[test]
    fn test_request_line_of_rejected_head() {
        assert_eq!(request_line(b"BREW /pot HTTP/1.1\r\nHost: x\r\n\r\n"), "BREW /pot HTTP/1.1");
        assert_eq!(request_line(b"sin fin de linea"), "sin fin de linea");
        assert_eq!(request_line(b"\x00\x01GET"), "\\u{0}\\u{1}GET");
        assert_eq!(request_line(b""), "");

        let long = vec![b'a'; 1000];
        assert_eq!(request_line(&long).len(), MAX_LOGGED_LINE);
    }

    #[test]
    fn test_is_noise() {
        assert!(is_noise("/static/favicon.ico"));
        assert!(!is_noise("/login.html"));
        assert!(!is_noise("/docs/.well-known.txt"));
    }
}
