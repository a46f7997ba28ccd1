//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser de la cabecera de un request HTTP/1.0 o HTTP/1.1.
//!
//! ## Formato
//!
//! ```text
//! GET /css/app.css?v=3 HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! Origin: http://localhost:5173\r\n
//! \r\n
//! ```
//!
//! El servidor solo sirve archivos, así que el body del request se ignora:
//! los uploads van directo del navegador al backend en la nube.

use std::collections::HashMap;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    PATCH,
}

impl Method {
    /// Parsea un método HTTP desde un string
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es uno de los reconocidos
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "OPTIONS" => Ok(Method::OPTIONS),
            "PATCH" => Ok(Method::PATCH),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

/// Representa la cabecera de un request HTTP ya parseada
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Target tal como llegó en la request line (ej: "/img/logo.png?v=2")
    target: String,

    /// Path decodificado, sin query string (ej: "/img/logo.png")
    path: String,

    /// Query string cruda, sin el '?'
    query: Option<String>,

    /// Headers con el nombre en minúsculas
    headers: HashMap<String, String>,

    /// "HTTP/1.0" o "HTTP/1.1"
    version: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método HTTP no reconocido
    UnsupportedMethod(String),

    /// Versión HTTP distinta de 1.0/1.1
    InvalidHttpVersion(String),

    /// Header malformado
    InvalidHeader(String),

    /// Request vacío
    EmptyRequest,

    /// La cabecera no terminó dentro del tamaño máximo
    HeadTooLarge,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::HeadTooLarge => write!(f, "Request head too large"),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea la cabecera de un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use static_cors_server::http::Request;
    ///
    /// let raw = b"GET /index.html?v=1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.query(), Some("v=1"));
    /// assert_eq!(request.header("HOST"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let request_str =
            std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidRequestLine)?;

        if request_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = request_str.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;

        let (method, target, version) = Self::parse_request_line(request_line)?;
        let (path, query) = Self::split_target(&target);
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            target,
            path,
            query,
            headers,
            version,
        })
    }

    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_str(parts[0])?;

        let target = parts[1].to_string();
        if !target.starts_with('/') {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, target, version))
    }

    /// "/a%20b.html?x=1" → ("/a b.html", Some("x=1"))
    ///
    /// El fragmento (`#...`) no debería llegar nunca, pero se descarta igual.
    fn split_target(target: &str) -> (String, Option<String>) {
        let without_fragment = target.split('#').next().unwrap_or(target);

        match without_fragment.split_once('?') {
            Some((path, query)) => (url_decode(path), Some(query.to_string())),
            None => (url_decode(without_fragment), None),
        }
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            // La línea vacía marca el fin de los headers
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Target original de la request line
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Path decodificado, sin query string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header sin importar mayúsculas/minúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Decodifica secuencias `%XX` de un path.
///
/// Los bytes decodificados se reinterpretan como UTF-8 (con reemplazo),
/// así `%C3%A9` produce `é`. Un `%` sin dos dígitos hex queda literal.
/// En paths `+` no significa espacio, así que no se toca.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
