//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas y convertirlas a bytes.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Content-Length: 13\r\n
//! Access-Control-Allow-Origin: *\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! Los headers se guardan en orden de inserción para que la salida sea
//! determinista; volver a poner un header con el mismo nombre (sin importar
//! mayúsculas) reemplaza su valor en el lugar original.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use static_cors_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hola");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::StatusCode;
use std::io::{self, Write};

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega o reemplaza un header (versión builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega o reemplaza un header
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::http::{Response, StatusCode};
    ///
    /// let mut response = Response::new(StatusCode::Ok);
    /// response.add_header("Cache-Control", "no-store");
    /// response.add_header("cache-control", "public, max-age=3600");
    ///
    /// assert_eq!(response.headers().len(), 1);
    /// assert_eq!(response.header("Cache-Control"), Some("public, max-age=3600"));
    /// ```
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el body desde bytes y calcula `Content-Length`
    ///
    /// Útil para imágenes y demás archivos binarios.
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Página de error HTML, al estilo del handler estático estándar
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "File not found");
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Error response</title>\n</head>\n<body>\n\
             <h1>Error response</h1>\n<p>Error code: {}</p>\n<p>Message: {}.</p>\n\
             </body>\n</html>\n",
            status.as_u16(),
            escape_html(message)
        );
        Self::new(status)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(&body)
    }

    /// Convierte la respuesta completa a bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(256 + self.body.len());
        // Escribir a un Vec no falla
        let _ = self.write_to(&mut result, true);
        result
    }

    /// Escribe status line, headers y (opcionalmente) el body.
    ///
    /// Con `include_body == false` se usa para HEAD: los headers, incluido
    /// `Content-Length`, describen el recurso aunque no se envíe.
    pub fn write_to<W: Write>(&self, out: &mut W, include_body: bool) -> io::Result<usize> {
        let mut head = format!("HTTP/1.0 {}\r\n", self.status);
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        out.write_all(head.as_bytes())?;
        let mut written = head.len();

        if include_body && self.status.allows_body() {
            out.write_all(&self.body)?;
            written += self.body.len();
        }

        Ok(written)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers en orden de inserción
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header sin importar mayúsculas/minúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Escapa `& < > " '` para insertar texto en HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
