//! # Códigos de Estado HTTP
//!
//! Códigos que puede devolver el servidor de archivos estáticos.
//!
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección de directorios (301) y GET condicional (304)
//! - **4xx**: Error del cliente (400, 403, 404)
//! - **5xx**: Error del servidor (500) y métodos sin soporte (501)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 301 Moved Permanently - Directorio pedido sin `/` final
    MovedPermanently = 301,

    /// 304 Not Modified - El archivo no cambió desde `If-Modified-Since`
    NotModified = 304,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 403 Forbidden
    Forbidden = 403,

    /// 404 Not Found - Archivo no encontrado o fuera del document root
    NotFound = 404,

    /// 500 Internal Server Error - Error de I/O leyendo un archivo ya abierto
    InternalServerError = 500,

    /// 501 Not Implemented - Método que un servidor estático no atiende
    NotImplemented = 501,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// Indica si la respuesta puede llevar body.
    ///
    /// 304 nunca lleva body (RFC 7232).
    pub fn allows_body(&self) -> bool {
        !matches!(self, StatusCode::NotModified)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
