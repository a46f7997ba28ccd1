//! # Política de Headers
//! src/headers/mod.rs
//!
//! Decora cada respuesta, justo antes de escribirla, con:
//!
//! 1. Headers CORS del perfil (origin, métodos, headers permitidos/expuestos)
//! 2. Headers de seguridad (`nosniff`, `SAMEORIGIN`)
//! 3. La regla de cache que corresponda a la extensión del path
//!
//! Las extensiones sin regla conservan lo que haya puesto el handler.

use crate::config::{CacheRule, HeaderList, ServerConfig};
use crate::http::Response;

#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    cors: HeaderList,
    security: HeaderList,
    cache_rules: Vec<CacheRule>,
}

impl HeaderPolicy {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            cors: config.cors_headers.clone(),
            security: config.security_headers.clone(),
            cache_rules: config.cache_rules.clone(),
        }
    }

    /// Regla de cache para un path, comparando la extensión sin
    /// distinguir mayúsculas.
    ///
    /// # Ejemplo
    /// ```
    /// use static_cors_server::config::ServerConfig;
    /// use static_cors_server::headers::HeaderPolicy;
    ///
    /// let policy = HeaderPolicy::new(&ServerConfig::default());
    /// let rule = policy.cache_rule_for("/img/Logo.PNG").unwrap();
    /// assert_eq!(rule.cache_control, "public, max-age=3600");
    /// assert!(policy.cache_rule_for("/data.json").is_none());
    /// ```
    pub fn cache_rule_for(&self, path: &str) -> Option<&CacheRule> {
        let path = path.to_ascii_lowercase();
        self.cache_rules
            .iter()
            .find(|rule| path.ends_with(&rule.extension.to_ascii_lowercase()))
    }

    /// Aplica CORS, seguridad y cache a una respuesta.
    ///
    /// `path` es el path decodificado del request, sin query string.
    pub fn decorate(&self, path: &str, response: &mut Response) {
        for (name, value) in self.cors.iter().chain(self.security.iter()) {
            response.add_header(name, value);
        }

        if let Some(rule) = self.cache_rule_for(path) {
            response.add_header("Cache-Control", &rule.cache_control);
            for (name, value) in &rule.extra_headers {
                response.add_header(name, value);
            }
        }
    }
}
