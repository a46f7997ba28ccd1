//! # Configuración del Servidor
//! src/config.rs
//!
//! Dos capas:
//!
//! - [`Config`]: lo que llega por CLI y variables de entorno (clap).
//! - [`ServerConfig`]: el valor inmutable que recibe el servidor, con los
//!   headers CORS y las reglas de cache ya resueltos según el perfil y el
//!   archivo de overrides opcional.
//!
//! Sin argumentos, el servidor se comporta como la variante "optimized":
//! rango de puertos 8000-8100, headers CORS completos, headers de
//! seguridad, cache por extensión y navegador abierto en el dashboard.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./static_cors_server --root ./site --profile simple --no-browser
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! PORT_START=9000 PORT_END=9010 DOCUMENT_ROOT=./site ./static_cors_server
//! ```
//!
//! ### Archivo de headers
//! ```json
//! {
//!   "cors_headers": { "Access-Control-Allow-Origin": "http://localhost:5173" },
//!   "cache_rules": { ".webp": "public, max-age=86400" }
//! }
//! ```

use crate::error::{ServerError, ServerResult};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lista ordenada de headers `(nombre, valor)`
pub type HeaderList = Vec<(String, String)>;

/// Conjunto de headers de cada una de las variantes del servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderProfile {
    /// CORS completo para Storage/Auth, seguridad y cache por extensión
    Optimized,
    /// CORS básico: métodos enumerados y solo `Content-Type`
    Local,
    /// Todo permitido con `*`
    Simple,
}

impl HeaderProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderProfile::Optimized => "optimized",
            HeaderProfile::Local => "local",
            HeaderProfile::Simple => "simple",
        }
    }

    /// Headers CORS que se agregan a todas las respuestas
    pub fn cors_headers(&self) -> HeaderList {
        let pairs: &[(&str, &str)] = match self {
            HeaderProfile::Optimized => &[
                ("Access-Control-Allow-Origin", "*"),
                (
                    "Access-Control-Allow-Methods",
                    "GET, POST, PUT, DELETE, OPTIONS, PATCH",
                ),
                (
                    "Access-Control-Allow-Headers",
                    "Content-Type, Authorization, X-Requested-With, Origin, Accept, \
                     X-Firebase-Storage, X-Firebase-Auth",
                ),
                (
                    "Access-Control-Expose-Headers",
                    "Content-Length, Content-Type, Date, Server, X-Firebase-Storage",
                ),
                ("Access-Control-Max-Age", "86400"),
            ],
            HeaderProfile::Local => &[
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Methods", "GET, POST, OPTIONS, PUT, DELETE"),
                ("Access-Control-Allow-Headers", "Content-Type"),
            ],
            HeaderProfile::Simple => &[
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Methods", "*"),
                ("Access-Control-Allow-Headers", "*"),
            ],
        };
        to_header_list(pairs)
    }

    pub fn security_headers(&self) -> HeaderList {
        match self {
            HeaderProfile::Optimized => to_header_list(&[
                ("X-Content-Type-Options", "nosniff"),
                ("X-Frame-Options", "SAMEORIGIN"),
            ]),
            HeaderProfile::Local | HeaderProfile::Simple => Vec::new(),
        }
    }

    pub fn cache_rules(&self) -> Vec<CacheRule> {
        match self {
            HeaderProfile::Optimized => {
                let mut rules = vec![CacheRule::new(".html", "no-cache, no-store, must-revalidate")
                    .with_extra("Pragma", "no-cache")
                    .with_extra("Expires", "0")];
                for ext in [".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg"] {
                    rules.push(CacheRule::new(ext, "public, max-age=3600"));
                }
                rules
            }
            HeaderProfile::Local | HeaderProfile::Simple => Vec::new(),
        }
    }
}

fn to_header_list(pairs: &[(&str, &str)]) -> HeaderList {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Regla `extensión → Cache-Control`, con headers extra opcionales
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRule {
    /// Incluye el punto: ".html"
    pub extension: String,
    pub cache_control: String,
    /// Headers adicionales (p.ej. `Pragma` y `Expires` para HTML)
    pub extra_headers: HeaderList,
}

impl CacheRule {
    pub fn new(extension: &str, cache_control: &str) -> Self {
        Self {
            extension: extension.to_string(),
            cache_control: cache_control.to_string(),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_extra(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Contenido del archivo `--headers-file`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderOverrides {
    #[serde(default)]
    pub cors_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub security_headers: BTreeMap<String, String>,
    /// extensión → valor de `Cache-Control`
    #[serde(default)]
    pub cache_rules: BTreeMap<String, String>,
}

impl HeaderOverrides {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ServerError::HeadersFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| ServerError::HeadersFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Aplica los overrides sobre una configuración ya armada.
    ///
    /// Un header existente se reemplaza en su lugar; uno nuevo va al final.
    /// Una extensión existente cambia su `Cache-Control` y pierde los
    /// headers extra.
    pub fn apply(&self, config: &mut ServerConfig) {
        for (name, value) in &self.cors_headers {
            upsert(&mut config.cors_headers, name, value);
        }
        for (name, value) in &self.security_headers {
            upsert(&mut config.security_headers, name, value);
        }
        for (extension, cache_control) in &self.cache_rules {
            let extension = normalize_extension(extension);
            match config
                .cache_rules
                .iter_mut()
                .find(|rule| rule.extension.eq_ignore_ascii_case(&extension))
            {
                Some(rule) => {
                    rule.cache_control = cache_control.clone();
                    rule.extra_headers.clear();
                }
                None => config
                    .cache_rules
                    .push(CacheRule::new(&extension, cache_control)),
            }
        }
    }
}

fn upsert(list: &mut HeaderList, name: &str, value: &str) {
    match list.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value.to_string(),
        None => list.push((name.to_string(), value.to_string())),
    }
}

fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Configuración CLI del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "static_cors_server")]
#[command(about = "Servidor local de archivos estáticos con headers CORS")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha (0.0.0.0 = todas las interfaces)
    #[arg(long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Primer puerto candidato
    #[arg(long = "port-start", default_value = "8000", env = "PORT_START")]
    pub port_start: u16,

    /// Fin del rango de puertos (exclusivo)
    #[arg(long = "port-end", default_value = "8100", env = "PORT_END")]
    pub port_end: u16,

    /// Directorio desde el que se sirven los archivos
    #[arg(long, default_value = ".", env = "DOCUMENT_ROOT")]
    pub root: PathBuf,

    /// Archivo que debe existir en el document root para arrancar
    #[arg(long = "required-file", default_value = "dashboard-modern.html")]
    pub required_file: String,

    /// Conjunto de headers CORS/seguridad/cache
    #[arg(long, value_enum, default_value = "optimized", env = "HEADER_PROFILE")]
    pub profile: HeaderProfile,

    /// Path que se abre en el navegador al arrancar
    #[arg(long = "open-path", default_value = "/dashboard-modern.html")]
    pub open_path: String,

    /// No abrir el navegador
    #[arg(long = "no-browser")]
    pub no_browser: bool,

    /// Segundos de espera antes de abrir el navegador
    #[arg(long = "browser-delay", default_value = "2.0")]
    pub browser_delay_secs: f64,

    /// Timeout de lectura/escritura por conexión, en segundos
    #[arg(long = "request-timeout", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Segundos que se esperan a las respuestas en curso al apagar
    #[arg(long = "shutdown-grace", default_value = "5")]
    pub shutdown_grace_secs: u64,

    /// JSON con overrides de headers CORS, de seguridad y reglas de cache
    #[arg(long = "headers-file", env = "HEADERS_FILE")]
    pub headers_file: Option<PathBuf>,
}

impl Config {
    /// Parsea argumentos CLI y variables de entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.port_start == 0 {
            return Err("Port range must start above 0".to_string());
        }
        if self.port_start >= self.port_end {
            return Err(format!(
                "Port range is empty: {}..{}",
                self.port_start, self.port_end
            ));
        }
        if Duration::try_from_secs_f64(self.browser_delay_secs).is_err() {
            return Err("Browser delay must be a non-negative number of seconds".to_string());
        }
        if !self.open_path.starts_with('/') {
            return Err("Open path must start with '/'".to_string());
        }
        if self.required_file.trim().is_empty() || self.required_file.contains("..") {
            return Err("Required file must be a plain relative name".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be > 0".to_string());
        }
        Ok(())
    }

    /// Valida y arma el [`ServerConfig`] inmutable
    pub fn into_server_config(self) -> ServerResult<ServerConfig> {
        self.validate().map_err(ServerError::InvalidConfig)?;

        let mut config = ServerConfig {
            bind_address: self.host,
            port_range_start: self.port_start,
            port_range_end: self.port_end,
            document_root: self.root,
            required_file: self.required_file,
            profile: self.profile,
            cors_headers: self.profile.cors_headers(),
            security_headers: self.profile.security_headers(),
            cache_rules: self.profile.cache_rules(),
            open_browser_path: if self.no_browser {
                None
            } else {
                Some(self.open_path)
            },
            browser_open_delay: Duration::try_from_secs_f64(self.browser_delay_secs)
                .map_err(|e| ServerError::InvalidConfig(format!("Browser delay: {}", e)))?,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        };

        if let Some(path) = &self.headers_file {
            HeaderOverrides::load(path)?.apply(&mut config);
        }

        Ok(config)
    }
}

/// Configuración efectiva del servidor; no cambia una vez que arranca
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port_range_start: u16,
    /// Exclusivo
    pub port_range_end: u16,
    pub document_root: PathBuf,
    /// Relativo al document root
    pub required_file: String,
    pub profile: HeaderProfile,
    pub cors_headers: HeaderList,
    pub security_headers: HeaderList,
    pub cache_rules: Vec<CacheRule>,
    /// `None` desactiva la apertura del navegador
    pub open_browser_path: Option<String>,
    pub browser_open_delay: Duration,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Dirección completa para bind (host:port)
    pub fn address(&self, port: u16) -> String {
        format!("{}:{}", self.bind_address, port)
    }

    /// URL base que se muestra al usuario; siempre vía `localhost`
    pub fn base_url(&self, port: u16) -> String {
        format!("http://localhost:{}", port)
    }

    pub fn required_file_path(&self) -> PathBuf {
        self.document_root.join(&self.required_file)
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("⚙️  Configuración:");
        println!("   Host:         {}", self.bind_address);
        println!(
            "   Puertos:      {}-{}",
            self.port_range_start,
            self.port_range_end.saturating_sub(1)
        );
        println!("   Directorio:   {}", self.document_root.display());
        println!("   Perfil:       {}", self.profile.as_str());
        match &self.open_browser_path {
            Some(path) => println!(
                "   Navegador:    {} (en {:.1}s)",
                path,
                self.browser_open_delay.as_secs_f64()
            ),
            None => println!("   Navegador:    desactivado"),
        }
        println!();
    }
}

impl Default for ServerConfig {
    /// Configuración por defecto (variante "optimized")
    fn default() -> Self {
        let profile = HeaderProfile::Optimized;
        Self {
            bind_address: "0.0.0.0".to_string(),
            port_range_start: 8000,
            port_range_end: 8100,
            document_root: PathBuf::from("."),
            required_file: "dashboard-modern.html".to_string(),
            profile,
            cors_headers: profile.cors_headers(),
            security_headers: profile.security_headers(),
            cache_rules: profile.cache_rules(),
            open_browser_path: Some("/dashboard-modern.html".to_string()),
            browser_open_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["static_cors_server"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    fn header<'a>(list: &'a HeaderList, name: &str) -> Option<&'a str> {
        list.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_defaults_match_optimized_variant() {
        let config = parse(&[]).into_server_config().unwrap();

        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port_range_start, 8000);
        assert_eq!(config.port_range_end, 8100);
        assert_eq!(config.required_file, "dashboard-modern.html");
        assert_eq!(config.profile, HeaderProfile::Optimized);
        assert_eq!(config.open_browser_path.as_deref(), Some("/dashboard-modern.html"));
        assert_eq!(config.browser_open_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_optimized_cors_headers() {
        let cors = HeaderProfile::Optimized.cors_headers();

        assert_eq!(header(&cors, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            header(&cors, "Access-Control-Allow-Methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS, PATCH")
        );
        let allowed = header(&cors, "Access-Control-Allow-Headers").unwrap();
        assert!(allowed.starts_with("Content-Type, Authorization, X-Requested-With, Origin, Accept"));
        assert!(allowed.contains("X-Firebase-Auth"));
        assert_eq!(header(&cors, "Access-Control-Max-Age"), Some("86400"));
    }

    #[test]
    fn test_simple_profile_is_permissive() {
        let cors = HeaderProfile::Simple.cors_headers();

        assert_eq!(header(&cors, "Access-Control-Allow-Methods"), Some("*"));
        assert_eq!(header(&cors, "Access-Control-Allow-Headers"), Some("*"));
        assert!(HeaderProfile::Simple.security_headers().is_empty());
        assert!(HeaderProfile::Simple.cache_rules().is_empty());
    }

    #[test]
    fn test_profile_from_cli() {
        let config = parse(&["--profile", "local"]).into_server_config().unwrap();

        assert_eq!(config.profile, HeaderProfile::Local);
        assert_eq!(header(&config.cors_headers, "Access-Control-Allow-Headers"), Some("Content-Type"));
    }

    #[test]
    fn test_no_browser_flag() {
        let config = parse(&["--no-browser"]).into_server_config().unwrap();
        assert!(config.open_browser_path.is_none());
    }

    #[test]
    fn test_validate_empty_port_range() {
        let config = parse(&["--port-start", "9000", "--port-end", "9000"]);
        let result = config.validate();
        assert!(result.unwrap_err().contains("Port range is empty"));
    }

    #[test]
    fn test_validate_port_zero() {
        let config = parse(&["--port-start", "0"]);
        assert!(config.validate().unwrap_err().contains("above 0"));
    }

    #[test]
    fn test_validate_negative_delay() {
        let mut config = parse(&[]);
        config.browser_delay_secs = -1.0;
        assert!(config.validate().unwrap_err().contains("Browser delay"));

        config.browser_delay_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_browser_delay_is_invalid_config() {
        let config = parse(&["--browser-delay", "1e20"]);
        assert!(config.validate().unwrap_err().contains("Browser delay"));

        assert!(matches!(
            config.into_server_config(),
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_open_path() {
        let config = parse(&["--open-path", "dashboard.html"]);
        assert!(config.validate().unwrap_err().contains("Open path"));
    }

    #[test]
    fn test_invalid_config_becomes_server_error() {
        let config = parse(&["--port-start", "9001", "--port-end", "9000"]);
        assert!(matches!(
            config.into_server_config(),
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_overrides_replace_and_append() {
        let overrides = HeaderOverrides::from_json(
            r#"{
                "cors_headers": {
                    "Access-Control-Allow-Origin": "http://localhost:5173",
                    "Access-Control-Allow-Credentials": "true"
                },
                "cache_rules": { ".html": "no-store", "webp": "public, max-age=86400" }
            }"#,
        )
        .unwrap();

        let mut config = ServerConfig::default();
        overrides.apply(&mut config);

        assert_eq!(config.cors_headers[0].1, "http://localhost:5173");
        assert_eq!(
            header(&config.cors_headers, "Access-Control-Allow-Credentials"),
            Some("true")
        );

        let html = config.cache_rules.iter().find(|r| r.extension == ".html").unwrap();
        assert_eq!(html.cache_control, "no-store");
        assert!(html.extra_headers.is_empty());

        let webp = config.cache_rules.iter().find(|r| r.extension == ".webp").unwrap();
        assert_eq!(webp.cache_control, "public, max-age=86400");
    }

    #[test]
    fn test_overrides_reject_unknown_fields() {
        assert!(HeaderOverrides::from_json(r#"{"cors": {}}"#).is_err());
    }

    #[test]
    fn test_headers_file_loaded_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"security_headers": {{"X-Frame-Options": "DENY"}}}}"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = parse(&["--headers-file", &path]).into_server_config().unwrap();

        assert_eq!(header(&config.security_headers, "X-Frame-Options"), Some("DENY"));
    }

    #[test]
    fn test_missing_headers_file() {
        let config = parse(&["--headers-file", "/definitivamente/no/existe.json"]);
        assert!(matches!(
            config.into_server_config(),
            Err(ServerError::HeadersFile { .. })
        ));
    }

    #[test]
    fn test_urls_and_paths() {
        let config = ServerConfig {
            document_root: PathBuf::from("/srv/site"),
            ..ServerConfig::default()
        };

        assert_eq!(config.address(8003), "0.0.0.0:8003");
        assert_eq!(config.base_url(8003), "http://localhost:8003");
        assert_eq!(
            config.required_file_path(),
            PathBuf::from("/srv/site/dashboard-modern.html")
        );
    }

    #[test]
    fn test_print_summary() {
        // Should not panic
        ServerConfig::default().print_summary();
    }
}
