//! # Mensajes de consola
//! src/console.rs
//!
//! Banners e instrucciones para quien corre el servidor. Van por stdout
//! con `println!`; el log de requests va aparte por `tracing`.

use crate::config::{HeaderProfile, ServerConfig};
use crate::error::ServerError;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner() {
    println!("{}", rule());
    println!("🏪 SERVIDOR LOCAL - DASHBOARD Y SITIO");
    println!("{}", rule());
}

/// Páginas que se anuncian al arrancar
pub fn page_urls(base_url: &str) -> [(&'static str, String); 3] {
    [
        ("📊 Dashboard", format!("{}/dashboard-modern.html", base_url)),
        ("🔐 Login", format!("{}/login.html", base_url)),
        ("🌐 Sitio", format!("{}/index.html", base_url)),
    ]
}

pub fn print_starting(port: u16, profile: HeaderProfile) {
    println!("🚀 Iniciando servidor en el puerto {}...", port);
    println!("🔧 Headers CORS: perfil {}", profile.as_str());
}

pub fn print_instructions(config: &ServerConfig, port: u16) {
    let base_url = config.base_url(port);
    let [dashboard, login, site] = page_urls(&base_url);

    println!();
    println!("✅ Servidor corriendo en: {}", base_url);
    for (label, url) in [&dashboard, &login, &site] {
        println!("{}: {}", label, url);
    }

    println!();
    println!("🎯 PRÓXIMOS PASOS:");
    println!("1. 📋 Inicia sesión: {}", login.1);
    println!("2. 🎛️ Entra al dashboard: {}", dashboard.1);
    println!("3. 🖼️ Prueba la subida de imágenes en cada sección");
    println!("4. 🔄 Verifica la sincronización en tiempo real");

    println!();
    println!("⚡ HABILITADO:");
    println!("✓ CORS para el backend en la nube");
    if !config.security_headers.is_empty() {
        println!("✓ Headers de seguridad");
    }
    if !config.cache_rules.is_empty() {
        println!("✓ Cache por tipo de archivo");
    }

    println!();
    println!("💡 TIP: Deja DevTools abierto (F12) para ver los requests");
    println!();
    println!("🔴 Presiona Ctrl+C para detener el servidor");
    println!();
    println!("{}", rule());
    println!("📡 SERVIDOR ACTIVO - Logs en tiempo real:");
    println!("{}", rule());
}

pub fn print_shutdown() {
    println!();
    println!("{}", rule());
    println!("🛑 SERVIDOR DETENIDO por el usuario");
    println!("{}", rule());
    println!("✅ ¡Gracias por usar el sistema!");
    println!("🔄 Vuelve a ejecutarlo cuando necesites probar");
}

/// Explica por qué no arrancó el servidor
pub fn print_startup_error(error: &ServerError) {
    match error {
        ServerError::MissingRequiredFile { path } => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            eprintln!("❌ Error: {} no encontrado!", name);
            eprintln!("💡 Ejecuta el servidor en la carpeta raíz del proyecto (o usa --root)");
            print_current_dir();
        }
        ServerError::NoAvailablePort { start, end } => {
            eprintln!(
                "❌ Error: ningún puerto disponible entre {}-{}",
                start,
                end.saturating_sub(1)
            );
        }
        ServerError::InvalidConfig(msg) => {
            eprintln!("❌ Configuración inválida: {}", msg);
        }
        ServerError::HeadersFile { path, reason } => {
            eprintln!("❌ No se pudo leer {}: {}", path.display(), reason);
        }
        other => {
            eprintln!();
            eprintln!("❌ ERROR INESPERADO: {}", other);
            eprintln!("💡 Intenta de nuevo o revisa los permisos");
        }
    }
}

fn print_current_dir() {
    match std::env::current_dir() {
        Ok(dir) => eprintln!("📂 Carpeta actual: {}", dir.display()),
        Err(e) => tracing::debug!("cannot read current dir: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_urls() {
        let urls = page_urls("http://localhost:8003");

        assert_eq!(urls[0].1, "http://localhost:8003/dashboard-modern.html");
        assert_eq!(urls[1].1, "http://localhost:8003/login.html");
        assert_eq!(urls[2].1, "http://localhost:8003/index.html");
    }
}
