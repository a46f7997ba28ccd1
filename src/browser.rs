//! # Apertura del navegador
//! src/browser.rs
//!
//! Tarea única en un thread aparte: espera el delay y pide al sistema que
//! abra la URL en el navegador por defecto. No comparte estado con el
//! servidor ni le devuelve nada; si falla (entorno sin navegador) se loguea
//! y se imprime la URL para abrirla a mano.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Agenda la apertura con el navegador del sistema (`open`)
pub fn schedule_open(url: String, delay: Duration) -> io::Result<JoinHandle<()>> {
    schedule_with(url, delay, |url: &str| open::that(url))
}

/// Igual que [`schedule_open`] pero con un lanzador arbitrario.
///
/// El `JoinHandle` solo sirve para tests; en el binario se descarta.
pub fn schedule_with<F>(url: String, delay: Duration, launch: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce(&str) -> io::Result<()> + Send + 'static,
{
    thread::Builder::new()
        .name("browser".to_string())
        .spawn(move || {
            thread::sleep(delay);
            println!("🌐 Abriendo navegador: {}", url);

            if let Err(e) = launch(&url) {
                tracing::warn!("could not open browser: {}", e);
                println!("📋 Accede manualmente: {}", url);
            }
        })
}
