//! # Apagado del servidor
//! src/server/shutdown.rs
//!
//! `ShutdownHandle` es una bandera compartida: quien la dispara pide que el
//! accept loop deje de aceptar conexiones. En Unix, un thread dedicado
//! espera SIGINT/SIGTERM con `sigwait`; en Windows el handler de consola
//! de `ctrlc` hace lo mismo. Una segunda interrupción sale enseguida.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pide el apagado; llamar más de una vez no tiene efecto extra
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Registra una interrupción y decide la acción
    pub fn on_signal(&self) -> SignalAction {
        if self.requested.swap(true, Ordering::SeqCst) {
            SignalAction::ExitNow
        } else {
            SignalAction::Shutdown
        }
    }
}

/// Qué hacer al recibir una interrupción
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Primera: dejar de aceptar y esperar las respuestas en curso
    Shutdown,
    /// Segunda, durante la espera: salir sin esperar
    ExitNow,
}

fn act_on_signal(handle: &ShutdownHandle) {
    match handle.on_signal() {
        SignalAction::Shutdown => tracing::debug!("shutdown requested"),
        SignalAction::ExitNow => {
            tracing::warn!("second interrupt, exiting without waiting for responses");
            std::process::exit(0);
        }
    }
}

/// Instala la espera de SIGINT/SIGTERM.
///
/// Tiene que llamarse desde `main` antes de crear cualquier otro thread:
/// las señales se bloquean en el thread actual y los threads nuevos heredan
/// la máscara, así solo el thread de espera las recibe.
#[cfg(unix)]
pub fn install_signal_handler(handle: ShutdownHandle) -> io::Result<()> {
    let mut mask: libc::sigset_t = unsafe { std::mem::zeroed() };

    unsafe {
        libc::sigemptyset(&mut mask);
        libc::sigaddset(&mut mask, libc::SIGINT);
        libc::sigaddset(&mut mask, libc::SIGTERM);

        let rc = libc::pthread_sigmask(libc::SIG_BLOCK, &mask, std::ptr::null_mut());
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
    }

    // Sigue esperando después de la primera: la segunda corta el drain
    std::thread::Builder::new()
        .name("signal-wait".to_string())
        .spawn(move || loop {
            let mut signal: libc::c_int = 0;
            let rc = unsafe { libc::sigwait(&mask, &mut signal) };
            if rc == 0 {
                tracing::debug!("received signal {}", signal);
                act_on_signal(&handle);
            }
        })?;

    Ok(())
}

/// Ctrl+C / Ctrl+Break de la consola vía `ctrlc`
#[cfg(not(unix))]
pub fn install_signal_handler(handle: ShutdownHandle) -> io::Result<()> {
    ctrlc::set_handler(move || act_on_signal(&handle))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
