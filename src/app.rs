//! # Secuencia de arranque y apagado
//! src/app.rs
//!
//! ```text
//! archivo requerido? ──no──→ MissingRequiredFile (sin bind)
//!        │ sí
//! primer puerto libre ──no──→ NoAvailablePort
//!        │
//! bind → banners → navegador (thread aparte) → accept loop
//!        │
//! ShutdownHandle disparado → drain → banner de apagado → Ok(())
//! ```

use crate::browser;
use crate::config::ServerConfig;
use crate::console;
use crate::error::{ServerError, ServerResult};
use crate::server::{find_free_port, Server, ShutdownHandle};
use std::net::SocketAddr;

/// Servidor ya bindeado, listo para atender
pub struct App {
    config: ServerConfig,
    server: Server,
    port: u16,
}

impl App {
    /// Valida el archivo requerido, elige puerto y bindea.
    ///
    /// Si falta el archivo no se toca la red.
    pub fn start(config: ServerConfig, shutdown: ShutdownHandle) -> ServerResult<Self> {
        check_required_file(&config)?;

        let port = find_free_port(
            &config.bind_address,
            config.port_range_start,
            config.port_range_end,
        )?;
        let server = Server::bind(config.clone(), port, shutdown)?;
        tracing::debug!("listening on {}", config.address(port));

        Ok(Self { config, server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.server.local_addr()?)
    }

    pub fn base_url(&self) -> String {
        self.config.base_url(self.port)
    }

    /// Imprime las instrucciones, agenda el navegador y atiende hasta
    /// que se pida el apagado
    pub fn serve(self) -> ServerResult<()> {
        console::print_banner();
        console::print_starting(self.port, self.config.profile);
        console::print_instructions(&self.config, self.port);

        if let Some(path) = &self.config.open_browser_path {
            let url = format!("{}{}", self.base_url(), path);
            // El handle se descarta: el thread termina solo
            if let Err(e) = browser::schedule_open(url, self.config.browser_open_delay) {
                tracing::warn!("cannot schedule browser launch: {}", e);
            }
        }

        self.server.run()?;
        console::print_shutdown();
        Ok(())
    }
}

/// Arranca y atiende hasta el apagado
pub fn run(config: ServerConfig, shutdown: ShutdownHandle) -> ServerResult<()> {
    App::start(config, shutdown)?.serve()
}

fn check_required_file(config: &ServerConfig) -> ServerResult<()> {
    let path = config.required_file_path();
    if path.is_file() {
        Ok(())
    } else {
        Err(ServerError::MissingRequiredFile { path })
    }
}
