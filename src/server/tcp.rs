//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Accept loop no bloqueante: entre intentos de `accept` se revisa el
//! `ShutdownHandle`. Cada conexión se atiende en su propio thread y se
//! cierra después de una respuesta. Al apagar se deja de aceptar y se
//! espera (hasta `shutdown_grace`) a que terminen las respuestas en curso.

use super::shutdown::ShutdownHandle;
use crate::config::ServerConfig;
use crate::handler::{self, RequestHandler};
use crate::http::{Method, ParseError, Request};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Tamaño máximo de la cabecera de un request
const MAX_HEAD_BYTES: usize = 8192;

/// Espera entre intentos de `accept` cuando no hay conexiones
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Tiempo máximo descartando input pendiente antes de cerrar
const LINGER: Duration = Duration::from_millis(200);

pub struct Server {
    config: ServerConfig,
    handler: Arc<RequestHandler>,
    listener: TcpListener,
    in_flight: Arc<AtomicUsize>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bindea `bind_address:port`
    pub fn bind(config: ServerConfig, port: u16, shutdown: ShutdownHandle) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address(port))?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            handler: Arc::new(RequestHandler::new(&config)),
            config,
            listener,
            in_flight: Arc::new(AtomicUsize::new(0)),
            shutdown,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Conexiones que se están atendiendo en este momento
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Atiende conexiones hasta que se dispare el `ShutdownHandle`
    pub fn run(&self) -> io::Result<()> {
        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    tracing::error!("accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL);
                }
            }
        }

        self.drain();
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        tracing::debug!("connection from {}", peer);

        // En algunas plataformas el socket aceptado hereda O_NONBLOCK
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("cannot configure connection from {}: {}", peer, e);
            return;
        }

        let handler = Arc::clone(&self.handler);
        let timeout = self.config.request_timeout;
        let guard = InFlight::enter(&self.in_flight);

        let spawned = thread::Builder::new()
            .name("conn".to_string())
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = handle_connection(stream, &handler, timeout) {
                    tracing::warn!("connection from {} failed: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("cannot spawn connection thread: {}", e);
        }
    }

    fn drain(&self) {
        let deadline = Instant::now() + self.config.shutdown_grace;

        while self.in_flight() > 0 && Instant::now() < deadline {
            thread::sleep(ACCEPT_POLL);
        }

        let pending = self.in_flight();
        if pending > 0 {
            tracing::warn!("{} response(s) still in progress at shutdown", pending);
        }
    }
}

/// Cuenta una conexión en curso mientras vive
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

enum Head {
    /// El peer cerró sin mandar nada
    Closed,
    Complete(Vec<u8>),
    /// Lo leído hasta pasar el límite
    TooLarge(Vec<u8>),
}

/// Lee hasta la línea vacía que cierra la cabecera (o hasta EOF)
fn read_head(stream: &mut TcpStream) -> io::Result<Head> {
    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 2048];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_head_end(&head) {
            head.truncate(end);
            return Ok(Head::Complete(head));
        }
        if head.len() > MAX_HEAD_BYTES {
            return Ok(Head::TooLarge(head));
        }
    }

    if head.is_empty() {
        Ok(Head::Closed)
    } else {
        Ok(Head::Complete(head))
    }
}

/// Posición justo después de `\r\n\r\n`
fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Atiende un request en la conexión y la cierra
fn handle_connection(
    mut stream: TcpStream,
    handler: &RequestHandler,
    timeout: Duration,
) -> io::Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let (raw, parsed) = match read_head(&mut stream)? {
        Head::Closed => return Ok(()),
        Head::TooLarge(partial) => (partial, Err(ParseError::HeadTooLarge)),
        Head::Complete(bytes) => {
            let parsed = Request::parse(&bytes);
            (bytes, parsed)
        }
    };

    match parsed {
        Ok(request) => {
            let response = handler.handle(&request);
            let include_body = request.method() != Method::HEAD;
            response.write_to(&mut stream, include_body)?;

            let body_bytes = if include_body { response.body().len() } else { 0 };
            handler::log_access(&request, response.status(), body_bytes);
        }
        Err(e) => {
            tracing::warn!("bad request: {}", e);
            let response = handler.reject(&e);
            response.write_to(&mut stream, true)?;
            handler::log_rejected(&raw, response.status(), response.body().len());
        }
    }

    stream.flush()?;
    let _ = stream.shutdown(Shutdown::Write);
    discard_unread(&mut stream);
    Ok(())
}

/// Consume lo que el cliente haya mandado y no leímos (un body, el resto
/// de una cabecera enorme). Cerrar con datos pendientes hace que el kernel
/// mande RST y el cliente puede perder la respuesta.
fn discard_unread(stream: &mut TcpStream) {
    if stream.set_read_timeout(Some(LINGER)).is_err() {
        return;
    }

    let mut sink = [0u8; 2048];
    let deadline = Instant::now() + LINGER;
    while Instant::now() < deadline {
        match stream.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(_) => continue,
        }
    }
}
