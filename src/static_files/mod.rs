//! # Archivos Estáticos
//! src/static_files/mod.rs
//!
//! Resuelve el path de un request contra el document root y arma la
//! respuesta:
//!
//! - Archivo → 200 con `Content-Type`, `Content-Length` y `Last-Modified`
//!   (o 304 si no cambió desde `If-Modified-Since`)
//! - Directorio sin `/` final → 301 al mismo path con `/`
//! - Directorio → `index.html`, `index.htm` o un listado HTML
//! - Archivo pedido con `/` final, o cualquier otra cosa → 404
//!
//! Los segmentos `.` y `..` se descartan antes de unir con el root, y un
//! path cuyo destino real (symlinks incluidos) queda fuera del root
//! también es 404.

pub mod listing;

use crate::http::date::{format_http_date, parse_http_date};
use crate::http::{Request, Response, StatusCode};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Archivos que se buscan al pedir un directorio, en orden
const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Sirve archivos desde un document root
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Responde un GET (o HEAD; el caller decide si manda el body)
    pub fn serve(&self, request: &Request) -> Response {
        let fs_path = match self.resolve(request.path()) {
            Some(path) => path,
            None => return Response::error(StatusCode::NotFound, "File not found"),
        };

        if fs_path.is_dir() {
            if !request.path().ends_with('/') {
                return redirect_to_directory(request);
            }

            for index in INDEX_FILES {
                let index_path = fs_path.join(index);
                if index_path.is_file() {
                    return serve_file(&index_path, request);
                }
            }

            return match listing::render(&fs_path, request.path()) {
                Ok(html) => Response::new(StatusCode::Ok)
                    .with_header("Content-Type", "text/html; charset=utf-8")
                    .with_body(&html),
                Err(_) => Response::error(StatusCode::NotFound, "No permission to list directory"),
            };
        }

        // "/index.html/" no es un directorio
        if request.path().ends_with('/') {
            return Response::error(StatusCode::NotFound, "File not found");
        }

        serve_file(&fs_path, request)
    }

    /// Traduce un path de URL (ya decodificado) a un path dentro del root.
    ///
    /// Retorna `None` si no existe o si su destino real sale del root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut fs_path = self.root.clone();
        for segment in sanitize_segments(url_path) {
            fs_path.push(segment);
        }

        let real_root = fs::canonicalize(&self.root).ok()?;
        let real_path = fs::canonicalize(&fs_path).ok()?;
        if !real_path.starts_with(&real_root) {
            return None;
        }

        Some(fs_path)
    }
}

/// Segmentos de un path de URL sin `.`/`..`/vacíos.
///
/// Un segmento con `\` o NUL tampoco se acepta: en Windows `\` separa
/// directorios y permitiría escapar del root.
///
/// # Ejemplo
/// ```
/// use static_cors_server::static_files::sanitize_segments;
///
/// assert_eq!(sanitize_segments("/../../etc/passwd"), vec!["etc", "passwd"]);
/// assert_eq!(sanitize_segments("/css/./app.css"), vec!["css", "app.css"]);
/// ```
pub fn sanitize_segments(url_path: &str) -> Vec<&str> {
    url_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .filter(|segment| !segment.contains('\\') && !segment.contains('\0'))
        .collect()
}

/// 301 agregando `/` al path original (sin re-codificar) y conservando la query
fn redirect_to_directory(request: &Request) -> Response {
    let raw_path = request
        .target()
        .split(['?', '#'])
        .next()
        .unwrap_or("/");

    let location = match request.query() {
        Some(query) => format!("{}/?{}", raw_path, query),
        None => format!("{}/", raw_path),
    };

    Response::new(StatusCode::MovedPermanently)
        .with_header("Location", &location)
        .with_body("")
}

fn serve_file(path: &Path, request: &Request) -> Response {
    // Un archivo que existe pero no se puede abrir se reporta como 404
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return Response::error(StatusCode::NotFound, "File not found"),
    };

    let modified = file.metadata().and_then(|meta| meta.modified()).ok();

    if let Some(modified) = modified {
        if not_modified_since(request, modified) {
            return Response::new(StatusCode::NotModified)
                .with_header("Last-Modified", &format_http_date(modified));
        }
    }

    let mut contents = Vec::new();
    if let Err(e) = file.read_to_end(&mut contents) {
        return Response::error(
            StatusCode::InternalServerError,
            &format!("Failed to read file: {}", e),
        );
    }

    let mut response = Response::new(StatusCode::Ok)
        .with_header("Content-Type", &content_type_for(path))
        .with_body_bytes(contents);

    if let Some(modified) = modified {
        response.add_header("Last-Modified", &format_http_date(modified));
    }

    response
}

/// `If-Modified-Since` con precisión de segundos, como el header mismo.
///
/// Si viene `If-None-Match` se ignora: no generamos ETags, así que no hay
/// forma de validarlo y hay que mandar el archivo completo.
fn not_modified_since(request: &Request, modified: SystemTime) -> bool {
    if request.header("If-None-Match").is_some() {
        return false;
    }

    let since = match request.header("If-Modified-Since").and_then(parse_http_date) {
        Some(since) => since,
        None => return false,
    };

    let modified_secs = match modified.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(_) => return false,
    };

    modified_secs <= since.timestamp()
}

/// MIME según la extensión; los tipos de texto van con `charset=utf-8`
pub fn content_type_for(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    if mime.type_() == mime_guess::mime::TEXT && mime.get_param(mime_guess::mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Barbearia</h1>").unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body { margin: 0 }").unwrap();
        fs::create_dir(dir.path().join("fotos")).unwrap();
        fs::write(dir.path().join("fotos/corte 1.png"), [0x89, b'P', b'N', b'G']).unwrap();
        dir
    }

    fn get(path: &str) -> Request {
        get_with(path, "")
    }

    fn get_with(path: &str, extra_headers: &str) -> Request {
        let raw = format!("GET {} HTTP/1.1\r\n{}\r\n", path, extra_headers);
        Request::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_serves_file_with_metadata() {
        let dir = site();
        let files = StaticFiles::new(dir.path());

        let response = files.serve(&get("/css/site.css"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"body { margin: 0 }");
        assert_eq!(response.header("Content-Type"), Some("text/css; charset=utf-8"));
        assert_eq!(response.header("Content-Length"), Some("18"));
        assert!(response.header("Last-Modified").unwrap().ends_with("GMT"));
    }

    #[test]
    fn test_serves_percent_decoded_names() {
        let dir = site();
        let files = StaticFiles::new(dir.path());

        let response = files.serve(&get("/fotos/corte%201.png"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_file_with_trailing_slash_is_404() {
        let dir = site();
        let files = StaticFiles::new(dir.path());

        assert_eq!(files.serve(&get("/index.html/")).status(), StatusCode::NotFound);
        assert_eq!(files.serve(&get("/css/site.css/")).status(), StatusCode::NotFound);
        assert_eq!(files.serve(&get("/index.html")).status(), StatusCode::Ok);
    }

    #[test]
    fn test_missing_file_is_404() {
        let dir = site();
        let response = StaticFiles::new(dir.path()).serve(&get("/missing.xyz"));

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "no").unwrap();
        let root = outer.path().join("site");
        fs::create_dir(&root).unwrap();

        let files = StaticFiles::new(&root);

        assert_eq!(files.serve(&get("/../secret.txt")).status(), StatusCode::NotFound);
        assert_eq!(files.serve(&get("/%2E%2E/secret.txt")).status(), StatusCode::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_is_404() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "no").unwrap();
        let root = outer.path().join("site");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt")).unwrap();

        let response = StaticFiles::new(&root).serve(&get("/link.txt"));
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_directory_index() {
        let dir = site();
        let response = StaticFiles::new(dir.path()).serve(&get("/"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"<h1>Barbearia</h1>");
    }

    #[test]
    fn test_directory_without_slash_redirects() {
        let dir = site();
        let files = StaticFiles::new(dir.path());

        let response = files.serve(&get("/css"));
        assert_eq!(response.status(), StatusCode::MovedPermanently);
        assert_eq!(response.header("Location"), Some("/css/"));

        let response = files.serve(&get("/css?v=2"));
        assert_eq!(response.header("Location"), Some("/css/?v=2"));
    }

    #[test]
    fn test_directory_without_index_is_listed() {
        let dir = site();
        let response = StaticFiles::new(dir.path()).serve(&get("/fotos/"));

        assert_eq!(response.status(), StatusCode::Ok);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("corte%201.png"));
    }

    #[test]
    fn test_if_modified_since() {
        let dir = site();
        let files = StaticFiles::new(dir.path());

        let future = format_http_date(SystemTime::now() + Duration::from_secs(3600));
        let request = get_with("/css/site.css", &format!("If-Modified-Since: {}\r\n", future));
        let response = files.serve(&request);
        assert_eq!(response.status(), StatusCode::NotModified);
        assert!(response.header("Last-Modified").is_some());

        let request = get_with(
            "/css/site.css",
            "If-Modified-Since: Thu, 01 Jan 1970 00:00:00 GMT\r\n",
        );
        assert_eq!(files.serve(&request).status(), StatusCode::Ok);
    }

    #[test]
    fn test_if_none_match_disables_conditional() {
        let dir = site();
        let future = format_http_date(SystemTime::now() + Duration::from_secs(3600));
        let request = get_with(
            "/css/site.css",
            &format!("If-Modified-Since: {}\r\nIf-None-Match: \"abc\"\r\n", future),
        );

        let response = StaticFiles::new(dir.path()).serve(&request);
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("a.unknownext")), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_segments() {
        assert!(sanitize_segments("/").is_empty());
        assert_eq!(sanitize_segments("/foo//bar/"), vec!["foo", "bar"]);
        assert_eq!(sanitize_segments("/a/..\\..\\b"), vec!["a"]);
    }
}
