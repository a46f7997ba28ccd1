//! Listado HTML de un directorio sin `index.html`.

use crate::http::response::escape_html;
use std::fs;
use std::io;
use std::path::Path;

/// Genera el HTML del listado de `dir`, que se pidió como `url_path`.
///
/// Entradas ordenadas sin distinguir mayúsculas; los directorios llevan
/// `/` al final y los symlinks `@`.
pub fn render(dir: &Path, url_path: &str) -> io::Result<String> {
    let mut entries: Vec<(String, bool, bool)> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;
        let is_symlink = file_type.is_symlink();
        let is_dir = entry.path().is_dir();
        entries.push((name, is_dir, is_symlink));
    }

    entries.sort_by_key(|(name, _, _)| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(url_path));
    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", title));
    html.push_str(&format!("<h1>{}</h1>\n<hr>\n<ul>\n", title));

    for (name, is_dir, is_symlink) in &entries {
        let (display, link) = if *is_dir {
            (format!("{}/", name), format!("{}/", name))
        } else if *is_symlink {
            (format!("{}@", name), name.clone())
        } else {
            (name.clone(), name.clone())
        };

        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_href(&link),
            escape_html(&display)
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

/// Percent-encoding de un nombre para usarlo en `href`.
///
/// Se conservan los caracteres no reservados y `/`; todo lo demás (bytes
/// UTF-8 incluidos) va como `%XX`.
pub fn encode_href(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
