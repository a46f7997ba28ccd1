//! Fechas HTTP (IMF-fixdate), p.ej. `Sun, 06 Nov 1994 08:49:37 GMT`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formatea un instante para `Date` / `Last-Modified`
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format(IMF_FIXDATE).to_string()
}

/// Parsea un `If-Modified-Since`.
///
/// Acepta IMF-fixdate y, por compatibilidad, cualquier fecha RFC 2822.
/// Fechas inválidas se ignoran (`None`), igual que un header ausente.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, IMF_FIXDATE) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
