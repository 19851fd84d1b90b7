//! Display formatting for backend timestamps and secrets.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
}

/// `YYYY-MM-DD`; unparseable input is shown as-is, missing input as empty.
#[must_use]
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    parse_timestamp(raw)
        .and_then(|dt| dt.format(format_description!("[year]-[month]-[day]")).ok())
        .unwrap_or_else(|| raw.to_owned())
}

/// `YYYY-MM-DD HH:MM UTC`; same fallbacks as [`format_date`].
#[must_use]
pub fn format_datetime(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    parse_timestamp(raw)
        .and_then(|dt| {
            dt.format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
                .ok()
        })
        .unwrap_or_else(|| raw.to_owned())
}

/// Show only the last four characters of a stored secret.
#[must_use]
pub fn mask_secret(secret: Option<&str>) -> String {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return "Not set".to_owned();
    };
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_owned();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[must_use]
pub fn format_optional_id(id: Option<i64>) -> String {
    id.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
