//! Pure text helpers for titles, labels, status words, and upload dates.

use crate::model::Status;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((Pt[-/]br|Scan)\)").expect("language tag pattern is a valid regex")
});

const DATE_FORMAT: &str = "(%d/%m/%Y)";

/// Remove the `(Pt-br)`, `(Pt/br)` and `(Scan)` markers the site appends to titles.
pub fn strip_language_tag(title: &str) -> String {
    LANGUAGE_TAG.replace_all(title, "").trim().to_string()
}

/// `"Autor: Eiichiro Oda"` -> `"Eiichiro Oda"`. Without a colon the whole text is kept.
pub fn strip_label(text: &str) -> String {
    match text.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn parse_status(text: &str) -> Status {
    match text {
        "Ativo" => Status::Ongoing,
        "Completo" => Status::Completed,
        _ => Status::Unknown,
    }
}

/// Parse `(dd/MM/yyyy)` as local midnight in epoch millis. Returns 0 on any failure.
pub fn parse_date(text: &str) -> i64 {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
