//! CV intake: text extraction from an uploaded PDF and contact-data detection.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::AppError;

pub const MAX_CV_BYTES: usize = 10 * 1024 * 1024;

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+58[\s-]?|\b0)[24]\d{2}[\s.-]?\d{3}[\s.-]?\d{2}[\s.-]?\d{2}\b").expect("valid phone regex")
});
static CEDULA_LABELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:c[ée]dula(?:\s+de\s+identidad)?|c\.\s?i\.?|[ve])\s*(?:n[°º.o]*\s*)?[:.-]?\s*(\d{1,2}\.?\d{3}\.?\d{3})\b")
        .expect("valid labelled cedula regex")
});
static CEDULA_DOTTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}\.\d{3}\.\d{3})\b").expect("valid dotted cedula regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex"));

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct CvDetections {
    pub phones: Vec<String>,
    pub cedulas: Vec<String>,
    pub emails: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Finds phone numbers, cédula-like digit runs and e-mail addresses, in order of appearance.
pub fn detect_contact_data(text: &str) -> CvDetections {
    let mut found = CvDetections::default();

    for m in PHONE.find_iter(text) {
        push_unique(&mut found.phones, m.as_str().trim().to_string());
    }
    for re in [&*CEDULA_LABELLED, &*CEDULA_DOTTED] {
        for caps in re.captures_iter(text) {
            let number = digits(&caps[1]);
            if (6..=9).contains(&number.len()) {
                push_unique(&mut found.cedulas, number);
            }
        }
    }
    for m in EMAIL.find_iter(text) {
        push_unique(&mut found.emails, m.as_str().to_lowercase());
    }

    found
}

/// Extracts the text layer of a PDF. Runs on the blocking pool.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("El archivo está vacío".into()));
    }
    if data.len() > MAX_CV_BYTES {
        return Err(AppError::PayloadTooLarge("El archivo excede el tamaño máximo de 10 MB".into()));
    }
    if !data.starts_with(b"%PDF") {
        return Err(AppError::Validation("El archivo debe ser un PDF".into()));
    }

    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| {
            warn!("PDF text extraction failed: {e}");
            AppError::Validation("No se pudo leer el texto del PDF".into())
        })?;

    debug!("Extracted {} chars from a {size}-byte PDF", text.len());
    Ok(normalize_whitespace(&text))
}

/// Collapses runs of blank lines and trailing spaces left by the PDF text layer.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
