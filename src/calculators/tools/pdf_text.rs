//! Best-effort text extraction from simple, uncompressed PDFs.
//!
//! Only literal strings shown with `Tj` or inside `TJ` arrays are read.
//! When neither operator matches, any parenthesised string is taken.

use crate::core::{Calculator, Card, Env, Storage};
use crate::domain::model::{Attachment, Form};
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{escape_html, format_fixed};
use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

const STRING: &str = r"\(([^()]*?(?:\\.[^()]*)*)\)";

static SHOW_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{}\s*Tj", STRING)).expect("valid regex"));
static SHOW_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\s*TJ").expect("valid regex"));
static LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(STRING).expect("valid regex"));
static OCTAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\([0-7]{1,3})").expect("valid regex"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static PARAGRAPHS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Resolves `\ddd` octal and the single-character escapes of a PDF literal.
pub fn decode_literal(value: &str) -> String {
    let octal = OCTAL.replace_all(value, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 8)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    octal
        .replace("\\r", "\n")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\f", "")
        .replace("\\b", "")
        .replace("\\(", "(")
        .replace("\\)", ")")
        .replace("\\\\", "\\")
}

pub fn extract_text(bytes: &[u8]) -> String {
    // latin1: every byte maps to the code point of the same value
    let raw: String = bytes.iter().map(|&b| char::from(b)).collect();

    let mut chunks: Vec<String> = SHOW_TEXT
        .captures_iter(&raw)
        .map(|c| decode_literal(&c[1]))
        .collect();
    for array in SHOW_ARRAY.captures_iter(&raw) {
        chunks.push(
            LITERAL
                .captures_iter(&array[1])
                .map(|c| decode_literal(&c[1]))
                .collect(),
        );
    }
    if chunks.is_empty() {
        chunks = LITERAL
            .captures_iter(&raw)
            .map(|c| decode_literal(&c[1]))
            .collect();
    }

    let combined = chunks
        .concat()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "");
    BLANK_RUN.replace_all(&combined, "\n\n").trim().to_string()
}

/// HTML that Word opens as a document, one `<p>` per blank-line paragraph.
pub fn word_document(text: &str) -> String {
    let body: String = PARAGRAPHS
        .split(text.trim())
        .map(|para| format!("<p>{}</p>", escape_html(para.trim()).replace('\n', "<br>")))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        body
    )
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Extracted {
    pub words: usize,
    pub characters: usize,
    pub lines: usize,
}

pub fn counts(text: &str) -> Extracted {
    Extracted {
        words: text.split_whitespace().count(),
        characters: text.chars().count(),
        lines: if text.is_empty() { 0 } else { text.split('\n').count() },
    }
}

pub struct PdfToWord;

#[async_trait]
impl Calculator for PdfToWord {
    fn key(&self) -> &'static str {
        "pdf-to-word"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let path = form
            .get("file")
            .ok_or_else(|| CalcError::invalid("Choose a PDF file to extract text from."))?;
        let bytes = env.storage.read_file(path).await.map_err(|e| {
            tracing::warn!("Could not read {}: {}", path, e);
            CalcError::invalid("Unable to read the PDF. Make sure the file isn't encrypted.")
        })?;

        let text = extract_text(&bytes);
        if text.is_empty() {
            return Err(CalcError::invalid(
                "No text blocks were found. The PDF may be image-based or heavily formatted.",
            ));
        }

        let stem = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("extracted-text");
        let attachment = match form.text_or("output", "doc") {
            "txt" | "text" => Attachment {
                file_name: format!("{}.txt", stem),
                mime: "text/plain;charset=utf-8".to_string(),
                bytes: text.clone().into_bytes(),
            },
            _ => Attachment {
                file_name: format!("{}.doc", stem),
                mime: "application/msword".to_string(),
                bytes: word_document(&text).into_bytes(),
            },
        };

        let stats = counts(&text);
        let count = |n: usize| format_fixed(n as f64, 0);
        Card::new("Extracted text")
            .headline(text.clone())
            .stat("Words", count(stats.words))
            .stat("Characters", count(stats.characters))
            .stat("Lines", count(stats.lines))
            .attach(attachment)
            .note("Extraction complete. Review and edit as needed before downloading.")
            .data(&stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const SAMPLE: &[u8] = b"%PDF-1.4\nBT /F1 12 Tf (Hello \\(PDF\\)) Tj ET\nBT [(Wor) -20 (ld\\041)] TJ ET\n%%EOF";

    #[test]
    fn test_extracts_tj_and_arrays() {
        assert_eq!(extract_text(SAMPLE), "Hello (PDF)World!");
    }

    #[test]
    fn test_loose_fallback() {
        assert_eq!(extract_text(b"<< /Title (Only a title) >>"), "Only a title");
        assert_eq!(extract_text(b"no strings here"), "");
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_literal(r"a\nb\tc\\d\101"), "a\nb\tc\\dA");
    }

    #[test]
    fn test_word_document_paragraphs() {
        let doc = word_document("One\nline\n\nTwo & three");
        assert!(doc.contains("<p>One<br>line</p><p>Two &amp; three</p>"));
    }

    #[tokio::test]
    async fn test_reads_file_and_attaches_doc() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.pdf"), SAMPLE).unwrap();
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_storage(LocalStorage::new(dir.path().to_string_lossy().to_string()));

        let card = PdfToWord
            .run(&Form::new().with("file", "report.pdf"), &env)
            .await
            .unwrap();
        assert_eq!(card.attachments[0].file_name, "report.doc");
        assert_eq!(card.stat_value("Words"), Some("2"));
    }
}
