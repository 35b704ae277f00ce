use crate::domain::model::{Card, Table, Tone};
use crate::utils::error::{CalcError, Result};
use crate::utils::format::escape_html;
use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 4] = ["html", "text", "json", "csv"];
}

impl FromStr for OutputFormat {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(CalcError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: format!("Valid formats: {}", Self::NAMES.join(", ")),
            }),
        }
    }
}

pub fn render(card: &Card, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Html => Ok(to_html(card)),
        OutputFormat::Text => Ok(to_text(card)),
        OutputFormat::Json => to_json(card),
        OutputFormat::Csv => {
            let mut out = String::new();
            for (i, table) in card.tables.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&table_to_csv(table)?);
            }
            Ok(out)
        }
    }
}

pub fn to_html(card: &Card) -> String {
    let mut html = String::new();
    let class = match card.tone {
        Tone::Info => "card",
        Tone::Warning => "card warning",
        Tone::Error => "card error",
    };
    let _ = writeln!(html, "<section class=\"{}\">", class);

    if let Some(title) = &card.title {
        let _ = writeln!(html, "  <h2 style=\"margin-top:0;\">{}</h2>", escape_html(title));
    }
    if let Some(headline) = &card.headline {
        let _ = writeln!(html, "  <p>{}</p>", escape_html(headline));
    }

    if !card.stats.is_empty() {
        html.push_str("  <div class=\"stat-grid\">\n");
        for stat in &card.stats {
            let _ = write!(
                html,
                "    <div class=\"stat\"><span class=\"label\">{}</span><span class=\"value\">{}</span>",
                escape_html(&stat.label),
                escape_html(&stat.value)
            );
            if let Some(hint) = &stat.hint {
                let _ = write!(html, "<span class=\"hint\">{}</span>", escape_html(hint));
            }
            html.push_str("</div>\n");
        }
        html.push_str("  </div>\n");
    }

    for table in &card.tables {
        if let Some(caption) = &table.caption {
            let _ = writeln!(html, "  <h3 style=\"margin-top:18px;\">{}</h3>", escape_html(caption));
        }
        html.push_str("  <div class=\"table-wrap\" style=\"margin-top:18px;\">\n    <table>\n      <thead><tr>");
        for header in &table.headers {
            let _ = write!(html, "<th>{}</th>", escape_html(header));
        }
        html.push_str("</tr></thead>\n      <tbody>\n");
        for row in &table.rows {
            html.push_str("        <tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", escape_html(cell));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("      </tbody>\n    </table>\n  </div>\n");
    }

    for note in &card.notes {
        let _ = writeln!(html, "  <p class=\"helper\" style=\"margin-top:12px;\">{}</p>", escape_html(note));
    }
    for attachment in &card.attachments {
        let _ = writeln!(
            html,
            "  <p class=\"helper\">Download: {} ({}, {} bytes)</p>",
            escape_html(&attachment.file_name),
            escape_html(&attachment.mime),
            attachment.bytes.len()
        );
    }

    html.push_str("</section>\n");
    html
}

fn text_table(out: &mut String, table: &Table) {
    let columns = table
        .headers
        .len()
        .max(table.rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&table.headers).chain(table.rows.iter()) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let line = |out: &mut String, row: &[String]| {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  ").trim_end());
    };
    if let Some(caption) = &table.caption {
        let _ = writeln!(out, "\n{}", caption);
    } else {
        out.push('\n');
    }
    line(out, &table.headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "  {}", rule.join("  "));
    for row in &table.rows {
        line(out, row);
    }
}

pub fn to_text(card: &Card) -> String {
    let mut out = String::new();
    if let Some(title) = &card.title {
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    }
    if let Some(headline) = &card.headline {
        let prefix = if card.tone == Tone::Error { "! " } else { "" };
        let _ = writeln!(out, "{}{}", prefix, headline);
    }
    let label_width = card
        .stats
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    for stat in &card.stats {
        let _ = write!(out, "{:<width$}  {}", stat.label, stat.value, width = label_width);
        if let Some(hint) = &stat.hint {
            let _ = write!(out, "  ({})", hint);
        }
        out.push('\n');
    }
    for table in &card.tables {
        text_table(&mut out, table);
    }
    if !card.notes.is_empty() {
        out.push('\n');
        for note in &card.notes {
            let _ = writeln!(out, "{}", note);
        }
    }
    out
}

pub fn to_json(card: &Card) -> Result<String> {
    Ok(serde_json::to_string_pretty(card)?)
}

pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| CalcError::ProcessingError {
        message: format!("CSV flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| CalcError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Zip archive with the card in every format plus its attachments.
pub fn bundle(card: &Card, name: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(format!("{}.html", name), FileOptions::default())?;
    zip.write_all(to_html(card).as_bytes())?;

    zip.start_file::<_, ()>(format!("{}.txt", name), FileOptions::default())?;
    zip.write_all(to_text(card).as_bytes())?;

    zip.start_file::<_, ()>(format!("{}.json", name), FileOptions::default())?;
    zip.write_all(to_json(card)?.as_bytes())?;

    for (i, table) in card.tables.iter().enumerate() {
        zip.start_file::<_, ()>(format!("{}-table-{}.csv", name, i + 1), FileOptions::default())?;
        zip.write_all(table_to_csv(table)?.as_bytes())?;
    }

    for attachment in &card.attachments {
        zip.start_file::<_, ()>(attachment.file_name.clone(), FileOptions::default())?;
        zip.write_all(&attachment.bytes)?;
    }

    let cursor = zip.finish()?;
    tracing::debug!(
        "Bundled {} tables and {} attachments",
        card.tables.len(),
        card.attachments.len()
    );
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Attachment;

    fn sample() -> Card {
        let mut table = Table::new(&["Year", "Balance"]);
        table.push(&["1", "$1,000.00"]);
        Card::new("Loan <summary>")
            .stat("Monthly payment", "$1,198.10")
            .table(table)
            .note("Rates & fees vary.")
    }

    #[test]
    fn test_html_uses_card_markup() {
        let html = to_html(&sample());
        assert!(html.starts_with("<section class=\"card\">"));
        assert!(html.contains("<div class=\"stat\"><span class=\"label\">Monthly payment</span><span class=\"value\">$1,198.10</span></div>"));
        assert!(html.contains("Loan &lt;summary&gt;"));
        assert!(html.contains("<p class=\"helper\" style=\"margin-top:12px;\">Rates &amp; fees vary.</p>"));
        assert!(html.contains("<td>$1,000.00</td>"));
    }

    #[test]
    fn test_error_card_html() {
        let html = to_html(&Card::message("Please enter a loan amount above zero."));
        assert!(html.contains("class=\"card error\""));
        assert!(html.contains("<p>Please enter a loan amount above zero.</p>"));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = table_to_csv(&sample().tables[0]).unwrap();
        assert_eq!(csv, "Year,Balance\n1,\"$1,000.00\"\n");
    }

    #[test]
    fn test_text_lists_stats() {
        let text = to_text(&sample());
        assert!(text.contains("Monthly payment  $1,198.10"));
        assert!(text.contains("Rates & fees vary."));
    }

    #[test]
    fn test_bundle_contains_entries() {
        let card = sample().attach(Attachment {
            file_name: "qr-code.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });
        let bytes = bundle(&card, "loan-calculator").unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(String::from).collect();
        assert!(names.contains(&"loan-calculator.html".to_string()));
        assert!(names.contains(&"loan-calculator-table-1.csv".to_string()));
        assert!(names.contains(&"qr-code.png".to_string()));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
