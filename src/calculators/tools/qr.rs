use crate::core::{Calculator, Card, Env};
use crate::domain::model::{Attachment, Form, QrRequest, Tone};
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;

pub const ECC_LEVELS: [char; 4] = ['L', 'M', 'Q', 'H'];

fn clamp(value: f64, min: u32, max: u32) -> u32 {
    if !value.is_finite() {
        return min;
    }
    value.round().clamp(f64::from(min), f64::from(max)) as u32
}

/// Normalises the form into a request: size 120-600, margin 0-20, ECC L/M/Q/H
/// with unknown levels treated as M.
pub fn request(form: &Form) -> Result<QrRequest> {
    let data = form
        .get("text")
        .ok_or_else(|| CalcError::invalid("Enter some text or a link to build a QR code."))?;
    let ecc = form
        .text_or("ecc", "M")
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| ECC_LEVELS.contains(c))
        .unwrap_or('M');
    Ok(QrRequest {
        data: data.to_string(),
        size: clamp(form.value_or("size", 300.0), 120, 600),
        margin: clamp(form.value_or("margin", 4.0), 0, 20),
        ecc,
    })
}

pub struct QrCodeGenerator;

#[async_trait]
impl Calculator for QrCodeGenerator {
    fn key(&self) -> &'static str {
        "qr-code-generator"
    }

    async fn run(&self, form: &Form, env: &Env) -> Result<Card> {
        let request = request(form)?;
        let remote_url = env.qr.image_url(&request)?;
        let card = Card::new("QR code preview")
            .stat("Size", format!("{0}×{0} px", request.size))
            .stat("Margin", request.margin.to_string())
            .stat("Error correction", request.ecc.to_string());

        let card = match env.qr.render(&request).await {
            Ok(bytes) => card
                .attach(Attachment {
                    file_name: "qr-code.png".to_string(),
                    mime: "image/png".to_string(),
                    bytes,
                })
                .note("Download saves a PNG you can drop into a document or share immediately."),
            Err(e) => {
                tracing::warn!("QR render failed, linking remote preview: {}", e);
                card.tone(Tone::Warning)
                    .stat("Image URL", remote_url.clone())
                    .note("We fell back to the QR server preview. Open the link above to view or save it.")
            }
        };

        card.data(&serde_json::json!({
            "data": request.data,
            "size": request.size,
            "margin": request.margin,
            "ecc": request.ecc.to_string(),
            "remote_url": remote_url,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_request_clamps() {
        let form = Form::new()
            .with("text", "hello")
            .with("size", "1000")
            .with("margin", "-3")
            .with("ecc", "x");
        let r = request(&form).unwrap();
        assert_eq!((r.size, r.margin, r.ecc), (600, 0, 'M'));
        let form = Form::new().with("text", "hi").with("size", "50").with("ecc", "h");
        let r = request(&form).unwrap();
        assert_eq!((r.size, r.ecc), (120, 'H'));
    }

    #[test]
    fn test_blank_text() {
        assert!(request(&Form::new().with("text", "   ")).is_err());
    }

    #[tokio::test]
    async fn test_offline_links_remote_image() {
        let env = Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let card = QrCodeGenerator
            .run(&Form::new().with("text", "https://example.com"), &env)
            .await
            .unwrap();
        assert_eq!(card.tone, Tone::Warning);
        assert!(card.attachments.is_empty());
        assert!(card
            .stat_value("Image URL")
            .is_some_and(|u| u.starts_with("https://api.qrserver.com/")));
    }
}
