// ============================================================
// Layer 4 — .pdf Page Extractor
// ============================================================
// Extracts the text of every page of a PDF with lopdf and
// concatenates it in page order, with no separator added.

use anyhow::{anyhow, Context, Result};
use lopdf::Document as PdfDocument;
use std::{fs, path::Path};

use crate::domain::traits::TextExtractor;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPageExtractor;

impl TextExtractor for PdfPageExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        extract_pages(&bytes)
            .with_context(|| format!("Cannot extract text from '{}'", path.display()))
    }
}

/// Parse a PDF byte buffer and return all page text in order.
pub fn extract_pages(bytes: &[u8]) -> Result<String> {
    let pdf = PdfDocument::load_mem(bytes)
        .map_err(|e| anyhow!("lopdf parse error: {e}"))?;

    // get_pages() is keyed by 1-based page number, so iteration is in page order
    let pages = pdf.get_pages();
    let mut text = String::new();

    for page_number in pages.keys() {
        let page_text = pdf
            .extract_text(&[*page_number])
            .map_err(|e| anyhow!("page {page_number}: {e}"))?;
        text.push_str(&page_text);
    }

    tracing::debug!("Extracted {} pages ({} chars)", pages.len(), text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a small PDF with one line of text per page.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let bytes = build_pdf(&["Rinite alergica", "Tabagismo cronico"]);
        let text = extract_pages(&bytes).unwrap();

        let first  = text.find("Rinite").expect("first page text");
        let second = text.find("Tabagismo").expect("second page text");
        assert!(first < second);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, build_pdf(&["Asma"])).unwrap();

        let a = PdfPageExtractor.extract(&path).unwrap();
        let b = PdfPageExtractor.extract(&path).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_not_a_pdf_is_an_error() {
        assert!(extract_pages(b"%PDF-garbage").is_err());
    }
}
