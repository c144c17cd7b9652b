//! Text Extractor: turns resume PDF bytes into page-ordered plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::errors::AnalyzeError;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Source of page text. The PDF implementation is the default; the seam exists so the
/// pipeline can run over any byte source that yields pages.
pub trait TextExtractor: Send + Sync {
    /// Returns the raw text of every page, in page order.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, AnalyzeError>;
}

/// `pdf-extract` backed extractor. No OCR: a PDF without a text layer yields empty pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, AnalyzeError> {
        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(AnalyzeError::UnreadableDocument(
                "input is not a PDF (missing %PDF- header)".to_string(),
            ));
        }

        pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| AnalyzeError::UnreadableDocument(format!("PDF parsing failed: {e}")))
    }
}

/// A resume as received for one request: the caller's bytes plus the text pulled from them.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    bytes: &'a [u8],
    text: String,
    page_count: usize,
}

impl<'a> Document<'a> {
    /// Extracts and normalizes the text of `bytes`.
    /// Fails with `UnreadableDocument` when no page carries any text.
    pub fn extract<E>(bytes: &'a [u8], extractor: &E) -> Result<Self, AnalyzeError>
    where
        E: TextExtractor + ?Sized,
    {
        let pages = extractor.extract_pages(bytes)?;
        let page_count = pages.len();

        let mut normalized = Vec::with_capacity(page_count);
        for (idx, page) in pages.iter().enumerate() {
            let page_text = normalize_page(page);
            if page_text.is_empty() {
                debug!("No text found on page {}", idx + 1);
                continue;
            }
            normalized.push(page_text);
        }

        if normalized.is_empty() {
            warn!(page_count, "No text extracted from document; it may be a scanned PDF");
            return Err(AnalyzeError::UnreadableDocument(
                "document has no extractable text layer".to_string(),
            ));
        }

        let text = normalized.join("\n");
        debug!(page_count, chars = text.len(), "Extracted resume text");

        Ok(Self {
            bytes,
            text,
            page_count,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

/// NFC-normalizes a page, collapses space runs and blank-line runs, keeps single line breaks.
fn normalize_page(page: &str) -> String {
    let nfc: String = page.replace("\r\n", "\n").nfc().collect();
    let cleaned = RE_SPACES.replace_all(&nfc, " ");
    let cleaned = RE_BLANK_LINES.replace_all(&cleaned, "\n\n");
    cleaned
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    struct StaticPages(Vec<&'static str>);

    impl TextExtractor for StaticPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, AnalyzeError> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    /// Builds a single-page PDF; each entry of `lines` is drawn on its own baseline.
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (720 - 20 * idx as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
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
    fn test_pdf_with_text_layer_extracts_lines() {
        let bytes = build_pdf(&["Jane Doe", "Skills Python SQL Docker"]);
        let doc = Document::extract(&bytes, &PdfTextExtractor).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.text().contains("Jane Doe"), "text was {:?}", doc.text());
        assert!(doc.text().contains("Python SQL Docker"), "text was {:?}", doc.text());
        assert_eq!(doc.bytes().len(), bytes.len());
    }

    #[test]
    fn test_pdf_without_text_layer_is_unreadable() {
        let bytes = build_pdf(&[]);
        let err = Document::extract(&bytes, &PdfTextExtractor).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnreadableDocument(_)));
    }

    #[test]
    fn test_non_pdf_bytes_are_unreadable() {
        let err = Document::extract(b"Plain text resume", &PdfTextExtractor).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnreadableDocument(_)));
    }

    #[test]
    fn test_truncated_pdf_is_unreadable() {
        let err = Document::extract(b"%PDF-1.5\n%%EOF", &PdfTextExtractor).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnreadableDocument(_)));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let bytes = build_pdf(&["Senior Engineer", "Jan 2019 - Mar 2021"]);
        let first = Document::extract(&bytes, &PdfTextExtractor).unwrap();
        let second = Document::extract(&bytes, &PdfTextExtractor).unwrap();
        assert_eq!(first.text(), second.text());
    }

    #[test]
    fn test_pages_joined_in_order_skipping_blank_pages() {
        let extractor = StaticPages(vec!["Page one\nline two", "   \n ", "Page three"]);
        let doc = Document::extract(b"ignored", &extractor).unwrap();
        assert_eq!(doc.text(), "Page one\nline two\nPage three");
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_all_blank_pages_is_unreadable() {
        let extractor = StaticPages(vec!["", "  \n\n "]);
        let err = Document::extract(b"ignored", &extractor).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnreadableDocument(_)));
    }

    #[test]
    fn test_normalize_page_collapses_whitespace_keeps_line_breaks() {
        let input = "Hello   world\n\n\n\nTest  line\r\nnext";
        assert_eq!(normalize_page(input), "Hello world\n\nTest line\nnext");
    }
}
