//! Linear text extraction via `pdf-extract`.
//!
//! Parsing is deterministic, so failures are returned as-is and never retried.

use std::time::Instant;

use clausewise_core::{ExtractedText, RawDocument, UploadLimits};
use tracing::{debug, warn};

use crate::error::ExtractError;

/// Extract plain text from an accepted upload.
///
/// CPU-bound; async callers should run it on a blocking thread.
pub fn extract_text(doc: &RawDocument) -> Result<ExtractedText, ExtractError> {
    let start = Instant::now();
    let bytes = doc.bytes();

    // pdf-extract can panic on malformed PDFs.
    let raw = match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(size = doc.size(), error = %e, "PDF parse failed");
            return Err(ExtractError::ParseFailure(e.to_string()));
        }
        Err(_) => {
            warn!(size = doc.size(), "PDF parser panicked");
            return Err(ExtractError::ParseFailure(
                "PDF parser panicked (malformed file)".to_string(),
            ));
        }
    };

    let text = ExtractedText::new(tidy(&raw)).ok_or(ExtractError::EmptyResult)?;
    debug!(
        size = doc.size(),
        chars = text.char_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "extracted PDF text"
    );
    Ok(text)
}

/// Validate raw upload bytes and extract their text in one step.
pub fn extract_from_bytes(
    bytes: Vec<u8>,
    declared_type: Option<&str>,
    limits: &UploadLimits,
) -> Result<ExtractedText, ExtractError> {
    let doc = RawDocument::new(bytes, declared_type, limits)?;
    extract_text(&doc)
}

/// Normalise line endings, drop trailing spaces, and cap blank runs at one empty line.
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;
    for line in raw.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.is_empty() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use clausewise_core::InvalidInput;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a one-page PDF that shows `text` in Courier, or an empty page for `None`.
    fn single_page_pdf(text: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn accept(bytes: Vec<u8>) -> RawDocument {
        RawDocument::new(bytes, Some("application/pdf"), &UploadLimits::default()).unwrap()
    }

    #[test]
    fn extracts_text_from_pdf() {
        let doc = accept(single_page_pdf(Some("Mutual Confidentiality Agreement")));
        let text = extract_text(&doc).unwrap();
        assert!(
            text.as_str().contains("Confidentiality"),
            "got {:?}",
            text.as_str()
        );
    }

    #[test]
    fn page_without_text_is_empty_result() {
        let doc = accept(single_page_pdf(None));
        let err = extract_text(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyResult), "got {err:?}");
        assert_eq!(err.kind(), clausewise_core::ErrorKind::EmptyResult);
    }

    #[test]
    fn garbage_after_signature_is_parse_failure() {
        let doc = accept(b"%PDF-1.4\nthis is not really a pdf".to_vec());
        let err = extract_text(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailure(_)), "got {err:?}");
    }

    #[test]
    fn from_bytes_checks_input_first() {
        let err = extract_from_bytes(Vec::new(), Some("application/pdf"), &UploadLimits::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidInput(InvalidInput::EmptyFile)
        ));

        let err = extract_from_bytes(
            single_page_pdf(Some("x")),
            Some("text/plain"),
            &UploadLimits::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), clausewise_core::ErrorKind::InvalidInput);
    }

    #[test]
    fn tidy_collapses_blank_runs() {
        let raw = "\r\n\r\nAGREEMENT  \r\n\r\n\r\n\r\n1. Term\n\n\n2. Fees   \n\n";
        assert_eq!(tidy(raw), "AGREEMENT\n\n1. Term\n\n2. Fees");
    }

    #[test]
    fn tidy_of_whitespace_is_empty() {
        assert_eq!(tidy("  \n\n \t \n"), "");
    }
}
