//! Report text extraction
//!
//! Blood test reports arrive as PDFs; the pipeline only ever sees the
//! extracted text. Extraction problems are pipeline errors: they fail the
//! job, never the upload.

use crate::types::{AppError, AppResult};
use lopdf::Document;
use std::path::Path;

/// Extract the full text of a PDF, pages joined by newlines.
pub fn extract_text(path: &Path) -> AppResult<String> {
    let doc = Document::load(path).map_err(|e| {
        AppError::Pipeline(format!("could not open report {}: {e}", path.display()))
    })?;

    let mut full_report = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
            AppError::Pipeline(format!("could not extract text from page {page_number}: {e}"))
        })?;
        full_report.push_str(&page_text);
        full_report.push('\n');
    }

    Ok(full_report)
}

/// Collapse runs of spaces left behind by PDF layout.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_was_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !previous_was_space {
                out.push(ch);
            }
            previous_was_space = true;
        } else {
            out.push(ch);
            previous_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn write_single_page_pdf(path: &Path, line: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn extracts_page_text_from_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        write_single_page_pdf(&path, "Hemoglobin 13.5 g/dL");

        let text = extract_text(&path).unwrap();
        assert!(text.contains("Hemoglobin"), "extracted: {text:?}");
    }

    #[test]
    fn missing_files_are_pipeline_errors() {
        let err = extract_text(Path::new("data/definitely-missing.pdf")).unwrap_err();
        assert!(matches!(err, AppError::Pipeline(_)));
    }

    #[test]
    fn normalize_collapses_space_runs() {
        assert_eq!(normalize_whitespace("WBC   4.5  10^9/L"), "WBC 4.5 10^9/L");
        assert_eq!(normalize_whitespace("no change"), "no change");
        assert_eq!(normalize_whitespace("keep\n\nnewlines"), "keep\n\nnewlines");
    }
}
