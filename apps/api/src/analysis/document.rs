//! Resume upload text extraction. PDFs go through `pdf-extract`; plain text
//! is taken as UTF-8. Anything else is refused.

use bytes::Bytes;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

fn detect_kind(file_name: Option<&str>, content_type: Option<&str>, data: &[u8]) -> Option<DocumentKind> {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    if data.starts_with(PDF_MAGIC)
        || content_type == Some("application/pdf")
        || extension.as_deref() == Some("pdf")
    {
        return Some(DocumentKind::Pdf);
    }

    let is_text_type = content_type.is_some_and(|ct| ct.starts_with("text/"));
    let is_text_ext = matches!(extension.as_deref(), Some("txt" | "md"));
    if is_text_type || is_text_ext {
        return Some(DocumentKind::PlainText);
    }

    None
}

/// Extracts the resume body from an uploaded file.
pub async fn extract_resume_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("uploaded resume is empty".to_string()));
    }

    match detect_kind(file_name, content_type, &data) {
        Some(DocumentKind::Pdf) => {
            // pdf-extract is synchronous and CPU-bound, and it panics on some malformed files
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| {
                if e.is_panic() {
                    AppError::Validation("could not read PDF".to_string())
                } else {
                    AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
                }
            })?
            .map_err(|e| AppError::Validation(format!("could not read PDF: {e}")))?;
            Ok(text)
        }
        Some(DocumentKind::PlainText) => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Validation("resume text is not valid UTF-8".to_string())),
        None => Err(AppError::Validation(
            "unsupported resume format; upload a PDF or plain-text file".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf_by_magic_bytes() {
        assert_eq!(
            detect_kind(None, None, b"%PDF-1.7 ..."),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_detect_pdf_by_extension_or_content_type() {
        assert_eq!(detect_kind(Some("cv.PDF"), None, b"x"), Some(DocumentKind::Pdf));
        assert_eq!(
            detect_kind(None, Some("application/pdf"), b"x"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_detect_plain_text() {
        assert_eq!(
            detect_kind(Some("resume.txt"), None, b"hello"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            detect_kind(None, Some("text/plain; charset=utf-8"), b"hello"),
            Some(DocumentKind::PlainText)
        );
    }

    #[test]
    fn test_unknown_format_is_not_detected() {
        assert_eq!(detect_kind(Some("resume.docx"), None, b"PK\x03\x04"), None);
    }

    #[tokio::test]
    async fn test_plain_text_upload_is_returned() {
        let text = extract_resume_text(Some("resume.txt"), None, Bytes::from("Rust engineer"))
            .await
            .unwrap();
        assert_eq!(text, "Rust engineer");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_validation_error() {
        let result = extract_resume_text(Some("resume.txt"), None, Bytes::from_static(&[0xff, 0xfe])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_a_validation_error() {
        let result = extract_resume_text(
            Some("resume.pdf"),
            Some("application/pdf"),
            Bytes::from_static(b"%PDF-1.4 truncated"),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let result = extract_resume_text(Some("resume.pdf"), None, Bytes::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
