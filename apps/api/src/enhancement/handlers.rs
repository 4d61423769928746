//! Axum route handlers for the Enhancement API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::enhancement::pipeline::{enhance_resume, EnhancementResult};
use crate::errors::AppError;
use crate::extraction::{DocumentFormat, SourceDocument};
use crate::quota::QuotaErrorState;
use crate::state::AppState;

/// Response for a successful enhancement.
///
/// Everything the download boundary needs travels in-band: the base64 payload,
/// the format tag, and the MIME type + file name to wrap the decoded bytes
/// with.
#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub display_text: String,
    pub clean_text: String,
    pub base64: String,
    pub format: DocumentFormat,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl From<EnhancementResult> for EnhanceResponse {
    fn from(result: EnhancementResult) -> Self {
        Self {
            file_name: result.format.download_file_name(),
            mime_type: result.format.mime_type(),
            display_text: result.display_text,
            clean_text: result.clean_text,
            base64: result.base64,
            format: result.format,
        }
    }
}

/// POST /api/v1/enhance (multipart)
///
/// Fields: `file` (required), `language` (optional, defaults to "en"),
/// `name` (optional; falls back to the file-name stem, then "Anonymous").
pub async fn handle_enhance(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnhanceResponse>, AppError> {
    let mut document: Option<SourceDocument> = None;
    let mut language: Option<String> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                document = Some(SourceDocument {
                    bytes,
                    content_type,
                    file_name,
                });
            }
            "language" => {
                language = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read 'language' field: {e}"))
                })?);
            }
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read 'name' field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))?;

    let uploader_name = resolve_uploader_name(name.as_deref(), document.file_name.as_deref());
    let language = language.unwrap_or_else(|| "en".to_string());

    let result = enhance_resume(&state.llm, document, &uploader_name, &language).await?;
    Ok(Json(EnhanceResponse::from(result)))
}

/// GET /api/v1/quota
///
/// Read-only snapshot of the cooldown state, so the UI can show a countdown
/// instead of re-attempting enhancements.
pub async fn handle_quota_state(State(state): State<AppState>) -> Json<QuotaErrorState> {
    Json(state.quota.snapshot())
}

/// Explicit name, else the upload's file-name stem, else "Anonymous".
fn resolve_uploader_name(name: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(name) = name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    file_name
        .and_then(|f| f.split('.').next())
        .filter(|stem| !stem.trim().is_empty())
        .map(|stem| stem.trim().to_string())
        .unwrap_or_else(|| "Anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_name_wins() {
        assert_eq!(
            resolve_uploader_name(Some("Jordan Smith"), Some("resume.pdf")),
            "Jordan Smith"
        );
    }

    #[test]
    fn test_file_stem_fallback() {
        assert_eq!(
            resolve_uploader_name(None, Some("jordan_smith.pdf")),
            "jordan_smith"
        );
    }

    #[test]
    fn test_anonymous_fallback() {
        assert_eq!(resolve_uploader_name(None, None), "Anonymous");
        assert_eq!(resolve_uploader_name(Some("  "), Some(".hidden")), "Anonymous");
    }

    #[test]
    fn test_response_carries_download_metadata() {
        let result = EnhancementResult {
            display_text: "full reply".to_string(),
            clean_text: "EXPERIENCE".to_string(),
            file_bytes: b"EXPERIENCE".to_vec(),
            format: DocumentFormat::Pdf,
            base64: "RVhQRVJJRU5DRQ==".to_string(),
        };
        let response = EnhanceResponse::from(result);
        assert_eq!(response.file_name, "enhanced_resume.pdf");
        assert_eq!(response.mime_type, "application/pdf");
    }
}
