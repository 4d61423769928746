//! Enhancement pipeline — orchestrates one resume's trip through the system.
//!
//! Flow: extract → build prompt → AI call (quota-gated in the client) →
//! parse/normalize → render → base64.
//!
//! Every stage hands owned values to the next; nothing is shared between
//! overlapping invocations, so a stale in-flight request can finish (and be
//! discarded by the client) without corrupting a newer one.

use tracing::{info, warn};

use crate::enhancement::parser::parse_reply;
use crate::enhancement::prompts::build_enhancement_prompt;
use crate::errors::AppError;
use crate::extraction::{self, DocumentFormat, SourceDocument};
use crate::llm_client::TextGenerator;
use crate::render;

/// Output of one successful pipeline run. Superseded, never mutated, by the
/// next run.
#[derive(Debug, Clone)]
pub struct EnhancementResult {
    /// Full raw model reply, for user-facing presentation.
    pub display_text: String,
    /// Scrubbed resume body the document was regenerated from.
    pub clean_text: String,
    pub file_bytes: Vec<u8>,
    pub format: DocumentFormat,
    pub base64: String,
}

/// Runs the full enhancement pipeline for a single uploaded document.
///
/// Steps:
/// 1. extract() → ExtractedText (aborts on empty/corrupt input)
/// 2. build_enhancement_prompt() → prompt (pure)
/// 3. TextGenerator::generate() → raw reply
/// 4. parse_reply() → display/clean split (never fails)
/// 5. render::generate() + base64 → downloadable bytes
pub async fn enhance_resume(
    llm: &dyn TextGenerator,
    doc: SourceDocument,
    uploader_name: &str,
    language: &str,
) -> Result<EnhancementResult, AppError> {
    // Step 1: Extract. An empty extraction must never reach the AI service.
    let extracted = extraction::extract(&doc)?;
    info!(
        format = extracted.format.extension(),
        chars = extracted.text.len(),
        "resume text extracted"
    );

    // Step 2: Build the prompt.
    let prompt =
        build_enhancement_prompt(&extracted.text, extracted.format, uploader_name, language);

    // Step 3: One AI call. No automatic retries; rate limits become cooldown
    // state inside the client.
    let reply = llm.generate(&prompt).await?;

    // Step 4: Best-effort split and scrub.
    let parsed = parse_reply(&reply);
    if parsed.clean_text.is_empty() {
        warn!("reply normalized to an empty resume body; rendering will produce a title-only document");
    }

    // Step 5: Regenerate the document in the source format.
    let file_bytes = render::generate(&parsed.clean_text, extracted.format, uploader_name)?;
    let base64 = render::to_base64(&file_bytes);

    info!(
        format = extracted.format.extension(),
        bytes = file_bytes.len(),
        "enhancement pipeline complete"
    );

    Ok(EnhancementResult {
        display_text: parsed.display_text,
        clean_text: parsed.clean_text,
        file_bytes,
        format: extracted.format,
        base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;

    use crate::llm_client::LlmError;

    struct CannedGenerator {
        reply: String,
        called: AtomicBool,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn txt_doc(content: &str) -> SourceDocument {
        SourceDocument {
            bytes: Bytes::copy_from_slice(content.as_bytes()),
            content_type: Some("text/plain".to_string()),
            file_name: Some("resume.txt".to_string()),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_marker_scenario() {
        let reply = "=== ATS ANALYSIS ===\nOriginal ATS Score: 40/100\n###RESUME_START###\nEXPERIENCE\nDid things, well.\n";
        let llm = CannedGenerator::new(reply);

        let result = enhance_resume(&llm, txt_doc("EXPERIENCE\nDid things.\n"), "Jordan", "en")
            .await
            .unwrap();

        assert_eq!(result.clean_text, "EXPERIENCE\nDid things, well.");
        assert_eq!(result.display_text, reply);
        assert_eq!(result.format, DocumentFormat::Txt);

        // The txt bytes and their base64 round-trip exactly.
        assert_eq!(result.file_bytes, result.clean_text.as_bytes());
        assert_eq!(
            STANDARD.decode(&result.base64).unwrap(),
            result.clean_text.as_bytes()
        );
    }

    #[tokio::test]
    async fn test_empty_document_never_reaches_the_ai_service() {
        let llm = CannedGenerator::new("unused");

        let err = enhance_resume(&llm, txt_doc("   \n  "), "Jordan", "en")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Extraction(crate::extraction::ExtractionError::EmptyContent)
        ));
        assert!(!llm.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_ai_errors_propagate_without_masking() {
        struct FailingGenerator;

        #[async_trait]
        impl TextGenerator for FailingGenerator {
            async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
                Err(LlmError::InvalidResponse)
            }
        }

        let err = enhance_resume(
            &FailingGenerator,
            txt_doc("EXPERIENCE\nDid things."),
            "Jordan",
            "en",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::AiService(LlmError::InvalidResponse)
        ));
    }

    #[tokio::test]
    async fn test_format_tag_flows_through_to_the_result() {
        let reply = "###RESUME_START###\nSKILLS\nRust";
        let llm = CannedGenerator::new(reply);
        let doc = SourceDocument {
            bytes: Bytes::copy_from_slice(b"SKILLS\nRust"),
            content_type: Some("application/octet-stream".to_string()),
            file_name: Some("resume.weird".to_string()),
        };

        let result = enhance_resume(&llm, doc, "Jordan", "en").await.unwrap();
        assert_eq!(result.format, DocumentFormat::Txt);
    }
}
