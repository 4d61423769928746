// All prompt constants for the enhancement pipeline.
// The output contract here is load-bearing: the parser splits the reply on
// RESUME_START_MARKER, so the marker text must match exactly.

use crate::extraction::DocumentFormat;

/// Literal separator the model must emit between its analysis block and the
/// rewritten resume. Chosen so it cannot collide with legitimate resume
/// content; it must never be changed independently of the parser.
pub const RESUME_START_MARKER: &str = "###RESUME_START###";

/// Enhancement prompt template.
/// Replace: {language_directive}, {uploader_name}, {source_format},
///          {marker}, {resume_text}
const ENHANCEMENT_PROMPT_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) resume optimizer.
{language_directive}

Rewrite the resume below to maximize its ATS score: strengthen keywords, clarify
impact, and fix weak formatting. Keep every claim factual — never invent
employers, dates, or credentials. The candidate's name is {uploader_name}. The
resume was uploaded as a {source_format} file.

OUTPUT CONTRACT — follow it exactly, no exceptions:
1. First, an analysis block containing:
   - "Original ATS Score: <number>/100"
   - "Enhanced ATS Score: <number>/100"
   - A short list of the most important improvements you made
2. Then the exact marker below, alone on its own line:
{marker}
3. After the marker: NOTHING but the full rewritten resume text. No commentary,
   no scores, no markdown formatting, no code fences.

Resume content:
{resume_text}"#;

/// Language directive mapping. Unknown codes silently fall back to English.
fn language_directive(language: &str) -> &'static str {
    match language {
        "fr" => "Write the analysis and the rewritten resume in French.",
        "es" => "Write the analysis and the rewritten resume in Spanish.",
        _ => "Write the analysis and the rewritten resume in English.",
    }
}

/// Builds the enhancement prompt. Pure function: same inputs, same prompt.
pub fn build_enhancement_prompt(
    resume_text: &str,
    format: DocumentFormat,
    uploader_name: &str,
    language: &str,
) -> String {
    ENHANCEMENT_PROMPT_TEMPLATE
        .replace("{language_directive}", language_directive(language))
        .replace("{uploader_name}", uploader_name)
        .replace("{source_format}", format.extension())
        .replace("{marker}", RESUME_START_MARKER)
        .replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_verbatim_and_marker() {
        let prompt = build_enhancement_prompt(
            "EXPERIENCE\nDid things.",
            DocumentFormat::Pdf,
            "Jordan",
            "en",
        );
        assert!(prompt.contains("EXPERIENCE\nDid things."));
        assert!(prompt.contains(RESUME_START_MARKER));
        assert!(prompt.contains("Jordan"));
        assert!(prompt.contains("a pdf file"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_enhancement_prompt("text", DocumentFormat::Txt, "A", "fr");
        let b = build_enhancement_prompt("text", DocumentFormat::Txt, "A", "fr");
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_language_directives() {
        assert!(language_directive("fr").contains("French"));
        assert!(language_directive("es").contains("Spanish"));
        assert!(language_directive("en").contains("English"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert!(language_directive("de").contains("English"));
        assert!(language_directive("").contains("English"));
    }
}
