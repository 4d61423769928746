use serde::{Deserialize, Serialize};

/// OOXML wordprocessing MIME type, as declared by browsers for `.docx` uploads.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Canonical format tag carried through the pipeline.
///
/// Every input collapses to one of these three tags; anything the detector
/// does not recognize is treated as plain text rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detects the format of an uploaded document.
    ///
    /// The declared MIME type takes precedence; the file-name extension is the
    /// fallback discriminator; everything else is plain text.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Self {
        if let Some(mime) = content_type {
            if let Some(format) = Self::from_mime(mime) {
                return format;
            }
        }
        if let Some(name) = file_name {
            if let Some(format) = Self::from_extension(name) {
                return format;
            }
        }
        DocumentFormat::Txt
    }

    fn from_mime(mime: &str) -> Option<Self> {
        // Browsers occasionally append parameters ("text/plain; charset=utf-8").
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence {
            "application/pdf" => Some(DocumentFormat::Pdf),
            DOCX_MIME | "application/msword" => Some(DocumentFormat::Docx),
            "text/plain" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }

    /// MIME type the download boundary wraps the regenerated bytes with.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => DOCX_MIME,
            DocumentFormat::Txt => "text/plain",
        }
    }

    /// File name offered to the download consumer.
    pub fn download_file_name(&self) -> String {
        format!("enhanced_resume.{}", self.extension())
    }
}
