//! Response parsing and normalization.
//!
//! The upstream model is asked for a strict output contract (analysis block,
//! marker, clean resume) but replies are not contractually structured — the
//! generator is non-deterministic and occasionally ignores formatting
//! instructions. Parsing therefore never fails: a small ordered list of
//! extraction strategies picks the candidate resume body (marker split →
//! section-keyword scan → whole reply), then line-level scrubbing removes the
//! markup and score artifacts the split let through.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enhancement::prompts::RESUME_START_MARKER;

/// Best-effort split of a raw model reply.
///
/// `display_text` is always the full reply, verbatim, for user-facing
/// presentation; `clean_text` is the scrubbed resume body suitable for
/// document regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub display_text: String,
    pub clean_text: String,
}

pub fn parse_reply(raw: &str) -> ParsedReply {
    let candidate = split_after_marker(raw)
        .or_else(|| split_at_section_keyword(raw))
        .unwrap_or(raw);

    ParsedReply {
        display_text: raw.to_string(),
        clean_text: normalize_body(candidate),
    }
}

// ── Strategy 1: marker split ─────────────────────────────────────────────────

fn split_after_marker(raw: &str) -> Option<&str> {
    raw.split_once(RESUME_START_MARKER).map(|(_, after)| after)
}

// ── Strategy 2: first canonical section keyword ──────────────────────────────

/// Section names the model is likely to keep even when it drops the marker,
/// in the three languages the UI offers.
const SECTION_KEYWORDS: &[&str] = &[
    "experience",
    "work history",
    "employment",
    "education",
    "skills",
    "summary",
    "objective",
    "profile",
    "expérience",
    "formation",
    "compétences",
    "experiencia",
    "educación",
    "habilidades",
    "resumen",
    "objetivo",
];

fn split_at_section_keyword(raw: &str) -> Option<&str> {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let lowered = line.to_lowercase();
        if SECTION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return Some(&raw[offset..]);
        }
        offset += line.len();
    }
    None
}

// ── Normalization ────────────────────────────────────────────────────────────

/// A line consisting only of separator/markup characters (rules, fences,
/// decorations around the analysis block).
static RE_MARKUP_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s=\-_*#~`•·+|]+$").unwrap());

/// Leading markdown heading markers; the heading text itself is kept.
static RE_HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s*").unwrap());

/// Score lines the model was asked to keep above the marker but sometimes
/// repeats below it.
static RE_SCORE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(ats\s*score|^\s*(original|enhanced|overall)\s+score\b|^\s*score\s*[:=]|\b\d{1,3}\s*/\s*100\b)")
        .unwrap()
});

/// Analysis/explanation block headings that leaked past the split.
static RE_ANALYSIS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(analysis|improvements?|key improvements|explanation)\b\s*:?\s*$").unwrap());

/// Leading list-bullet markers; the item text itself is kept.
static RE_BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*•·]\s+").unwrap());

/// Line-level scrub of the candidate resume body.
///
/// Passes, in order: drop markup-only lines, strip heading markers, strip
/// inline emphasis, drop score/analysis lines, strip bullet prefixes, drop
/// lines the stripping emptied. Blank lines authored as paragraph spacing
/// survive; the renderer turns them into vertical space.
fn normalize_body(candidate: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for raw_line in candidate.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        if RE_MARKUP_ONLY.is_match(raw_line) {
            continue;
        }

        let line = RE_HEADING_MARKER.replace(raw_line, "").to_string();
        let line = strip_inline_emphasis(&line);

        if RE_SCORE_LINE.is_match(&line) || RE_ANALYSIS_LINE.is_match(&line) {
            continue;
        }

        let line = RE_BULLET_PREFIX.replace(&line, "").to_string();
        let line = line.trim().to_string();

        // Stripping reduced a non-blank line to nothing: drop it entirely.
        if line.is_empty() {
            continue;
        }
        lines.push(line);
    }

    collapse_blank_runs(&lines).join("\n").trim().to_string()
}

fn strip_inline_emphasis(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .replace(['*', '`'], "")
}

/// Runs of blank lines (often left where a whole block was dropped) collapse
/// to a single spacer.
fn collapse_blank_runs(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_some_and(|prev: &String| prev.is_empty()) {
            continue;
        }
        out.push(line.clone());
    }
    out
}
