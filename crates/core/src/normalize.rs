//! Cleanup for text recovered from images and document runs.
//!
//! OCR output arrives with ragged spacing, form feeds, and decomposed
//! Unicode; runs read from XML may carry non-breaking spaces and stray
//! carriage returns.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse multiple horizontal whitespace characters into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}\u{000C}]+").unwrap());

/// Regex to collapse three or more consecutive newlines into a blank line.
static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Text normalizer applied before content enters a slide blob.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Whether to keep line breaks inside the text.
    preserve_line_breaks: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a new text normalizer that preserves line breaks.
    pub fn new() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }

    /// Set whether to preserve original line breaks.
    pub fn with_preserve_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Normalize a block of text.
    ///
    /// - Applies Unicode NFC composition
    /// - Normalizes line endings to `\n`
    /// - Collapses horizontal whitespace runs to single spaces
    /// - Trims each line and collapses runs of blank lines
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

        if self.preserve_line_breaks {
            let lines = unified
                .lines()
                .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            BLANK_LINES_REGEX
                .replace_all(&lines, "\n\n")
                .trim_matches('\n')
                .to_string()
        } else {
            let flat = unified.replace('\n', " ");
            WHITESPACE_COLLAPSE_REGEX
                .replace_all(&flat, " ")
                .trim()
                .to_string()
        }
    }
}
