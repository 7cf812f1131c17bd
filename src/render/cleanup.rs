//! Post-assembly cleanup pipeline for generated HTML.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

fn empty_paragraph_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"<p style="text-align: [A-Za-z-]+">\s*</p>"#).unwrap())
}

fn empty_span_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"<span(?: style="[^"<>]*")?></span>"#).unwrap())
}

/// How much the assembled document is tidied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: empty paragraph removal only
    #[default]
    Minimal,
    /// Standard cleanup: NFC + empty inline wrappers + replacement characters
    Standard,
    /// Aggressive cleanup: Standard + zero-width characters
    Aggressive,
}

/// Options for HTML cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Remove paragraphs with no content (`<p style="text-align: left"></p>`)
    pub remove_empty_paragraphs: bool,

    /// Remove `<span>` wrappers with no content
    pub remove_empty_spans: bool,

    /// Compose decomposed characters (NFC) so mail clients render accents
    pub normalize_unicode: bool,

    /// Drop zero-width spaces, joiners and BOMs the note editor leaves in text
    pub remove_zero_width: bool,

    /// Drop U+FFFD left behind by lossy exports
    pub remove_replacement_char: bool,
}

impl CleanupOptions {
    /// Options for a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Empty paragraph removal only.
    pub fn minimal() -> Self {
        Self {
            remove_empty_paragraphs: true,
            remove_empty_spans: false,
            normalize_unicode: false,
            remove_zero_width: false,
            remove_replacement_char: false,
        }
    }

    /// Minimal plus NFC, empty spans and U+FFFD.
    pub fn standard() -> Self {
        Self {
            remove_empty_spans: true,
            normalize_unicode: true,
            remove_replacement_char: true,
            ..Self::minimal()
        }
    }

    /// Standard plus zero-width characters.
    pub fn aggressive() -> Self {
        Self {
            remove_zero_width: true,
            ..Self::standard()
        }
    }

    /// Options that leave the output untouched.
    pub fn none() -> Self {
        Self {
            remove_empty_paragraphs: false,
            ..Self::minimal()
        }
    }

    /// Enable or disable empty paragraph removal.
    pub fn with_empty_paragraphs_removed(mut self, remove: bool) -> Self {
        self.remove_empty_paragraphs = remove;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::minimal()
    }
}

/// String-level cleanup applied once to the assembled document.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Pipeline running the passes enabled in `options`.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Pipeline for a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Options this pipeline was built with.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Run every enabled pass over an assembled document.
    pub fn process(&self, html: &str) -> String {
        let opts = &self.options;
        let mut result: String = if opts.normalize_unicode {
            html.nfc().collect()
        } else {
            html.to_string()
        };

        if opts.remove_zero_width || opts.remove_replacement_char {
            result.retain(|c| {
                !(opts.remove_zero_width && is_zero_width(c))
                    && !(opts.remove_replacement_char && c == char::REPLACEMENT_CHARACTER)
            });
        }

        // Spans nest, so removing an inner one can empty its parent
        if opts.remove_empty_spans {
            let spans = empty_span_regex();
            while spans.is_match(&result) {
                result = spans.replace_all(&result, "").into_owned();
            }
        }

        // Runs last: the earlier passes can leave a paragraph with nothing in it
        if opts.remove_empty_paragraphs {
            result = empty_paragraph_regex().replace_all(&result, "").into_owned();
        }

        result
    }
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}
