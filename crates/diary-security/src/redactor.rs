//! Secret spoiler redaction
//!
//! A secret block is a `:::secret` line, a payload, and a closing `:::` line:
//!
//! ```text
//! :::secret
//! only the author sees this
//! :::
//! ```
//!
//! Blocks do not nest: a block closes at the nearest following `:::` line.
//! A start marker with no closing line before end of input stays literal
//! text, as does anything else that is not an exact start/end pair. The
//! `regex` crate matches in linear time, so adversarial marker soup cannot
//! trigger backtracking blowups.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const DEFAULT_HEADER: &str = "Secret spoiler";
pub const DEFAULT_PLACEHOLDER: &str = "This content is private";

lazy_static! {
    // Start line, then either an immediate end line (empty payload) or the
    // shortest payload followed by an end line. Trailing blanks and CR are
    // tolerated on both marker lines.
    static ref SECRET_BLOCK: Regex =
        Regex::new(r"(?m)^:::secret[ \t]*\r?\n(?:((?s:.*?))\r?\n)??:::[ \t]*\r?$").unwrap();
    static ref DEFAULT_REDACTOR: Redactor = Redactor::default();
}

/// Reveals or masks secret blocks with a presentational wrapper
#[derive(Debug, Clone)]
pub struct Redactor {
    header: String,
    placeholder: String,
}

impl Redactor {
    /// Labels are inserted into the wrapper markup as-is.
    pub fn new(header: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Replace every secret block in `content`.
    ///
    /// With `reveal_secrets` the payload is kept verbatim inside the wrapper;
    /// without it the wrapper carries only the placeholder. Content without
    /// any block comes back unchanged.
    pub fn redact(&self, content: &str, reveal_secrets: bool) -> String {
        SECRET_BLOCK
            .replace_all(content, |caps: &Captures| {
                if reveal_secrets {
                    let payload = caps.get(1).map_or("", |m| m.as_str());
                    self.revealed(payload)
                } else {
                    self.masked()
                }
            })
            .into_owned()
    }

    fn revealed(&self, payload: &str) -> String {
        // Blank lines around the payload let Markdown renderers treat it as
        // Markdown rather than raw HTML.
        format!(
            "<div class=\"secret-spoiler\"><div class=\"secret-spoiler-header\">{}</div>\n\n{}\n\n</div>",
            self.header, payload
        )
    }

    fn masked(&self) -> String {
        format!(
            "<div class=\"secret-spoiler\"><div class=\"secret-spoiler-header\">{}</div><p>{}</p></div>",
            self.header, self.placeholder
        )
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER, DEFAULT_PLACEHOLDER)
    }
}

/// Redact with the default labels
pub fn redact(content: &str, reveal_secrets: bool) -> String {
    DEFAULT_REDACTOR.redact(content, reveal_secrets)
}

/// Number of well-formed secret blocks in `content`
pub fn count_secret_blocks(content: &str) -> usize {
    SECRET_BLOCK.find_iter(content).count()
}
