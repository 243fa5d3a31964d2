//! Structured error types for the claim assembly engine.
//!
//! Intake rejections (`UnsupportedAttachment`, `AttachmentBudgetExceeded`)
//! are per-file and leave the pending set untouched. Everything else aborts
//! the assembly run that raised it; no partial document is ever returned.

use thiserror::Error;

const MIB: f64 = 1024.0 * 1024.0;

/// The unified error type returned by all public claimfill functions.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The blank template could not be fetched or is unusable.
    #[error("Could not load PDF form '{resource}': {reason}")]
    TemplateLoad { resource: String, reason: String },

    /// A file that is neither a PDF nor an image.
    #[error("Unsupported file type: {name} ({media_type})")]
    UnsupportedAttachment { name: String, media_type: String },

    /// Accepting the file would push the pending total over the ceiling.
    #[error(
        "Cannot add {name} ({:.1}MB). Would exceed {:.0}MB limit. Current: {:.1}MB",
        mib(.file_bytes),
        mib(.limit_bytes),
        mib(.current_bytes)
    )]
    AttachmentBudgetExceeded {
        name: String,
        file_bytes: u64,
        current_bytes: u64,
        limit_bytes: u64,
    },

    /// A file claiming to be a PDF or image that fails to decode.
    #[error("Attachment '{name}' could not be read: {reason}")]
    MalformedAttachment { name: String, reason: String },

    /// A non-empty signature capture that fails to decode.
    #[error("Signature for '{field}' could not be read: {reason}")]
    Signature { field: String, reason: String },

    /// JSON input (claim, profile, config) failed to parse.
    #[error("Failed to parse {what}: {source}{}", hint_suffix(.hint))]
    Config {
        what: &'static str,
        source: serde_json::Error,
        hint: String,
    },

    /// A page tree the overlay or merge step cannot work with.
    #[error("Unexpected PDF structure: {0}")]
    Structure(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn mib(bytes: &u64) -> f64 {
    *bytes as f64 / MIB
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl ClaimError {
    /// Wrap a serde_json error with a hint about what usually causes it.
    pub fn config(what: &'static str, e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ClaimError::Config {
            what,
            source: e,
            hint,
        }
    }

    /// True for the per-file intake rejections that never abort a batch.
    pub fn is_intake_rejection(&self) -> bool {
        matches!(
            self,
            ClaimError::UnsupportedAttachment { .. } | ClaimError::AttachmentBudgetExceeded { .. }
        )
    }
}
