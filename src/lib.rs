//! # claimfill
//!
//! Fills fixed-layout insurance claim PDFs and bundles the receipts with them.
//!
//! The blank claim forms are not AcroForms. They are flat scans of paper forms
//! with boxes printed on them, so "filling" one means drawing text, X marks
//! and signature images at calibrated coordinates on top of the existing page
//! content. Receipts (PDFs or photos) are appended after the form pages, with
//! photos flattened to grayscale to keep the output small enough to email.
//!
//! ## Architecture
//!
//! ```text
//! Claim (JSON/API)
//!       ↓
//!   [claim]      - typed claim → flat FormSnapshot
//!       ↓
//!   [template]   - field table + calibration for one form
//!       ↓
//!   [coords]     - authoring space → PDF user space
//!   [render]     - descriptor + value → marks
//!   [attachment] - receipts → grayscale pages / copied PDF pages
//!       ↓
//!   [assemble]   - fixed step order over one template copy
//!       ↓
//!   [pdf]        - lopdf overlay + page-tree merge → bytes
//! ```

pub mod assemble;
pub mod attachment;
pub mod claim;
pub mod config;
pub mod coords;
pub mod error;
pub mod image_loader;
pub mod model;
pub mod pdf;
pub mod render;
pub mod source;
pub mod template;

pub use assemble::{Assembler, Signatures};
pub use attachment::{AttachmentQueue, DEFAULT_LIMIT_BYTES};
pub use claim::{Claim, ClaimForm};
pub use config::EngineConfig;
pub use error::ClaimError;
pub use model::{AttachmentFile, FormSnapshot, RenderedDocument, SignatureCapture};
pub use source::{DirectorySource, MemorySource, TemplateSource};
pub use template::{TemplateKind, TemplateProfile};

/// Fill the built-in template for `claim`.
///
/// This is the primary entry point. Blank forms are looked up in `source`
/// by their resource name; attachments are appended in order, skipping
/// removed (`None`) slots.
pub fn fill<S: TemplateSource>(
    source: S,
    claim: &dyn ClaimForm,
    signatures: &Signatures,
    attachments: &[Option<AttachmentFile>],
) -> Result<RenderedDocument, ClaimError> {
    Assembler::new(source, claim.template().profile()).assemble(&claim.snapshot(), signatures, attachments)
}

/// Fill a template from a claim described as JSON.
pub fn fill_json<S: TemplateSource>(
    source: S,
    kind: TemplateKind,
    json: &str,
    signatures: &Signatures,
    attachments: &[Option<AttachmentFile>],
) -> Result<RenderedDocument, ClaimError> {
    let claim = Claim::from_json(kind, json)?;
    fill(source, &claim, signatures, attachments)
}
