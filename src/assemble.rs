//! # Document Assembly
//!
//! One [`Assembler::assemble`] call runs the whole pipeline against a fresh
//! copy of the template:
//!
//! ```text
//!   fetch template ─→ drop trailing pages ─→ embed font
//!        ─→ draw fields ─→ place signatures ─→ append attachments
//!        ─→ serialize ─→ name the file
//! ```
//!
//! Each step runs only after the previous one succeeded. Any error ends the
//! run and no bytes are returned. The assembler itself holds only immutable
//! state, so one instance can serve any number of runs.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::attachment::{normalize, Attachment};
use crate::config::EngineConfig;
use crate::error::ClaimError;
use crate::image_loader::{self, DEFAULT_JPEG_QUALITY};
use crate::model::{AttachmentFile, FormSnapshot, PageSize, RenderedDocument, SignatureCapture};
use crate::pdf::FilledDocument;
use crate::render::{place_signature, render_field};
use crate::source::TemplateSource;
use crate::template::TemplateProfile;

/// Signature captures keyed by their field name.
pub type Signatures = BTreeMap<String, SignatureCapture>;

pub struct Assembler<S> {
    source: S,
    profile: TemplateProfile,
    jpeg_quality: u8,
    attachment_page: PageSize,
}

impl<S: TemplateSource> Assembler<S> {
    pub fn new(source: S, profile: TemplateProfile) -> Self {
        Self {
            source,
            profile,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            attachment_page: PageSize::LETTER,
        }
    }

    /// Take receipt encoding settings from `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.jpeg_quality = config.jpeg_quality;
        self.attachment_page = config.attachment_page;
        self
    }

    pub fn profile(&self) -> &TemplateProfile {
        &self.profile
    }

    /// Build the claim document, dated today (UTC).
    pub fn assemble(
        &self,
        snapshot: &FormSnapshot,
        signatures: &Signatures,
        attachments: &[Option<AttachmentFile>],
    ) -> Result<RenderedDocument, ClaimError> {
        self.assemble_on(snapshot, signatures, attachments, Utc::now().date_naive())
    }

    /// Build the claim document, using `date` in the file name.
    pub fn assemble_on(
        &self,
        snapshot: &FormSnapshot,
        signatures: &Signatures,
        attachments: &[Option<AttachmentFile>],
        date: NaiveDate,
    ) -> Result<RenderedDocument, ClaimError> {
        let profile = &self.profile;
        let mut doc = self.load_template()?;

        doc.embed_font();
        self.draw_fields(&mut doc, snapshot)?;
        self.place_signatures(&mut doc, signatures)?;
        self.append_attachments(&mut doc, attachments)?;

        let bytes = doc.save()?;
        let filename = filename(profile, snapshot, date);
        info!(template = %profile.name, bytes = bytes.len(), %filename, "claim document written");
        Ok(RenderedDocument { bytes, filename })
    }

    fn load_template(&self) -> Result<FilledDocument, ClaimError> {
        let resource = &self.profile.resource;
        let template_error = |reason: String| ClaimError::TemplateLoad {
            resource: resource.clone(),
            reason,
        };

        let bytes = self.source.fetch(resource)?;
        let mut doc = FilledDocument::load(&bytes).map_err(|e| template_error(e.to_string()))?;
        info!(template = %self.profile.name, pages = doc.page_count(), "template loaded");

        let dropped = doc
            .truncate_pages(self.profile.fillable_pages)
            .map_err(|e| template_error(e.to_string()))?;
        if dropped > 0 {
            info!(dropped, kept = self.profile.fillable_pages, "dropped trailing template pages");
        }
        Ok(doc)
    }

    fn draw_fields(&self, doc: &mut FilledDocument, snapshot: &FormSnapshot) -> Result<(), ClaimError> {
        let mut drawn = 0;
        for (key, value) in snapshot.iter() {
            let Some(descriptor) = self.profile.field(key) else {
                debug!(field = key, "no such field on this template, skipped");
                continue;
            };
            if descriptor.is_signature() {
                continue;
            }
            let marks = render_field(&self.profile, descriptor, Some(value));
            if marks.is_empty() {
                debug!(field = key, "nothing to draw");
            }
            for mark in &marks {
                doc.draw_text(mark)?;
            }
            drawn += marks.len();
        }
        info!(marks = drawn, "fields drawn");
        Ok(())
    }

    fn place_signatures(&self, doc: &mut FilledDocument, signatures: &Signatures) -> Result<(), ClaimError> {
        for (key, capture) in signatures {
            if capture.is_empty() {
                debug!(field = %key, "empty signature, skipped");
                continue;
            }
            let Some(descriptor) = self.profile.field(key).filter(|d| d.is_signature()) else {
                debug!(field = %key, "no signature area with this name, skipped");
                continue;
            };

            let image = image_loader::decode_signature(capture.bytes()).map_err(|reason| ClaimError::Signature {
                field: key.clone(),
                reason,
            })?;
            let Some(placement) = place_signature(&self.profile, descriptor, image.width_px, image.height_px) else {
                debug!(field = %key, "signature has no size, skipped");
                continue;
            };

            let image_id = doc.embed_image(&image);
            doc.draw_image(placement.page, image_id, placement.rect)?;
            debug!(
                field = %key,
                x = placement.rect.x,
                y = placement.rect.y,
                width = placement.rect.width,
                height = placement.rect.height,
                "signature placed"
            );
        }
        Ok(())
    }

    fn append_attachments(
        &self,
        doc: &mut FilledDocument,
        attachments: &[Option<AttachmentFile>],
    ) -> Result<(), ClaimError> {
        let mut appended = 0;
        for file in attachments.iter().flatten() {
            match normalize(file, self.jpeg_quality, self.attachment_page)? {
                Attachment::ForeignDocument { name, bytes } => {
                    let pages = doc
                        .append_document(&bytes)
                        .map_err(|e| ClaimError::MalformedAttachment {
                            name: name.clone(),
                            reason: e.to_string(),
                        })?;
                    debug!(%name, pages, "appended PDF attachment");
                }
                Attachment::RasterImage { name, image, placement } => {
                    let image_id = doc.embed_image(&image);
                    doc.append_image_page(image_id, self.attachment_page, placement)?;
                    debug!(%name, "appended image attachment");
                }
            }
            appended += 1;
        }
        if appended > 0 {
            info!(count = appended, "attachments appended");
        }
        Ok(())
    }
}

/// `<prefix>-<primary name or "Claim">-<YYYY-MM-DD>.pdf`.
pub fn filename(profile: &TemplateProfile, snapshot: &FormSnapshot, date: NaiveDate) -> String {
    let name = snapshot
        .get(&profile.primary_name_field)
        .and_then(|v| v.as_text())
        .map(|t| sanitize(t.trim()))
        .unwrap_or_else(|| "Claim".to_string());
    format!("{}-{}-{}.pdf", profile.filename_prefix, name, date.format("%Y-%m-%d"))
}

/// Keep a name usable as a single path component.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '-' } else { c })
        .collect()
}
