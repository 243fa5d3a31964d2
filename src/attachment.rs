//! # Attachments
//!
//! Receipts arrive as PDFs or images. Intake ([`AttachmentQueue`]) filters by
//! media type and enforces the cumulative size ceiling; normalization
//! ([`normalize`]) turns each accepted file into an [`Attachment`] the PDF
//! layer knows how to append.

use tracing::{debug, warn};

use crate::error::ClaimError;
use crate::image_loader::{self, LoadedImage};
use crate::model::{AttachmentFile, MediaKind, PageSize, Rect};
use crate::render::fit_scale;

/// Default cumulative attachment ceiling: 25 MiB.
pub const DEFAULT_LIMIT_BYTES: u64 = 25 * 1024 * 1024;

const MIB: f64 = 1024.0 * 1024.0;

/// A normalized attachment, ready to append.
#[derive(Debug, Clone)]
pub enum Attachment {
    /// A PDF whose pages are copied as-is.
    ForeignDocument { name: String, bytes: Vec<u8> },
    /// A grayscale JPEG placed on its own page.
    RasterImage {
        name: String,
        image: LoadedImage,
        placement: Rect,
    },
}

impl Attachment {
    pub fn name(&self) -> &str {
        match self {
            Attachment::ForeignDocument { name, .. } | Attachment::RasterImage { name, .. } => name,
        }
    }
}

/// Classify and prepare one file for appending.
///
/// Images are decoded, flattened to grayscale, re-encoded at `jpeg_quality`
/// and fitted onto a `page`-sized sheet.
pub fn normalize(file: &AttachmentFile, jpeg_quality: u8, page: PageSize) -> Result<Attachment, ClaimError> {
    match file.kind() {
        Some(MediaKind::Pdf) => Ok(Attachment::ForeignDocument {
            name: file.name.clone(),
            bytes: file.bytes.clone(),
        }),
        Some(MediaKind::Image) => {
            let image = image_loader::grayscale_jpeg(&file.bytes, jpeg_quality).map_err(|reason| {
                ClaimError::MalformedAttachment {
                    name: file.name.clone(),
                    reason,
                }
            })?;
            let placement = fit_to_page(image.width_px as f64, image.height_px as f64, page);
            debug!(
                name = %file.name,
                width = placement.width,
                height = placement.height,
                "placed receipt image"
            );
            Ok(Attachment::RasterImage {
                name: file.name.clone(),
                image,
                placement,
            })
        }
        None => Err(ClaimError::UnsupportedAttachment {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
        }),
    }
}

/// Shrink `(width, height)` to fit the page if needed, then centre it.
pub fn fit_to_page(width: f64, height: f64, page: PageSize) -> Rect {
    let scale = fit_scale(width, height, page.width, page.height);
    let width = width * scale;
    let height = height * scale;
    Rect {
        x: (page.width - width) / 2.0,
        y: (page.height - height) / 2.0,
        width,
        height,
    }
}

/// The ordered set of pending uploads.
///
/// Removing a file leaves a `None` hole so earlier slot numbers stay valid.
#[derive(Debug, Clone)]
pub struct AttachmentQueue {
    slots: Vec<Option<AttachmentFile>>,
    limit_bytes: u64,
}

impl Default for AttachmentQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT_BYTES)
    }
}

impl AttachmentQueue {
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            slots: Vec::new(),
            limit_bytes,
        }
    }

    /// Accept a file, returning its slot. A rejected file leaves the queue
    /// exactly as it was.
    pub fn add(&mut self, file: AttachmentFile) -> Result<usize, ClaimError> {
        if file.kind().is_none() {
            warn!(name = %file.name, media_type = %file.media_type, "rejected unsupported attachment");
            return Err(ClaimError::UnsupportedAttachment {
                name: file.name,
                media_type: file.media_type,
            });
        }

        let current = self.total_bytes();
        if current + file.size() > self.limit_bytes {
            warn!(name = %file.name, size = file.size(), current, "rejected attachment over budget");
            return Err(ClaimError::AttachmentBudgetExceeded {
                file_bytes: file.size(),
                current_bytes: current,
                limit_bytes: self.limit_bytes,
                name: file.name,
            });
        }

        debug!(name = %file.name, size = file.size(), "queued attachment");
        self.slots.push(Some(file));
        Ok(self.slots.len() - 1)
    }

    /// Add several files. Each gets its own outcome; a rejection does not
    /// stop the rest of the batch.
    pub fn add_all<I>(&mut self, files: I) -> Vec<Result<usize, ClaimError>>
    where
        I: IntoIterator<Item = AttachmentFile>,
    {
        files.into_iter().map(|f| self.add(f)).collect()
    }

    /// Drop the file in `slot`. Returns it if the slot was occupied.
    pub fn remove(&mut self, slot: usize) -> Option<AttachmentFile> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn total_bytes(&self) -> u64 {
        self.pending().map(AttachmentFile::size).sum()
    }

    /// Files still queued, in the order they were added.
    pub fn pending(&self) -> impl Iterator<Item = &AttachmentFile> {
        self.slots.iter().flatten()
    }

    /// The raw slot list, holes included.
    pub fn slots(&self) -> &[Option<AttachmentFile>] {
        &self.slots
    }

    /// Running total for display, e.g. `"3.2 MB / 25 MB"`.
    pub fn usage_label(&self) -> String {
        format!(
            "{:.1} MB / {:.0} MB",
            self.total_bytes() as f64 / MIB,
            self.limit_bytes as f64 / MIB
        )
    }
}
