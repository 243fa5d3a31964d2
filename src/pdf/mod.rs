//! # PDF Overlay and Merge
//!
//! Wraps a loaded template in a [`FilledDocument`] and mutates it in place:
//! marks are queued per page and written as one extra content stream each,
//! signature and receipt images become image XObjects, and attachment PDFs
//! are grafted onto the page tree.
//!
//! ## Page content layout after filling
//!
//! ```text
//! /Contents [ q-stream  <template streams...>  overlay-stream ]
//!                 |                                  |
//!                 +-- saves graphics state           +-- Q, then our marks
//! ```
//!
//! Bracketing the template's own streams with `q`/`Q` means a stray `cm` left
//! at the end of the template cannot shift the overlay.
//!
//! Text uses the standard Helvetica font with WinAnsiEncoding, so nothing
//! is embedded beyond a small font dictionary.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ClaimError;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::model::{PageSize, Rect};
use crate::render::TextMark;

/// Resource name of the overlay font on every filled page.
pub const FONT_RESOURCE: &str = "ClaimF1";

/// Keys a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

pub struct FilledDocument {
    doc: Document,
    /// Page object ids of the template pages, in order.
    pages: Vec<ObjectId>,
    font_id: Option<ObjectId>,
    /// Pages whose Resources have already been made page-local.
    owned_resources: BTreeSet<ObjectId>,
    overlays: BTreeMap<ObjectId, Vec<Operation>>,
    next_image: usize,
}

impl FilledDocument {
    /// Parse template bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, ClaimError> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            pages,
            font_id: None,
            owned_resources: BTreeSet::new(),
            overlays: BTreeMap::new(),
            next_image: 0,
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Keep only the first `keep` pages. Returns how many were dropped.
    pub fn truncate_pages(&mut self, keep: usize) -> Result<usize, ClaimError> {
        let count = self.page_count();
        if count < keep {
            return Err(ClaimError::Structure(format!(
                "document has {} page(s), at least {} required",
                count, keep
            )));
        }
        let extra: Vec<u32> = ((keep as u32 + 1)..=(count as u32)).collect();
        if !extra.is_empty() {
            self.doc.delete_pages(&extra);
        }
        self.pages = self.doc.get_pages().into_values().collect();
        Ok(extra.len())
    }

    /// Add the Helvetica font dictionary. Calling again is a no-op.
    pub fn embed_font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    /// Queue one text mark on template page `mark.page`.
    pub fn draw_text(&mut self, mark: &TextMark) -> Result<(), ClaimError> {
        let page_id = self.page_id(mark.page)?;
        let font_id = self.embed_font();
        self.register_resource(page_id, b"Font", FONT_RESOURCE, font_id)?;

        let ops = self.overlays.entry(page_id).or_default();
        ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
            Operation::new("Tf", vec![Object::Name(FONT_RESOURCE.into()), real(mark.size)]),
            Operation::new("Td", vec![real(mark.origin.x), real(mark.origin.y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_winansi(&mark.text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    /// Turn a loaded image into an image XObject. Transparency in decoded
    /// rasters is carried as an SMask.
    pub fn embed_image(&mut self, image: &LoadedImage) -> ObjectId {
        let width = image.width_px as i64;
        let height = image.height_px as i64;

        match &image.pixel_data {
            ImagePixelData::GrayJpeg { data } => self.doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                data.clone(),
            )),

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha| {
                    self.doc.add_object(flate_stream(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => width,
                            "Height" => height,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                        },
                        alpha,
                    ))
                });

                let mut dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                };
                if let Some(smask_id) = smask_id {
                    dict.set("SMask", smask_id);
                }
                self.doc.add_object(flate_stream(dict, rgb))
            }
        }
    }

    /// Queue an embedded image on template page `page`, filling `rect`.
    pub fn draw_image(&mut self, page: usize, image_id: ObjectId, rect: Rect) -> Result<(), ClaimError> {
        let page_id = self.page_id(page)?;
        let name = self.next_image_name();
        self.register_resource(page_id, b"XObject", &name, image_id)?;
        self.overlays
            .entry(page_id)
            .or_default()
            .extend(image_operations(&name, rect));
        Ok(())
    }

    /// Append a fresh page of `size` showing one image at `rect`.
    pub fn append_image_page(
        &mut self,
        image_id: ObjectId,
        size: PageSize,
        rect: Rect,
    ) -> Result<ObjectId, ClaimError> {
        let name = self.next_image_name();
        let content_id = self.add_content(image_operations(&name, rect))?;
        let pages_root = self.pages_root()?;

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_root,
            "MediaBox" => vec![real(0.0), real(0.0), real(size.width), real(size.height)],
            "Resources" => dictionary! {
                "XObject" => dictionary! { name.as_str() => image_id },
            },
            "Contents" => content_id,
        });
        self.push_kids(pages_root, &[page_id])?;
        Ok(page_id)
    }

    /// Copy every page of another PDF onto the end, unscaled and in order.
    /// Returns the number of pages added. A PDF without pages is an error.
    pub fn append_document(&mut self, bytes: &[u8]) -> Result<usize, ClaimError> {
        let mut other = Document::load_mem(bytes)?;
        materialize_inherited(&mut other)?;
        other.renumber_objects_with(self.doc.max_id + 1);

        let new_pages: Vec<ObjectId> = other.get_pages().into_values().collect();
        if new_pages.is_empty() {
            return Err(ClaimError::Structure("document has no pages".to_string()));
        }
        let pages_root = self.pages_root()?;
        let other_max = other.max_id;

        for (id, object) in other.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Outlines" | "Outline" => {}
                _ => {
                    self.doc.objects.insert(id, object);
                }
            }
        }
        for &page_id in &new_pages {
            self.doc.get_dictionary_mut(page_id)?.set("Parent", pages_root);
        }
        self.push_kids(pages_root, &new_pages)?;
        self.doc.max_id = self.doc.max_id.max(other_max);
        Ok(new_pages.len())
    }

    /// Write queued overlays, drop unreachable objects and serialize.
    pub fn save(mut self) -> Result<Vec<u8>, ClaimError> {
        self.flush_overlays()?;
        self.doc.prune_objects();
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn page_id(&self, page: usize) -> Result<ObjectId, ClaimError> {
        self.pages.get(page).copied().ok_or_else(|| {
            ClaimError::Structure(format!(
                "page {} requested but the template has {}",
                page + 1,
                self.pages.len()
            ))
        })
    }

    fn pages_root(&self) -> Result<ObjectId, ClaimError> {
        let catalog_id = self.doc.trailer.get(b"Root")?.as_reference()?;
        Ok(self.doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?)
    }

    fn push_kids(&mut self, parent: ObjectId, kids: &[ObjectId]) -> Result<(), ClaimError> {
        let root = self.doc.get_dictionary_mut(parent)?;
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        root.get_mut(b"Kids")?
            .as_array_mut()?
            .extend(kids.iter().map(|&id| Object::Reference(id)));
        root.set("Count", count + kids.len() as i64);
        Ok(())
    }

    fn next_image_name(&mut self) -> String {
        let name = format!("ClaimIm{}", self.next_image);
        self.next_image += 1;
        name
    }

    /// Give the page its own Resources dictionary, with inherited and
    /// indirect entries copied in, so adding a name touches only this page.
    fn own_resources(&mut self, page_id: ObjectId) -> Result<(), ClaimError> {
        if self.owned_resources.contains(&page_id) {
            return Ok(());
        }
        let mut resources = inherited(&self.doc, page_id, b"Resources")
            .and_then(|obj| resolve(&self.doc, &obj).as_dict().ok().cloned())
            .unwrap_or_else(Dictionary::new);

        for category in [b"Font".as_slice(), b"XObject".as_slice()] {
            if let Ok(sub) = resources.get(category) {
                let sub = resolve(&self.doc, sub);
                resources.set(category.to_vec(), sub);
            }
        }

        self.doc.get_dictionary_mut(page_id)?.set("Resources", resources);
        self.owned_resources.insert(page_id);
        Ok(())
    }

    fn register_resource(
        &mut self,
        page_id: ObjectId,
        category: &[u8],
        name: &str,
        id: ObjectId,
    ) -> Result<(), ClaimError> {
        self.own_resources(page_id)?;
        let resources = self
            .doc
            .get_dictionary_mut(page_id)?
            .get_mut(b"Resources")?
            .as_dict_mut()?;
        if !matches!(resources.get(category), Ok(Object::Dictionary(_))) {
            resources.set(category.to_vec(), Dictionary::new());
        }
        resources.get_mut(category)?.as_dict_mut()?.set(name, id);
        Ok(())
    }

    fn add_content(&mut self, operations: Vec<Operation>) -> Result<ObjectId, ClaimError> {
        let raw = Content { operations }.encode()?;
        Ok(self.doc.add_object(flate_stream(Dictionary::new(), &raw)))
    }

    fn flush_overlays(&mut self) -> Result<(), ClaimError> {
        let overlays = std::mem::take(&mut self.overlays);
        for (page_id, mut ops) in overlays {
            let open = self.add_content(vec![Operation::new("q", vec![])])?;
            ops.insert(0, Operation::new("Q", vec![]));
            let overlay = self.add_content(ops)?;

            let existing = match self.doc.get_dictionary_mut(page_id)?.remove(b"Contents") {
                Some(Object::Array(items)) => items,
                Some(Object::Reference(id)) => match self.doc.get_object(id) {
                    Ok(Object::Array(items)) => items.clone(),
                    _ => vec![Object::Reference(id)],
                },
                _ => Vec::new(),
            };

            let mut contents = Vec::with_capacity(existing.len() + 2);
            contents.push(Object::Reference(open));
            contents.extend(existing);
            contents.push(Object::Reference(overlay));
            self.doc.get_dictionary_mut(page_id)?.set("Contents", contents);
        }
        Ok(())
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn image_operations(name: &str, rect: Rect) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(rect.width),
                real(0.0),
                real(0.0),
                real(rect.height),
                real(rect.x),
                real(rect.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn flate_stream(mut dict: Dictionary, data: &[u8]) -> Stream {
    dict.set("Filter", "FlateDecode");
    Stream::new(dict, compress_to_vec_zlib(data, 6))
}

/// Follow references until a direct object is reached.
fn resolve(doc: &Document, object: &Object) -> Object {
    let mut current = object.clone();
    for _ in 0..MAX_TREE_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(id) {
                Ok(next) => current = next.clone(),
                Err(_) => return Object::Null,
            },
            other => return other,
        }
    }
    Object::Null
}

/// Look `key` up on the page, then on each ancestor in turn.
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(node).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        node = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Copy inherited page attributes onto each page so the page survives being
/// re-parented under a different tree.
fn materialize_inherited(doc: &mut Document) -> Result<(), ClaimError> {
    for page_id in doc.get_pages().into_values() {
        for key in INHERITABLE {
            if doc.get_dictionary(page_id)?.has(key) {
                continue;
            }
            if let Some(value) = inherited(doc, page_id, key) {
                doc.get_dictionary_mut(page_id)?.set(key.to_vec(), value);
            }
        }
    }
    Ok(())
}

/// Encode text for a WinAnsiEncoding font. Unmappable characters become `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| unicode_to_winansi(ch).unwrap_or(b'?'))
        .collect()
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
