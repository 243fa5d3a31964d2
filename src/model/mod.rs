//! # Claim Model
//!
//! The input and output representations for one assembly run. Field geometry
//! lives in [`crate::template`]; this module holds what the *user* supplies
//! (a [`FormSnapshot`], signature rasters, attachment files) and what comes
//! back (a [`RenderedDocument`]).
//!
//! Every value type is serde-friendly so a snapshot can be produced by any
//! front end and handed over as JSON.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point in PDF user space (points, 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// US Letter, the size every claim template and receipt page uses.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// A date entered as three separate boxes. Any part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub year: String,
}

impl DateParts {
    pub fn new(month: &str, day: &str, year: &str) -> Self {
        Self {
            month: month.trim().to_string(),
            day: day.trim().to_string(),
            year: year.trim().to_string(),
        }
    }

    /// Parse an ISO `YYYY-MM-DD` string as produced by a date picker.
    pub fn from_iso(iso: &str) -> Option<Self> {
        let mut parts = iso.trim().splitn(3, '-');
        let year = parts.next()?;
        let month = parts.next()?;
        let day = parts.next()?;
        Some(Self::new(month, day, year))
    }

    pub fn is_empty(&self) -> bool {
        self.month.is_empty() && self.day.is_empty() && self.year.is_empty()
    }

    /// `MMDDYYYY`, with month and day zero-padded to two places.
    /// Empty when every part is empty.
    pub fn compact(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("{:0>2}{:0>2}{}", self.month, self.day, self.year)
    }

    /// `MM/DD/YYYY` as written into free-text date boxes.
    pub fn slashed(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("{}/{}/{}", self.month, self.day, self.year)
    }
}

/// One captured form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Date(DateParts),
}

impl FieldValue {
    /// The value as literal text, or `None` when there is nothing to draw.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        let text: Cow<'_, str> = match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Date(d) => Cow::Owned(d.slashed()),
            FieldValue::Flag(_) => return None,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// The value reduced to its decimal digits, in order.
    pub fn digits(&self) -> String {
        match self {
            FieldValue::Text(s) => s.chars().filter(char::is_ascii_digit).collect(),
            FieldValue::Date(d) => d.compact().chars().filter(char::is_ascii_digit).collect(),
            FieldValue::Flag(_) => String::new(),
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<DateParts> for FieldValue {
    fn from(d: DateParts) -> Self {
        FieldValue::Date(d)
    }
}

/// Field key → value, captured once at generation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    values: BTreeMap<String, FieldValue>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a checkbox key only when `checked`; unchecked boxes stay absent.
    pub fn check(&mut self, key: impl Into<String>, checked: bool) -> &mut Self {
        if checked {
            self.values.insert(key.into(), FieldValue::Flag(true));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A signature as captured by the drawing pad: an encoded raster,
/// or nothing at all when the pad was left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureCapture {
    bytes: Vec<u8>,
}

impl SignatureCapture {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Accept the `data:image/png;base64,...` form a canvas export produces.
    pub fn from_data_url(url: &str) -> Result<Self, String> {
        crate::image_loader::read_data_url(url).map(Self::from_bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The two kinds of upload the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Image,
}

impl MediaKind {
    /// Classify a declared media type. `None` for anything unsupported.
    pub fn classify(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type == "application/pdf" {
            Some(MediaKind::Pdf)
        } else if media_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

/// An uploaded receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::classify(&self.media_type)
    }
}

/// The finished claim document.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}
