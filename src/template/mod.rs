//! # Template Profiles
//!
//! A [`TemplateProfile`] is everything the engine knows about one blank claim
//! form: where its field regions are, which coordinate convention they were
//! measured in, how checkmarks and signatures are anchored, and how the
//! output file is named.
//!
//! The field table is plain data. Adding a form means writing a new profile
//! (in Rust or JSON); the renderer never needs to change.

pub mod anthem;
pub mod mrp;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::CoordinateSystem;
use crate::error::ClaimError;
use crate::model::Point;

/// One fillable region on the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Zero-based index among the fillable pages.
    #[serde(default)]
    pub page: usize,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The four kinds of mark a field can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    /// Literal text drawn on a baseline.
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
    },
    /// A row of single-digit boxes.
    #[serde(rename_all = "camelCase")]
    Date {
        total_width: f64,
        digits: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
    },
    /// A tick box. `size` describes the printed box, not the mark.
    Checkbox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<f64>,
    },
    /// An area receiving a scaled signature image.
    #[serde(rename_all = "camelCase")]
    Signature { max_width: f64, max_height: f64 },
}

impl FieldDescriptor {
    pub fn text(x: f64, y: f64) -> Self {
        Self {
            page: 0,
            x,
            y,
            kind: FieldKind::Text {
                max_width: None,
                font_size: None,
            },
        }
    }

    pub fn date(x: f64, y: f64, total_width: f64, digits: usize) -> Self {
        Self {
            page: 0,
            x,
            y,
            kind: FieldKind::Date {
                total_width,
                digits,
                font_size: None,
            },
        }
    }

    pub fn checkbox(x: f64, y: f64) -> Self {
        Self {
            page: 0,
            x,
            y,
            kind: FieldKind::Checkbox { size: None },
        }
    }

    pub fn signature(x: f64, y: f64, max_width: f64, max_height: f64) -> Self {
        Self {
            page: 0,
            x,
            y,
            kind: FieldKind::Signature {
                max_width,
                max_height,
            },
        }
    }

    pub fn on_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn max_width(mut self, width: f64) -> Self {
        if let FieldKind::Text { max_width, .. } = &mut self.kind {
            *max_width = Some(width);
        }
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        match &mut self.kind {
            FieldKind::Text { font_size, .. } | FieldKind::Date { font_size, .. } => {
                *font_size = Some(size);
            }
            _ => {}
        }
        self
    }

    pub fn box_size(mut self, box_size: f64) -> Self {
        if let FieldKind::Checkbox { size } = &mut self.kind {
            *size = Some(box_size);
        }
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_signature(&self) -> bool {
        matches!(self.kind, FieldKind::Signature { .. })
    }
}

/// Immutable field key → descriptor table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTable(BTreeMap<String, FieldDescriptor>);

impl FieldTable {
    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.0.iter().map(|(k, d)| (k.as_str(), d))
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDescriptor)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (K, FieldDescriptor)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, d)| (k.into(), d)).collect())
    }
}

/// Where a checkbox field's point sits relative to the drawn mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckboxAnchor {
    /// The point is the centre of the box.
    Center,
    /// The point is the glyph's draw origin.
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxStyle {
    pub anchor: CheckboxAnchor,
    /// Font size of the "X" mark.
    pub mark_size: f64,
}

/// Which edge of the signature image sits on the field's point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignatureAnchor {
    /// The point is the image's lower-left corner.
    Bottom,
    /// The point is the signature line; the image hangs above it,
    /// dropped by `baseline_adjust` so the ink touches the line.
    #[serde(rename_all = "camelCase")]
    Top { baseline_adjust: f64 },
}

/// Calibration and field table for one blank form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProfile {
    pub name: String,
    /// File name of the blank PDF in the template source.
    pub resource: String,
    /// Number of leading pages that receive marks. Later pages are dropped.
    pub fillable_pages: usize,
    pub coordinates: CoordinateSystem,
    pub checkbox: CheckboxStyle,
    pub signature_anchor: SignatureAnchor,
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,
    /// Subtracted from each date digit's slot centre.
    #[serde(default = "default_half_glyph_width")]
    pub half_glyph_width: f64,
    pub filename_prefix: String,
    /// Field whose value names the output file.
    pub primary_name_field: String,
    pub fields: FieldTable,
}

fn default_font_size() -> f64 {
    10.0
}

fn default_half_glyph_width() -> f64 {
    3.0
}

impl TemplateProfile {
    pub fn from_json(json: &str) -> Result<Self, ClaimError> {
        serde_json::from_str(json).map_err(|e| ClaimError::config("template profile", e))
    }

    pub fn to_json(&self) -> String {
        // Only string keys and finite numbers, cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }
}

/// The built-in forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Anthem,
    Mrp,
}

impl TemplateKind {
    pub fn profile(self) -> TemplateProfile {
        match self {
            TemplateKind::Anthem => anthem::profile(),
            TemplateKind::Mrp => mrp::profile(),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Anthem => write!(f, "anthem"),
            TemplateKind::Mrp => write!(f, "mrp"),
        }
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthem" => Ok(TemplateKind::Anthem),
            "mrp" | "iatse" => Ok(TemplateKind::Mrp),
            other => Err(format!("unknown template '{}' (expected anthem or mrp)", other)),
        }
    }
}
