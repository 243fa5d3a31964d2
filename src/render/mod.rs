//! # Field Rendering
//!
//! Turns one field descriptor plus one captured value into the marks that
//! should appear on the page. Rendering is pure: it knows nothing about the
//! PDF being built, it only computes *what* goes *where*. The
//! [`crate::pdf`] layer turns marks into content stream operators.
//!
//! A field with no value, an empty value or an empty signature produces no
//! marks. That is a normal outcome for optional fields, not an error.

use crate::coords::to_native;
use crate::model::{FieldValue, Point, Rect};
use crate::template::{CheckboxAnchor, FieldDescriptor, FieldKind, SignatureAnchor, TemplateProfile};

/// The glyph drawn into a checked box.
pub const CHECK_MARK: &str = "X";

/// A piece of text positioned on a fillable page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    pub page: usize,
    /// Baseline origin in native coordinates.
    pub origin: Point,
    pub size: f64,
    pub text: String,
}

/// Where a signature image goes, already scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub rect: Rect,
}

/// Render a text, date or checkbox field.
///
/// Signature descriptors yield nothing here; they are placed with
/// [`place_signature`] once the image dimensions are known.
pub fn render_field(
    profile: &TemplateProfile,
    descriptor: &FieldDescriptor,
    value: Option<&FieldValue>,
) -> Vec<TextMark> {
    let Some(value) = value else {
        return Vec::new();
    };
    let origin = to_native(descriptor.position(), &profile.coordinates);

    match &descriptor.kind {
        FieldKind::Text { font_size, .. } => match value.as_text() {
            Some(text) => vec![TextMark {
                page: descriptor.page,
                origin,
                size: font_size.unwrap_or(profile.default_font_size),
                text: text.into_owned(),
            }],
            None => Vec::new(),
        },

        FieldKind::Date {
            total_width,
            digits,
            font_size,
        } => render_date(
            descriptor.page,
            origin,
            &value.digits(),
            *total_width,
            *digits,
            profile.half_glyph_width,
            font_size.unwrap_or(profile.default_font_size),
        ),

        FieldKind::Checkbox { .. } => {
            if !value.is_checked() {
                return Vec::new();
            }
            let mark_size = profile.checkbox.mark_size;
            let origin = match profile.checkbox.anchor {
                CheckboxAnchor::Center => Point {
                    x: origin.x - mark_size / 2.0,
                    y: origin.y - mark_size / 2.0,
                },
                CheckboxAnchor::Origin => origin,
            };
            vec![TextMark {
                page: descriptor.page,
                origin,
                size: mark_size,
                text: CHECK_MARK.to_string(),
            }]
        }

        FieldKind::Signature { .. } => Vec::new(),
    }
}

/// Lay single digits into equally spaced slots, left to right.
///
/// Slot `i` is centred at `x + i*spacing + spacing/2`; the glyph origin is
/// pulled left by `half_glyph_width`. Digits past `slots` are dropped.
fn render_date(
    page: usize,
    origin: Point,
    digits: &str,
    total_width: f64,
    slots: usize,
    half_glyph_width: f64,
    size: f64,
) -> Vec<TextMark> {
    if digits.is_empty() || slots == 0 {
        return Vec::new();
    }
    let spacing = total_width / slots as f64;

    digits
        .chars()
        .take(slots)
        .enumerate()
        .map(|(i, digit)| TextMark {
            page,
            origin: Point {
                x: origin.x + i as f64 * spacing + spacing / 2.0 - half_glyph_width,
                y: origin.y,
            },
            size,
            text: digit.to_string(),
        })
        .collect()
}

/// Uniform scale that fits `(width, height)` inside `(max_width, max_height)`
/// without ever enlarging.
pub fn fit_scale(width: f64, height: f64, max_width: f64, max_height: f64) -> f64 {
    if width <= 0.0 || height <= 0.0 {
        return 1.0;
    }
    (max_width / width).min(max_height / height).min(1.0)
}

/// Scale and position a signature image of `width_px × height_px`.
///
/// Returns `None` for non-signature descriptors or a zero-sized image.
pub fn place_signature(
    profile: &TemplateProfile,
    descriptor: &FieldDescriptor,
    width_px: u32,
    height_px: u32,
) -> Option<Placement> {
    let FieldKind::Signature {
        max_width,
        max_height,
    } = descriptor.kind
    else {
        return None;
    };
    if width_px == 0 || height_px == 0 {
        return None;
    }

    let scale = fit_scale(width_px as f64, height_px as f64, max_width, max_height);
    let width = width_px as f64 * scale;
    let height = height_px as f64 * scale;
    let anchor = to_native(descriptor.position(), &profile.coordinates);

    let y = match profile.signature_anchor {
        SignatureAnchor::Bottom => anchor.y,
        SignatureAnchor::Top { baseline_adjust } => anchor.y - height + baseline_adjust,
    };

    Some(Placement {
        page: descriptor.page,
        rect: Rect {
            x: anchor.x,
            y,
            width,
            height,
        },
    })
}
