//! # Coordinate Mapping
//!
//! Field tables are authored in one of two conventions. Some are measured
//! directly in PDF user space (origin bottom-left); others were measured on a
//! rendered, cropped image of the page (origin top-left) and need flipping
//! plus a fixed calibration offset.
//!
//! Every renderer goes through [`to_native`]. A wrong offset here moves
//! every mark on the page by the same amount, so there is exactly one
//! implementation.

use serde::{Deserialize, Serialize};

use crate::model::Point;

/// How a template's field coordinates are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoordinateSystem {
    /// Already bottom-left PDF user space.
    Native,
    /// Top-left "visual" space of a cropped page rendering.
    #[serde(rename_all = "camelCase")]
    Visual {
        offset_x: f64,
        offset_y: f64,
        page_height: f64,
    },
}

/// Convert an authoring-space point to native PDF coordinates.
pub fn to_native(point: Point, system: &CoordinateSystem) -> Point {
    match *system {
        CoordinateSystem::Native => point,
        CoordinateSystem::Visual {
            offset_x,
            offset_y,
            page_height,
        } => Point {
            x: point.x + offset_x,
            y: (page_height - point.y) + offset_y,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MRP: CoordinateSystem = CoordinateSystem::Visual {
        offset_x: 38.0,
        offset_y: 28.0,
        page_height: 792.0,
    };

    #[test]
    fn test_native_is_passthrough() {
        let p = Point::new(93.0, 675.0);
        assert_eq!(to_native(p, &CoordinateSystem::Native), p);
    }

    #[test]
    fn test_visual_flips_and_offsets() {
        let p = to_native(Point::new(164.0, 405.0), &MRP);
        assert_eq!(p, Point::new(202.0, 415.0));
    }

    #[test]
    fn test_visual_top_of_page() {
        let p = to_native(Point::new(0.0, 0.0), &MRP);
        assert_eq!(p, Point::new(38.0, 820.0));
    }

    #[test]
    fn test_visual_keeps_fractional_positions() {
        let p = to_native(Point::new(502.5, 433.0), &MRP);
        assert!((p.x - 540.5).abs() < 1e-9);
        assert!((p.y - 387.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_system_from_json() {
        let sys: CoordinateSystem = serde_json::from_str(
            r#"{ "type": "visual", "offsetX": 38, "offsetY": 28, "pageHeight": 792 }"#,
        )
        .unwrap();
        assert_eq!(sys, MRP);
        let native: CoordinateSystem = serde_json::from_str(r#"{ "type": "native" }"#).unwrap();
        assert_eq!(native, CoordinateSystem::Native);
    }
}
