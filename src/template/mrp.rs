//! IATSE MRP (Medical Reimbursement Plan) claim form.
//!
//! Coordinates were read off a cropped rendering of the form, so they are
//! top-left "visual" points. The crop offset was found by hand alignment:
//! `x = raw_x + 38`, `y = (792 - raw_y) + 28`.

use super::{
    CheckboxAnchor, CheckboxStyle, FieldDescriptor as F, FieldTable, SignatureAnchor,
    TemplateProfile,
};
use crate::coords::CoordinateSystem;

pub const RESOURCE: &str = "New-Claim-Form-Final.pdf";

/// Rows in the expense table on page 2.
pub const EXPENSE_ROWS: usize = 8;

const EXPENSE_FIRST_ROW_Y: f64 = 124.0;
const EXPENSE_ROW_PITCH: f64 = 18.0;

pub fn profile() -> TemplateProfile {
    TemplateProfile {
        name: "mrp".to_string(),
        resource: RESOURCE.to_string(),
        // Page 3 is the instruction sheet.
        fillable_pages: 2,
        coordinates: CoordinateSystem::Visual {
            offset_x: 38.0,
            offset_y: 28.0,
            page_height: 792.0,
        },
        checkbox: CheckboxStyle {
            anchor: CheckboxAnchor::Origin,
            mark_size: 12.0,
        },
        signature_anchor: SignatureAnchor::Top {
            baseline_adjust: 10.0,
        },
        default_font_size: 10.0,
        half_glyph_width: 3.0,
        filename_prefix: "MRP-Claim".to_string(),
        primary_name_field: "participant_last_name".to_string(),
        fields: fields(),
    }
}

/// Keys of the three cells in expense row `row` (zero-based).
pub fn expense_keys(row: usize) -> [String; 3] {
    let n = row + 1;
    [
        format!("expense_{}_provider", n),
        format!("expense_{}_dates", n),
        format!("expense_{}_amount", n),
    ]
}

fn fields() -> FieldTable {
    let mut fields: Vec<(String, F)> = [
        // Page 1: participant
        ("participant_last_name", F::text(164.0, 405.0).font_size(11.0)),
        ("participant_first_name", F::text(321.0, 405.0).font_size(11.0)),
        ("participant_mi", F::text(497.0, 405.0).font_size(11.0)),
        ("ssn", F::text(177.0, 432.0).font_size(11.0)),
        ("gender_male", F::checkbox(424.0, 433.0)),
        ("gender_female", F::checkbox(502.5, 433.0)),
        ("dob_month", F::text(164.0, 460.0).font_size(11.0)),
        ("dob_day", F::text(257.0, 460.0).font_size(11.0)),
        ("dob_year", F::text(347.0, 460.0).font_size(11.0)),
        ("street", F::text(104.0, 488.0).font_size(10.0)),
        ("city", F::text(316.0, 488.0).font_size(10.0)),
        ("state", F::text(451.0, 488.0).font_size(10.0)),
        ("zip", F::text(486.0, 488.0).font_size(10.0)),
        ("phone", F::text(129.0, 516.0).font_size(10.0)),
        ("email", F::text(327.0, 516.0).font_size(9.0)),
        ("other_coverage", F::text(257.0, 544.0).font_size(10.0)),
        // Page 1: patient
        ("patient_last_name", F::text(129.0, 571.0).font_size(11.0)),
        ("patient_first_name", F::text(303.0, 571.0).font_size(11.0)),
        ("patient_mi", F::text(503.5, 571.0).font_size(11.0)),
        ("patient_relationship", F::text(192.0, 605.0).font_size(11.0)),
        ("patient_dob_month", F::text(164.0, 629.0).font_size(11.0)),
        ("patient_dob_day", F::text(263.0, 629.0).font_size(11.0)),
        ("patient_dob_year", F::text(343.0, 629.0).font_size(11.0)),
        // Page 2: totals, plan checkboxes, signature
        ("total_amount", F::text(447.0, 290.0).font_size(11.0).on_page(1)),
        ("dental_yes", F::checkbox(275.0, 325.0).on_page(1)),
        ("dental_no", F::checkbox(316.0, 324.0).on_page(1)),
        ("vision_yes", F::checkbox(449.0, 323.0).on_page(1)),
        ("vision_no", F::checkbox(497.0, 324.0).on_page(1)),
        ("signature_date", F::text(449.0, 640.0).font_size(10.0).on_page(1)),
        ("signature_image", F::signature(100.0, 640.0, 180.0, 40.0).on_page(1)),
    ]
    .into_iter()
    .map(|(k, d)| (k.to_string(), d))
    .collect();

    for row in 0..EXPENSE_ROWS {
        let y = EXPENSE_FIRST_ROW_Y + row as f64 * EXPENSE_ROW_PITCH;
        let [provider, dates, amount] = expense_keys(row);
        fields.push((provider, F::text(46.0, y).font_size(9.0).on_page(1)));
        fields.push((dates, F::text(280.0, y).font_size(9.0).on_page(1)));
        fields.push((amount, F::text(447.0, y).font_size(9.0).on_page(1)));
    }

    fields.into_iter().collect()
}
