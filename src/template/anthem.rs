//! Anthem member claim form.
//!
//! Coordinates were taken with a PDF mapping tool, so they are already in
//! native user space. Text and date points are baselines, checkbox points
//! are box centres, signature points are lower-left corners.

use super::{
    CheckboxAnchor, CheckboxStyle, FieldDescriptor as F, FieldTable, SignatureAnchor,
    TemplateProfile,
};
use crate::coords::CoordinateSystem;

pub const RESOURCE: &str = "Anthem_Claim_Form.pdf";

pub fn profile() -> TemplateProfile {
    TemplateProfile {
        name: "anthem".to_string(),
        resource: RESOURCE.to_string(),
        // Page 2 is the instruction sheet.
        fillable_pages: 1,
        coordinates: CoordinateSystem::Native,
        checkbox: CheckboxStyle {
            anchor: CheckboxAnchor::Center,
            mark_size: 10.0,
        },
        signature_anchor: SignatureAnchor::Bottom,
        default_font_size: 10.0,
        half_glyph_width: 3.0,
        filename_prefix: "Anthem-Claim".to_string(),
        primary_name_field: "member_last_name".to_string(),
        fields: fields(),
    }
}

fn fields() -> FieldTable {
    [
        // Member information
        ("member_last_name", F::text(93.0, 675.0).max_width(189.0)),
        ("member_first_name", F::text(350.0, 675.0).max_width(156.0)),
        ("member_mi", F::text(538.0, 675.0).max_width(34.0)),
        ("member_id", F::text(93.0, 647.0).max_width(190.0)),
        ("group_no", F::text(348.0, 648.0).max_width(160.0)),
        ("member_street", F::text(93.0, 620.0).max_width(212.0)),
        ("member_city", F::text(332.0, 620.0).max_width(117.0)),
        ("member_state", F::text(472.0, 620.0).max_width(34.0)),
        ("member_zip", F::text(516.0, 620.0).max_width(53.0)),
        // Patient information
        ("patient_last_name", F::text(84.0, 574.0).max_width(220.0)),
        ("patient_first_name", F::text(342.0, 575.0).max_width(168.0)),
        ("patient_mi", F::text(539.0, 573.0).max_width(31.0)),
        ("patient_sex_male", F::checkbox(44.0, 552.0).box_size(14.0)),
        ("patient_sex_female", F::checkbox(88.0, 552.0).box_size(14.0)),
        ("patient_dob", F::date(199.0, 547.0, 105.0, 8)),
        ("relationship_self", F::checkbox(314.0, 552.0).box_size(14.0)),
        ("relationship_spouse", F::checkbox(356.0, 553.0).box_size(14.0)),
        ("relationship_son", F::checkbox(410.0, 552.0).box_size(14.0)),
        ("relationship_daughter", F::checkbox(450.0, 552.0).box_size(14.0)),
        // Diagnosis
        ("illness", F::text(74.0, 501.0).max_width(278.0)),
        ("accident_date", F::date(467.0, 501.0, 110.0, 8)),
        // Work related
        ("work_related_yes", F::checkbox(190.0, 470.0).box_size(14.0)),
        ("work_related_no", F::checkbox(221.0, 469.0).box_size(14.0)),
        ("employer_name", F::text(87.0, 437.0).max_width(343.0)),
        ("employer_street", F::text(88.0, 410.0).max_width(204.0)),
        ("employer_city", F::text(331.0, 411.0).max_width(131.0)),
        ("employer_state", F::text(469.0, 410.0).max_width(30.0)),
        ("employer_zip", F::text(508.0, 410.0).max_width(54.0)),
        // Other group health insurance
        ("other_insurance_yes", F::checkbox(232.0, 379.0).box_size(14.0)),
        ("other_insurance_no", F::checkbox(263.0, 378.0).box_size(14.0)),
        ("policyholder_name", F::text(49.0, 347.0).max_width(125.0)),
        ("policyholder_dob", F::date(185.0, 347.0, 107.0, 8)),
        ("other_insurance_company", F::text(300.0, 347.0).max_width(100.0)),
        ("other_policy_id", F::text(417.0, 346.0).max_width(74.0)),
        ("other_group_no", F::text(501.0, 346.0).max_width(70.0)),
        // Medicare
        ("medicare_yes", F::checkbox(174.0, 313.0).box_size(14.0)),
        ("medicare_no", F::checkbox(204.0, 314.0).box_size(14.0)),
        ("part_a_checkbox", F::checkbox(45.0, 294.0).box_size(14.0)),
        ("part_b_checkbox", F::checkbox(312.0, 293.0).box_size(14.0)),
        ("part_d_checkbox", F::checkbox(45.0, 280.0).box_size(14.0)),
        ("part_a_date", F::date(137.0, 293.0, 107.0, 8)),
        ("part_b_date", F::date(408.0, 292.0, 109.0, 8)),
        ("part_d_date", F::date(136.0, 279.0, 108.0, 8)),
        ("part_d_carrier", F::text(357.0, 279.0).max_width(206.0)),
        // Signatures
        ("patient_signature", F::signature(120.0, 70.0, 200.0, 20.0)),
        ("patient_signature_date", F::date(469.0, 75.0, 109.0, 8)),
        ("member_signature", F::signature(120.0, 44.0, 200.0, 20.0)),
        ("member_signature_date", F::date(468.0, 46.0, 109.0, 8)),
    ]
    .into_iter()
    .collect()
}
