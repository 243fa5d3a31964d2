//! Anthem member claim.

use serde::{Deserialize, Serialize};

use super::{ClaimForm, Sex};
use crate::model::{DateParts, FormSnapshot};
use crate::template::TemplateKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    #[serde(rename = "self", alias = "Self")]
    Member,
    #[serde(alias = "Spouse")]
    Spouse,
    #[serde(alias = "Son")]
    Son,
    #[serde(alias = "Daughter")]
    Daughter,
}

impl Relationship {
    fn field(self) -> &'static str {
        match self {
            Relationship::Member => "relationship_self",
            Relationship::Spouse => "relationship_spouse",
            Relationship::Son => "relationship_son",
            Relationship::Daughter => "relationship_daughter",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnthemClaim {
    pub member_last_name: String,
    pub member_first_name: String,
    pub member_mi: String,
    pub member_id: String,
    pub group_no: String,
    pub member_street: String,
    pub member_city: String,
    pub member_state: String,
    pub member_zip: String,

    pub patient_last_name: String,
    pub patient_first_name: String,
    pub patient_mi: String,
    pub patient_sex: Option<Sex>,
    pub patient_dob: DateParts,
    pub relationship: Option<Relationship>,

    pub illness: String,
    pub accident_date: DateParts,

    pub work_related: bool,
    pub employer_name: String,
    pub employer_street: String,
    pub employer_city: String,
    pub employer_state: String,
    pub employer_zip: String,

    pub other_insurance: bool,
    pub policyholder_name: String,
    pub policyholder_dob: DateParts,
    pub other_insurance_company: String,
    pub other_policy_id: String,
    pub other_group_no: String,

    pub medicare: bool,
    pub medicare_claim_no: String,
    pub part_a: bool,
    pub part_a_date: DateParts,
    pub part_b: bool,
    pub part_b_date: DateParts,
    pub part_d: bool,
    pub part_d_date: DateParts,
    pub part_d_carrier: String,

    pub patient_signature_date: DateParts,
    pub member_signature_date: DateParts,
}

impl ClaimForm for AnthemClaim {
    fn template(&self) -> TemplateKind {
        TemplateKind::Anthem
    }

    fn snapshot(&self) -> FormSnapshot {
        let mut s = FormSnapshot::new();

        s.set("member_last_name", self.member_last_name.as_str())
            .set("member_first_name", self.member_first_name.as_str())
            .set("member_mi", self.member_mi.as_str())
            .set("member_id", self.member_id.as_str())
            .set("group_no", self.group_no.as_str())
            .set("member_street", self.member_street.as_str())
            .set("member_city", self.member_city.as_str())
            .set("member_state", self.member_state.as_str())
            .set("member_zip", self.member_zip.as_str());

        s.set("patient_last_name", self.patient_last_name.as_str())
            .set("patient_first_name", self.patient_first_name.as_str())
            .set("patient_mi", self.patient_mi.as_str())
            .set("patient_dob", self.patient_dob.clone());
        if let Some(sex) = self.patient_sex {
            s.check(sex_field(sex), true);
        }
        if let Some(relationship) = self.relationship {
            s.check(relationship.field(), true);
        }

        s.set("illness", self.illness.as_str())
            .set("accident_date", self.accident_date.clone());

        if self.work_related {
            s.check("work_related_yes", true)
                .set("employer_name", self.employer_name.as_str())
                .set("employer_street", self.employer_street.as_str())
                .set("employer_city", self.employer_city.as_str())
                .set("employer_state", self.employer_state.as_str())
                .set("employer_zip", self.employer_zip.as_str());
        } else {
            s.check("work_related_no", true);
        }

        if self.other_insurance {
            s.check("other_insurance_yes", true)
                .set("policyholder_name", self.policyholder_name.as_str())
                .set("policyholder_dob", self.policyholder_dob.clone())
                .set("other_insurance_company", self.other_insurance_company.as_str())
                .set("other_policy_id", self.other_policy_id.as_str())
                .set("other_group_no", self.other_group_no.as_str());
        } else {
            s.check("other_insurance_no", true);
        }

        if self.medicare {
            s.check("medicare_yes", true)
                .set("medicare_claim_no", self.medicare_claim_no.as_str());
            if self.part_a {
                s.check("part_a_checkbox", true)
                    .set("part_a_date", self.part_a_date.clone());
            }
            if self.part_b {
                s.check("part_b_checkbox", true)
                    .set("part_b_date", self.part_b_date.clone());
            }
            if self.part_d {
                s.check("part_d_checkbox", true)
                    .set("part_d_date", self.part_d_date.clone())
                    .set("part_d_carrier", self.part_d_carrier.as_str());
            }
        } else {
            s.check("medicare_no", true);
        }

        s.set("patient_signature_date", self.patient_signature_date.clone())
            .set("member_signature_date", self.member_signature_date.clone());
        s
    }
}

fn sex_field(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "patient_sex_male",
        Sex::Female => "patient_sex_female",
    }
}

impl AnthemClaim {
    pub fn example() -> Self {
        Self {
            member_last_name: "Smith".to_string(),
            member_first_name: "Jordan".to_string(),
            member_mi: "A".to_string(),
            member_id: "XYZ123456789".to_string(),
            group_no: "00012345".to_string(),
            member_street: "123 Main St".to_string(),
            member_city: "Springfield".to_string(),
            member_state: "IL".to_string(),
            member_zip: "62701".to_string(),
            patient_last_name: "Smith".to_string(),
            patient_first_name: "Casey".to_string(),
            patient_sex: Some(Sex::Female),
            patient_dob: DateParts::new("01", "15", "1990"),
            relationship: Some(Relationship::Spouse),
            illness: "Sprained ankle".to_string(),
            accident_date: DateParts::new("03", "02", "2026"),
            medicare: true,
            medicare_claim_no: "1EG4TE5MK73".to_string(),
            part_b: true,
            part_b_date: DateParts::new("07", "01", "2020"),
            patient_signature_date: DateParts::new("03", "10", "2026"),
            member_signature_date: DateParts::new("03", "10", "2026"),
            ..Self::default()
        }
    }
}
