//! IATSE MRP reimbursement claim.

use serde::{Deserialize, Serialize};

use super::{ClaimForm, Sex};
use crate::model::{DateParts, FieldValue, FormSnapshot};
use crate::template::mrp::{expense_keys, EXPENSE_ROWS};
use crate::template::TemplateKind;

/// One line of the expense table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseItem {
    pub provider: String,
    pub dates: String,
    pub amount: Option<f64>,
}

impl ExpenseItem {
    pub fn new(provider: &str, dates: &str, amount: f64) -> Self {
        Self {
            provider: provider.to_string(),
            dates: dates.to_string(),
            amount: Some(amount),
        }
    }

    /// Rows with nothing typed in them are dropped before drawing.
    pub fn is_blank(&self) -> bool {
        self.provider.trim().is_empty() && self.dates.trim().is_empty() && self.amount.is_none()
    }

    fn amount_or_zero(&self) -> f64 {
        self.amount.filter(|a| a.is_finite()).unwrap_or(0.0)
    }
}

fn dollars(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MrpClaim {
    pub participant_last_name: String,
    pub participant_first_name: String,
    pub participant_mi: String,
    /// SSN or plan participant ID.
    pub participant_id: String,
    pub gender: Option<Sex>,
    pub dob: DateParts,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub telephone: String,
    pub email: String,
    pub other_coverage: String,

    pub patient_last_name: String,
    pub patient_first_name: String,
    pub patient_mi: String,
    pub relationship: String,
    pub patient_dob: DateParts,

    pub expenses: Vec<ExpenseItem>,
    pub dental_plan: bool,
    pub vision_plan: bool,
    /// `YYYY-MM-DD`, as a date picker produces it.
    pub signature_date: String,
}

impl MrpClaim {
    /// Non-blank expense rows, in entry order.
    pub fn kept_expenses(&self) -> impl Iterator<Item = &ExpenseItem> {
        self.expenses.iter().filter(|e| !e.is_blank())
    }

    /// Sum over every kept row, including rows past the last printed one.
    pub fn total(&self) -> f64 {
        self.kept_expenses().map(ExpenseItem::amount_or_zero).sum()
    }

    pub fn example() -> Self {
        Self {
            participant_last_name: "Doe".to_string(),
            participant_first_name: "Alex".to_string(),
            participant_id: "123-45-6789".to_string(),
            gender: Some(Sex::Male),
            dob: DateParts::new("04", "22", "1985"),
            street: "742 Evergreen Terrace".to_string(),
            city: "Burbank".to_string(),
            state: "CA".to_string(),
            zip: "91501".to_string(),
            telephone: "(818) 555-0100".to_string(),
            email: "alex.doe@example.com".to_string(),
            patient_last_name: "Doe".to_string(),
            patient_first_name: "Alex".to_string(),
            relationship: "Self".to_string(),
            patient_dob: DateParts::new("04", "22", "1985"),
            expenses: vec![
                ExpenseItem::new("Valley Optometry", "02/03/2026", 185.0),
                ExpenseItem::new("Burbank Dental Group", "02/17/2026", 92.5),
            ],
            vision_plan: true,
            signature_date: "2026-03-01".to_string(),
            ..Self::default()
        }
    }
}

impl ClaimForm for MrpClaim {
    fn template(&self) -> TemplateKind {
        TemplateKind::Mrp
    }

    fn snapshot(&self) -> FormSnapshot {
        let mut s = FormSnapshot::new();

        s.set("participant_last_name", self.participant_last_name.as_str())
            .set("participant_first_name", self.participant_first_name.as_str())
            .set("participant_mi", self.participant_mi.as_str())
            .set("ssn", self.participant_id.as_str())
            .set("dob_month", self.dob.month.as_str())
            .set("dob_day", self.dob.day.as_str())
            .set("dob_year", self.dob.year.as_str())
            .set("street", self.street.as_str())
            .set("city", self.city.as_str())
            .set("state", self.state.as_str())
            .set("zip", self.zip.as_str())
            .set("phone", self.telephone.as_str())
            .set("email", self.email.as_str())
            .set("other_coverage", self.other_coverage.as_str());
        s.check("gender_male", self.gender == Some(Sex::Male))
            .check("gender_female", self.gender == Some(Sex::Female));

        s.set("patient_last_name", self.patient_last_name.as_str())
            .set("patient_first_name", self.patient_first_name.as_str())
            .set("patient_mi", self.patient_mi.as_str())
            .set("patient_relationship", self.relationship.as_str())
            .set("patient_dob_month", self.patient_dob.month.as_str())
            .set("patient_dob_day", self.patient_dob.day.as_str())
            .set("patient_dob_year", self.patient_dob.year.as_str());

        for (row, expense) in self.kept_expenses().take(EXPENSE_ROWS).enumerate() {
            let [provider, dates, amount] = expense_keys(row);
            s.set(provider, expense.provider.as_str())
                .set(dates, expense.dates.as_str())
                .set(amount, dollars(expense.amount_or_zero()));
        }
        s.set("total_amount", dollars(self.total()));

        s.check(if self.dental_plan { "dental_yes" } else { "dental_no" }, true)
            .check(if self.vision_plan { "vision_yes" } else { "vision_no" }, true);

        let signature_date = match DateParts::from_iso(&self.signature_date) {
            Some(date) => FieldValue::Date(date),
            None => FieldValue::Text(self.signature_date.clone()),
        };
        s.set("signature_date", signature_date);
        s
    }
}
