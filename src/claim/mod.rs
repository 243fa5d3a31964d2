//! # Claim Forms
//!
//! Typed claim inputs for the built-in templates, and their flattening into a
//! [`FormSnapshot`] keyed by field name. The mapping decides *which* boxes get
//! ticked (a "no" answer ticks the "no" box, a "yes" answer unlocks the
//! follow-up fields); the renderer then decides *how* each value is drawn.

pub mod anthem;
pub mod mrp;

pub use anthem::AnthemClaim;
pub use mrp::{ExpenseItem, MrpClaim};

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::model::FormSnapshot;
use crate::template::TemplateKind;

/// Anything that can be flattened into field values for one template.
pub trait ClaimForm {
    fn template(&self) -> TemplateKind;
    fn snapshot(&self) -> FormSnapshot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

/// A claim for either built-in template.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    Anthem(AnthemClaim),
    Mrp(MrpClaim),
}

impl Claim {
    /// Parse a claim for `kind` from camelCase JSON.
    pub fn from_json(kind: TemplateKind, json: &str) -> Result<Self, ClaimError> {
        let claim = match kind {
            TemplateKind::Anthem => Claim::Anthem(serde_json::from_str(json).map_err(|e| ClaimError::config("claim", e))?),
            TemplateKind::Mrp => Claim::Mrp(serde_json::from_str(json).map_err(|e| ClaimError::config("claim", e))?),
        };
        Ok(claim)
    }

    /// A filled-in sample, used by `claimfill example`.
    pub fn example(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Anthem => Claim::Anthem(AnthemClaim::example()),
            TemplateKind::Mrp => Claim::Mrp(MrpClaim::example()),
        }
    }

    pub fn to_json(&self) -> String {
        let json = match self {
            Claim::Anthem(c) => serde_json::to_string_pretty(c),
            Claim::Mrp(c) => serde_json::to_string_pretty(c),
        };
        // Plain strings, bools and finite numbers only.
        json.unwrap_or_default()
    }
}

impl ClaimForm for Claim {
    fn template(&self) -> TemplateKind {
        match self {
            Claim::Anthem(c) => c.template(),
            Claim::Mrp(c) => c.template(),
        }
    }

    fn snapshot(&self) -> FormSnapshot {
        match self {
            Claim::Anthem(c) => c.snapshot(),
            Claim::Mrp(c) => c.snapshot(),
        }
    }
}
