//! Line items: one purchasable entry in a shopping list.
//!
//! The three numeric fields are kept as the raw text the user typed so that
//! partially entered values ("2.", "") survive between edits. Only
//! [`crate::reconcile`] ever turns that text into numbers.

use crate::reconcile::{reconcile, NumericField, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a line item.
pub type ItemId = String;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh opaque identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Unit an item is sold by. Only affects labels, never arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    #[default]
    #[serde(rename = "kg")]
    Weight,
    #[serde(rename = "liter")]
    Volume,
    #[serde(rename = "quantity")]
    Count,
}

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Weight, UnitKind::Volume, UnitKind::Count];

    /// Persisted name (`kg`, `liter`, `quantity`).
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Weight => "kg",
            UnitKind::Volume => "liter",
            UnitKind::Count => "quantity",
        }
    }

    /// Label used after "Price/".
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Weight => "kg",
            UnitKind::Volume => "L",
            UnitKind::Count => "pcs",
        }
    }

    /// Short glyph for the unit toggle.
    pub fn glyph(&self) -> &'static str {
        match self {
            UnitKind::Weight => "kg",
            UnitKind::Volume => "L",
            UnitKind::Count => "#",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(UnitKind::Weight),
            "liter" => Ok(UnitKind::Volume),
            "quantity" => Ok(UnitKind::Count),
            other => Err(crate::error::Error::Other(format!(
                "unknown unit type: {}",
                other
            ))),
        }
    }
}

/// One entry of a shopping list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: ItemId,
    #[serde(default)]
    name: String,
    #[serde(rename = "unitType", default)]
    unit: UnitKind,
    #[serde(default)]
    price_per_unit: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    total_paid: String,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    timestamp: i64,
    /// Set by a rejected reconciliation, cleared by the next accepted edit.
    #[serde(skip)]
    has_error: bool,
}

impl LineItem {
    /// Empty item: blank name and numbers, unit `kg`, stamped now.
    pub fn new() -> Self {
        LineItem {
            id: new_id(),
            name: String::new(),
            unit: UnitKind::default(),
            price_per_unit: String::new(),
            quantity: String::new(),
            total_paid: String::new(),
            is_completed: false,
            timestamp: now_millis(),
            has_error: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> UnitKind {
        self.unit
    }

    pub fn price_per_unit(&self) -> &str {
        &self.price_per_unit
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn total_paid(&self) -> &str {
        &self.total_paid
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Creation time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whether the last reconciliation was rejected and no edit has happened since.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Raw text of a numeric field.
    pub fn field(&self, field: NumericField) -> &str {
        match field {
            NumericField::PricePerUnit => &self.price_per_unit,
            NumericField::Quantity => &self.quantity,
            NumericField::TotalPaid => &self.total_paid,
        }
    }

    fn field_mut(&mut self, field: NumericField) -> &mut String {
        match field {
            NumericField::PricePerUnit => &mut self.price_per_unit,
            NumericField::Quantity => &mut self.quantity,
            NumericField::TotalPaid => &mut self.total_paid,
        }
    }

    /// Overwrite a numeric field with raw user text.
    ///
    /// Text starting with `-` is refused and the field is left alone.
    /// Anything else is stored verbatim and clears the error flag.
    /// Returns whether the edit was accepted.
    pub fn set_field(&mut self, field: NumericField, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.starts_with('-') {
            debug!("Rejected negative input for {} on item {}", field, self.id);
            return false;
        }
        *self.field_mut(field) = text;
        self.has_error = false;
        true
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_unit(&mut self, unit: UnitKind) {
        self.unit = unit;
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }

    pub fn toggle_completed(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Run the reconciler over this item's fields and merge the result.
    ///
    /// A rejection sets the error flag and changes nothing else. A
    /// derivation writes exactly one field.
    pub fn trigger_reconcile(&mut self) -> Outcome {
        let outcome = reconcile(&self.price_per_unit, &self.quantity, &self.total_paid);
        match &outcome {
            Outcome::Derived(d) => {
                *self.field_mut(d.field) = d.value.clone();
                self.has_error = false;
            }
            Outcome::Rejected(r) => {
                debug!("Reconcile rejected for item {}: {:?}", self.id, r);
                self.has_error = true;
            }
        }
        outcome
    }

    /// Merge a partial update. Numeric fields go through [`Self::set_field`].
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.set_name(name);
        }
        if let Some(unit) = patch.unit {
            self.set_unit(unit);
        }
        for (field, text) in [
            (NumericField::PricePerUnit, patch.price_per_unit),
            (NumericField::Quantity, patch.quantity),
            (NumericField::TotalPaid, patch.total_paid),
        ] {
            if let Some(text) = text {
                self.set_field(field, text);
            }
        }
        if let Some(completed) = patch.is_completed {
            self.set_completed(completed);
        }
    }
}

impl Default for LineItem {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial update for a [`LineItem`]. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub unit: Option<UnitKind>,
    pub price_per_unit: Option<String>,
    pub quantity: Option<String>,
    pub total_paid: Option<String>,
    pub is_completed: Option<bool>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: UnitKind) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_field(mut self, field: NumericField, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match field {
            NumericField::PricePerUnit => self.price_per_unit = text,
            NumericField::Quantity => self.quantity = text,
            NumericField::TotalPaid => self.total_paid = text,
        }
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.is_completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
