//! Typed slot storage for collected buyer requirements
//!
//! The dialogue collects a closed set of slots. Each slot carries the
//! confidence reported by the matcher that set it and the turn number it
//! was captured on, so later extractions can be compared against earlier
//! ones instead of blindly overwriting.

use serde::{Deserialize, Serialize};

/// A captured slot value with matcher confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotValue<T> {
    pub value: T,
    /// Matcher confidence in [0, 1]
    pub confidence: f32,
    /// Turn number the value was captured on
    pub turn_set: u32,
}

impl<T> SlotValue<T> {
    pub fn new(value: T, confidence: f32, turn_set: u32) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            turn_set,
        }
    }
}

/// Property category, the two-class branch point of the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyCategory {
    Residential,
    Commercial,
}

impl PropertyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::Residential => "Residential",
            PropertyCategory::Commercial => "Commercial",
        }
    }
}

impl std::fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget as spoken plus the parsed numeric range, absolute rupees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetValue {
    /// Verbatim budget utterance ("50 lakhs", "flexible")
    pub raw: String,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl BudgetValue {
    /// True when the raw text yielded a numeric range
    pub fn is_parsed(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }
}

/// Everything the dialogue aims to collect, one optional field per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedData {
    pub location: Option<SlotValue<String>>,
    pub category: Option<SlotValue<PropertyCategory>>,
    /// Subtype within the category ("Apartments", "Office Space", ...)
    pub property_type: Option<SlotValue<String>>,
    /// Normalized configuration: "N BHK" or "Studio"
    pub bedroom: Option<SlotValue<String>>,
    pub consent: Option<SlotValue<bool>>,
    pub budget: Option<SlotValue<BudgetValue>>,
    pub email: Option<SlotValue<String>>,
    pub name: Option<SlotValue<String>>,
}

impl CollectedData {
    /// Number of populated slots
    pub fn filled_count(&self) -> usize {
        [
            self.location.is_some(),
            self.category.is_some(),
            self.property_type.is_some(),
            self.bedroom.is_some(),
            self.consent.is_some(),
            self.budget.is_some(),
            self.email.is_some(),
            self.name.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// Number of populated requirement slots (the ones the search needs)
    pub fn requirement_count(&self) -> usize {
        [
            self.location.is_some(),
            self.category.is_some(),
            self.property_type.is_some(),
            self.bedroom.is_some(),
            self.budget.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn consent_given(&self) -> bool {
        self.consent.as_ref().map(|s| s.value).unwrap_or(false)
    }

    pub fn budget_parsed(&self) -> bool {
        self.budget
            .as_ref()
            .map(|s| s.value.is_parsed())
            .unwrap_or(false)
    }

    /// Spoken paraphrase of the captured requirements, for the
    /// verification question
    pub fn requirements_summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(bedroom) = &self.bedroom {
            parts.push(bedroom.value.clone());
        }
        if let Some(ptype) = &self.property_type {
            parts.push(ptype.value.clone());
        } else if let Some(category) = &self.category {
            parts.push(format!("{} property", category.value));
        }
        if let Some(location) = &self.location {
            parts.push(format!("in {}", location.value));
        }
        if let Some(budget) = &self.budget {
            parts.push(format!("with a budget of {}", budget.value.raw));
        }
        if parts.is_empty() {
            "a property".to_string()
        } else {
            format!("a {}", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_value_clamps_confidence() {
        let slot = SlotValue::new("Noida".to_string(), 1.4, 2);
        assert_eq!(slot.confidence, 1.0);
        let slot = SlotValue::new("Noida".to_string(), -0.1, 2);
        assert_eq!(slot.confidence, 0.0);
    }

    #[test]
    fn budget_parsed_needs_both_bounds() {
        let full = BudgetValue {
            raw: "50 lakhs".into(),
            min: Some(3_500_000),
            max: Some(5_000_000),
        };
        assert!(full.is_parsed());

        let unparsed = BudgetValue {
            raw: "flexible".into(),
            min: None,
            max: None,
        };
        assert!(!unparsed.is_parsed());
    }

    #[test]
    fn requirements_summary_reads_naturally() {
        let mut data = CollectedData::default();
        data.bedroom = Some(SlotValue::new("2 BHK".to_string(), 0.95, 4));
        data.property_type = Some(SlotValue::new("Apartments".to_string(), 0.95, 3));
        data.location = Some(SlotValue::new("Noida".to_string(), 0.95, 2));
        data.budget = Some(SlotValue::new(
            BudgetValue {
                raw: "50 lakhs".into(),
                min: Some(3_500_000),
                max: Some(5_000_000),
            },
            1.0,
            6,
        ));

        assert_eq!(
            data.requirements_summary(),
            "a 2 BHK Apartments in Noida with a budget of 50 lakhs"
        );
    }

    #[test]
    fn requirement_count_ignores_contact_slots() {
        let mut data = CollectedData::default();
        data.name = Some(SlotValue::new("Asha".to_string(), 1.0, 1));
        data.email = Some(SlotValue::new("a@b.co".to_string(), 1.0, 2));
        assert_eq!(data.requirement_count(), 0);

        data.location = Some(SlotValue::new("Pune".to_string(), 0.95, 3));
        assert_eq!(data.requirement_count(), 1);
        assert_eq!(data.filled_count(), 3);
    }
}
