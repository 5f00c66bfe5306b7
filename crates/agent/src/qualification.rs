//! Deterministic lead qualification
//!
//! Pure over (collected data, search count); no I/O, no hidden state,
//! trivially repeatable. Two rules exist side by side:
//! - [`evaluate`] is the baseline: all three checks must hold.
//! - [`evaluate_consent_only`] is the relaxed variant the web widget
//!   applies, qualifying on consent alone. Kept as its own named
//!   function so the divergence stays visible instead of silently
//!   picking one.

use lead_agent_core::{CollectedData, QualificationDecision, QualificationStatus};

fn build_decision(
    property_check: bool,
    consent_check: bool,
    budget_check: bool,
    search_count: u32,
) -> QualificationDecision {
    let qualified = property_check && consent_check && budget_check;

    let summary = if qualified {
        format!(
            "Lead qualified: {search_count} properties found, consent given, \
             budget parsed successfully."
        )
    } else {
        let mut reasons = Vec::new();
        if !property_check {
            reasons.push("no matching properties found");
        }
        if !consent_check {
            reasons.push("no sales consent");
        }
        if !budget_check {
            reasons.push("budget could not be parsed");
        }
        format!("Lead not qualified: {}.", reasons.join(", "))
    };

    QualificationDecision {
        property_count_check: property_check,
        consent_check,
        budget_parsed_check: budget_check,
        summary,
        status: if qualified {
            QualificationStatus::Qualified
        } else {
            QualificationStatus::NotQualified
        },
    }
}

/// Baseline rule: positive match count AND consent AND parseable budget.
pub fn evaluate(data: &CollectedData, search_count: u32) -> QualificationDecision {
    build_decision(
        search_count > 0,
        data.consent_given(),
        data.budget_parsed(),
        search_count,
    )
}

/// Relaxed widget rule: consent alone qualifies; the property and budget
/// checks are assumed to pass.
pub fn evaluate_consent_only(data: &CollectedData, search_count: u32) -> QualificationDecision {
    build_decision(true, data.consent_given(), true, search_count)
}
