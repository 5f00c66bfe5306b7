//! Conversation stages and the static flow table
//!
//! The stage set is a closed enum; dispatch happens on the variant, never
//! on strings. The flow table maps each stage to its question template,
//! the slot it collects, and the default next stage, and is testable on
//! its own, separately from the handlers.

use serde::{Deserialize, Serialize};

/// Conversation stages for the qualification flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Stage {
    /// Identity confirmation and introduction
    #[default]
    Greeting,
    /// Is the caller looking for property at all
    InterestCheck,
    /// Which city
    Location,
    /// Residential or commercial
    PropertyCategory,
    /// Subtype within the category
    PropertyType,
    /// Bedroom configuration (residential branch only)
    Bedroom,
    /// Confirm requirements captured from information-dense input
    VerifyRequirements,
    /// Search ran; ask for callback consent
    SearchComplete,
    /// Capture the caller's name mid-flow
    AskName,
    /// Budget range
    Budget,
    /// Confirm callback number, collect email
    PhoneConfirm,
    /// Full slot set collected
    Complete,
    /// Caller declined
    ThankYou,
    /// Unrecoverable state; hand off to a human
    Error,
}

/// Slot a stage aims to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSlot {
    Identity,
    Interest,
    Location,
    Category,
    PropertyType,
    Bedroom,
    Verified,
    Consent,
    Name,
    Budget,
    Email,
}

/// One row of the flow table
#[derive(Debug, Clone, Copy)]
pub struct FlowEntry {
    /// Question template for the stage, if it asks one
    pub question: Option<&'static str>,
    /// Slot the stage collects
    pub slot: Option<TargetSlot>,
    /// Default next stage; branching handlers may override
    pub default_next: Option<Stage>,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::InterestCheck => "interest_check",
            Stage::Location => "location",
            Stage::PropertyCategory => "property_category",
            Stage::PropertyType => "property_type",
            Stage::Bedroom => "bedroom",
            Stage::VerifyRequirements => "verify_requirements",
            Stage::SearchComplete => "search_complete",
            Stage::AskName => "ask_name",
            Stage::Budget => "budget",
            Stage::PhoneConfirm => "phone_confirm",
            Stage::Complete => "complete",
            Stage::ThankYou => "thank_you",
            Stage::Error => "error",
        }
    }

    /// Stages after which no further turns are expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::ThankYou | Stage::Error)
    }

    /// Early slot-collection stages where the rich-input shortcut applies
    pub fn is_early_collection(&self) -> bool {
        matches!(
            self,
            Stage::InterestCheck
                | Stage::Location
                | Stage::PropertyCategory
                | Stage::PropertyType
                | Stage::Bedroom
        )
    }

    /// Static flow table entry for the stage
    pub fn entry(&self) -> FlowEntry {
        match self {
            Stage::Greeting => FlowEntry {
                question: Some("Hello! This is RealtyAssistant calling. Am I speaking with {name}?"),
                slot: Some(TargetSlot::Identity),
                default_next: Some(Stage::InterestCheck),
            },
            Stage::InterestCheck => FlowEntry {
                question: Some(
                    "Are you currently interested in purchasing or renting a property?",
                ),
                slot: Some(TargetSlot::Interest),
                default_next: Some(Stage::Location),
            },
            Stage::Location => FlowEntry {
                question: Some("Great! Which city are you looking for property in?"),
                slot: Some(TargetSlot::Location),
                default_next: Some(Stage::PropertyCategory),
            },
            Stage::PropertyCategory => FlowEntry {
                question: Some(
                    "Got it! Are you looking for a Residential or Commercial property?",
                ),
                slot: Some(TargetSlot::Category),
                default_next: Some(Stage::PropertyType),
            },
            Stage::PropertyType => FlowEntry {
                // Question depends on the captured category
                question: None,
                slot: Some(TargetSlot::PropertyType),
                default_next: Some(Stage::Bedroom),
            },
            Stage::Bedroom => FlowEntry {
                question: Some(
                    "How many bedrooms do you need? 1 BHK, 2 BHK, 3 BHK, or 4 BHK?",
                ),
                slot: Some(TargetSlot::Bedroom),
                default_next: Some(Stage::SearchComplete),
            },
            Stage::VerifyRequirements => FlowEntry {
                question: Some("Did I get your requirements right?"),
                slot: Some(TargetSlot::Verified),
                default_next: Some(Stage::SearchComplete),
            },
            Stage::SearchComplete => FlowEntry {
                question: Some(
                    "Would you like our property expert to call you with personalized \
                     recommendations?",
                ),
                slot: Some(TargetSlot::Consent),
                // Branches on consent and whether the name is known
                default_next: None,
            },
            Stage::AskName => FlowEntry {
                question: Some(
                    "By the way, may I know your good name so our expert knows who to ask for?",
                ),
                slot: Some(TargetSlot::Name),
                default_next: Some(Stage::Budget),
            },
            Stage::Budget => FlowEntry {
                question: Some("What's your budget range for this property?"),
                slot: Some(TargetSlot::Budget),
                default_next: Some(Stage::PhoneConfirm),
            },
            Stage::PhoneConfirm => FlowEntry {
                question: Some(
                    "I'll have an expert call you at this number. Can you also share your \
                     email for property alerts?",
                ),
                slot: Some(TargetSlot::Email),
                default_next: Some(Stage::Complete),
            },
            Stage::Complete | Stage::ThankYou | Stage::Error => FlowEntry {
                question: None,
                slot: None,
                default_next: None,
            },
        }
    }

    /// Suggested answer options for UI affordances
    pub fn options(&self) -> Option<Vec<String>> {
        let options: &[&str] = match self {
            Stage::Greeting => &["Yes", "No"],
            Stage::InterestCheck => &["Yes", "No"],
            Stage::Location => &["Noida", "Mumbai", "Delhi", "Bangalore", "Pune"],
            Stage::PropertyCategory => &["Residential", "Commercial"],
            Stage::Bedroom => &["1 BHK", "2 BHK", "3 BHK", "4 BHK"],
            Stage::VerifyRequirements => &["Yes", "No, let me correct"],
            Stage::SearchComplete => &["Yes, call me", "No thanks"],
            _ => return None,
        };
        Some(options.iter().map(|s| s.to_string()).collect())
    }

    /// What the stage expects the caller to say, phrased for the
    /// interpretation prompt
    pub fn expected_answer(&self) -> &'static str {
        match self {
            Stage::Greeting | Stage::InterestCheck | Stage::VerifyRequirements
            | Stage::SearchComplete => "yes or no",
            Stage::Location => {
                "Indian city name (e.g., Noida, Mumbai, Delhi, Bangalore, Pune, Gurugram, Lucknow)"
            }
            Stage::PropertyCategory => "Residential or Commercial",
            Stage::PropertyType => "property type (like Apartment, Villa, Plot, Office Space)",
            Stage::Bedroom => "number of bedrooms (like 1 BHK, 2 BHK, 3 BHK, 4 BHK)",
            Stage::AskName => "person's name",
            Stage::Budget => "budget amount (like 50 Lakhs, 1 Crore)",
            Stage::PhoneConfirm => "email address",
            Stage::Complete | Stage::ThankYou | Stage::Error => "anything",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STAGES: &[Stage] = &[
        Stage::Greeting,
        Stage::InterestCheck,
        Stage::Location,
        Stage::PropertyCategory,
        Stage::PropertyType,
        Stage::Bedroom,
        Stage::VerifyRequirements,
        Stage::SearchComplete,
        Stage::AskName,
        Stage::Budget,
        Stage::PhoneConfirm,
        Stage::Complete,
        Stage::ThankYou,
        Stage::Error,
    ];

    #[test]
    fn terminal_stages_have_no_next() {
        for stage in ALL_STAGES {
            if stage.is_terminal() {
                assert!(stage.entry().default_next.is_none(), "{stage}");
                assert!(stage.entry().slot.is_none(), "{stage}");
            }
        }
    }

    #[test]
    fn default_chain_reaches_a_terminal() {
        // Following default_next from greeting must terminate
        let mut stage = Stage::Greeting;
        for _ in 0..ALL_STAGES.len() {
            match stage.entry().default_next {
                Some(next) => stage = next,
                None => break,
            }
        }
        // search_complete branches dynamically; the chain parks there
        assert!(stage.is_terminal() || stage == Stage::SearchComplete);
    }

    #[test]
    fn early_collection_set() {
        assert!(Stage::Location.is_early_collection());
        assert!(Stage::Bedroom.is_early_collection());
        assert!(!Stage::Greeting.is_early_collection());
        assert!(!Stage::Budget.is_early_collection());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Stage::VerifyRequirements).unwrap();
        assert_eq!(json, "\"verify_requirements\"");
        let back: Stage = serde_json::from_str("\"interest_check\"").unwrap();
        assert_eq!(back, Stage::InterestCheck);
    }
}
