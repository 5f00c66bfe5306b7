//! Conversational lead-qualification engine
//!
//! Drives a scripted buyer-qualification dialogue through a fixed set of
//! stages, filling typed slots (city, category, subtype, bedrooms,
//! consent, budget, contact) from each utterance with deterministic
//! matching first and an optional LLM assist for unclear answers. When
//! enough is collected it runs one property search, asks for callback
//! consent, and closes with a deterministic qualification decision handed
//! to a lead sink.
//!
//! The [`DialogueManager`] is the single entry point; everything it needs
//! (searcher, LLM adapter, lead sink, configuration) is injected.

pub mod flow;
pub mod manager;
pub mod qualification;
pub mod records;
pub mod response;
pub mod session;

pub use flow::{FlowEntry, Stage, TargetSlot};
pub use manager::DialogueManager;
pub use qualification::{evaluate, evaluate_consent_only};
pub use records::{JsonlLeadSink, MemoryLeadSink};
pub use response::DialogueResponse;
pub use session::{Session, SessionStore};
