//! Dialogue manager
//!
//! One [`DialogueManager::process_turn`] call per user utterance: looks up
//! the session, serializes the turn on the session's own mutex, applies
//! the rich-input shortcut when the utterance is information-dense, and
//! otherwise dispatches on the current stage. Collaborators (matcher, LLM
//! adapter, searcher, lead sink) are injected; the manager owns no I/O of
//! its own.

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use lead_agent_config::DialogueConfig;
use lead_agent_core::{
    BudgetValue, ChannelMode, LeadRecord, LeadSink, PropertyCategory, SlotValue,
};
use lead_agent_llm::{ExtractedRequirements, ExtractionAdapter};
use lead_agent_nlu::{
    clean_name, extract_email,
    matchers::{title_case, DOMAIN_KEYWORDS},
    parse_budget, SlotMatcher,
};
use lead_agent_search::{PropertySearcher, SearchQuery};

use crate::flow::Stage;
use crate::qualification::evaluate;
use crate::response::DialogueResponse;
use crate::session::{Session, SessionStore};

/// Orchestrates one qualification conversation per session id.
pub struct DialogueManager {
    matcher: SlotMatcher,
    extraction: Option<Arc<ExtractionAdapter>>,
    searcher: Arc<dyn PropertySearcher>,
    sink: Option<Arc<dyn LeadSink>>,
    store: SessionStore,
    config: DialogueConfig,
}

impl DialogueManager {
    pub fn new(config: DialogueConfig, searcher: Arc<dyn PropertySearcher>) -> Self {
        Self {
            matcher: SlotMatcher::new(),
            extraction: None,
            searcher,
            sink: None,
            store: SessionStore::new(),
            config,
        }
    }

    /// Attach the LLM extraction adapter. Without one the engine still
    /// runs; unclear answers go straight to the retry ladder.
    pub fn with_extraction(mut self, adapter: Arc<ExtractionAdapter>) -> Self {
        self.extraction = Some(adapter);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LeadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Pre-create a session on a specific channel. Sessions created
    /// implicitly by [`Self::process_turn`] default to voice.
    pub fn open_session(&self, session_id: &str, channel: ChannelMode) {
        self.store.get_or_create(session_id, channel);
    }

    /// Process one user utterance and produce the next system response.
    ///
    /// Turns for the same session id run strictly one at a time; turns
    /// for different sessions run concurrently.
    pub async fn process_turn(
        &self,
        session_id: &str,
        utterance: &str,
        known_name: Option<&str>,
        known_phone: Option<&str>,
    ) -> DialogueResponse {
        let handle = self.store.get_or_create(session_id, ChannelMode::Voice);
        let mut session = handle.lock().await;

        if session.turn_count == 0 {
            seed_known_contact(&mut session, known_name, known_phone);
        }
        session.turn_count += 1;
        let utterance = utterance.trim();
        session.push_user_turn(utterance);
        tracing::info!(
            session_id,
            stage = %session.stage,
            turn = session.turn_count,
            "processing turn"
        );

        let response = self.run_turn(&mut session, utterance).await;

        session.push_assistant_turn(&response.speech);
        session.advance(response.next_stage);
        if response.is_complete {
            let already_closed = session.completed;
            session.completed = true;
            if !already_closed && response.next_stage != Stage::Error {
                self.finalize(&session).await;
            }
        }
        tracing::debug!(
            session_id,
            next_stage = %response.next_stage,
            confidence = response.confidence,
            "turn handled"
        );
        response
    }

    async fn run_turn(&self, session: &mut Session, utterance: &str) -> DialogueResponse {
        if session.stage.is_early_collection() && self.is_rich_input(utterance) {
            if let Some(adapter) = &self.extraction {
                let extracted = adapter.extract_requirements(utterance).await;
                if extracted.filled_count() >= self.config.rich_input_min_slots {
                    self.merge_extracted(session, &extracted);
                    let summary = session.data.requirements_summary();
                    tracing::info!(
                        filled = extracted.filled_count(),
                        "information-dense input, skipping to verification"
                    );
                    return DialogueResponse::ask(
                        format!(
                            "Got it! So you're looking for {summary}. Did I get that right?"
                        ),
                        Stage::VerifyRequirements,
                        0.85,
                    )
                    .with_options(Stage::VerifyRequirements.options());
                }
            }
        }

        match session.stage {
            Stage::Greeting => self.handle_greeting(session, utterance),
            Stage::InterestCheck => self.handle_interest_check(session, utterance),
            Stage::Location => self.handle_location(session, utterance).await,
            Stage::PropertyCategory => self.handle_category(session, utterance),
            Stage::PropertyType => self.handle_property_type(session, utterance).await,
            Stage::Bedroom => self.handle_bedroom(session, utterance).await,
            Stage::VerifyRequirements => self.handle_verify(session, utterance).await,
            Stage::SearchComplete => self.handle_search_complete(session, utterance),
            Stage::AskName => self.handle_ask_name(session, utterance),
            Stage::Budget => self.handle_budget(session, utterance),
            Stage::PhoneConfirm => self.handle_phone_confirm(session, utterance),
            Stage::Complete | Stage::ThankYou => self.handle_closed(session),
            Stage::Error => self.error_response(session),
        }
    }

    /// Word count or keyword density marks an utterance as carrying more
    /// than the single answer the current stage asked for.
    fn is_rich_input(&self, utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        if lower.unicode_words().count() > self.config.rich_input_word_count {
            return true;
        }
        let hits = DOMAIN_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(**kw))
            .count();
        hits >= self.config.rich_input_keyword_hits
    }

    /// Fold LLM-extracted free-text fields into typed slots, running each
    /// through the deterministic matcher first.
    fn merge_extracted(&self, session: &mut Session, extracted: &ExtractedRequirements) {
        let turn = session.turn_count;

        if let Some(text) = &extracted.property_category {
            if let (Some(category), conf) = self.matcher.match_category(text) {
                session.data.category = Some(SlotValue::new(category, conf, turn));
            }
        }

        if let Some(text) = &extracted.location {
            match self.matcher.match_city(text) {
                (Some(city), conf) => {
                    session.data.location = Some(SlotValue::new(city, conf, turn));
                }
                _ => {
                    // Unknown city; keep it verbatim rather than lose it
                    session.data.location =
                        Some(SlotValue::new(title_case(text), 0.7, turn));
                }
            }
        }

        let category = session
            .data
            .category
            .as_ref()
            .map(|c| c.value)
            .unwrap_or(PropertyCategory::Residential);
        if let Some(text) = &extracted.property_type {
            if let (Some(ptype), conf) = self.matcher.match_property_type(text, category) {
                session.data.property_type = Some(SlotValue::new(ptype, conf, turn));
            }
        }

        if let Some(text) = &extracted.bedroom {
            match self.matcher.match_bedroom(text) {
                (Some(bedroom), conf) => {
                    session.data.bedroom = Some(SlotValue::new(bedroom, conf, turn));
                }
                _ => {
                    session.data.bedroom = Some(SlotValue::new(text.clone(), 0.6, turn));
                }
            }
        }

        if let Some(text) = &extracted.budget {
            let (min, max) = parse_budget(text);
            session.data.budget = Some(SlotValue::new(
                BudgetValue {
                    raw: text.clone(),
                    min,
                    max,
                },
                0.85,
                turn,
            ));
        }

        if let Some(text) = &extracted.name {
            let cleaned = clean_name(text);
            if !cleaned.is_empty() {
                session.data.name = Some(SlotValue::new(cleaned, 0.85, turn));
                session.name_confirmed = true;
            }
        }
        // timeline and purpose have no qualification slot; dropped here
    }

    fn handle_greeting(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        if session.awaiting_name {
            let cleaned = clean_name(speech);
            if cleaned.len() > 1 {
                session.data.name = Some(SlotValue::new(cleaned, 0.9, session.turn_count));
                session.awaiting_name = false;
                session.name_confirmed = true;
                session.introduced = true;
                return DialogueResponse::ask(
                    format!(
                        "Nice to speak with you, {}! I'm calling from RealtyAssistant \
                         about property requirements. Are you currently interested in \
                         purchasing or renting a property?",
                        session.display_name()
                    ),
                    Stage::InterestCheck,
                    0.9,
                )
                .with_options(Stage::InterestCheck.options());
            }
            session.retry_count += 1;
            if session.retry_count > self.config.max_retries_per_stage {
                // Proceed without a usable name
                session.awaiting_name = false;
                session.name_confirmed = true;
                return self.introduction(session, 0.5);
            }
            return DialogueResponse::ask(
                "Sorry, I didn't catch that. May I know your name, please?",
                Stage::Greeting,
                0.5,
            );
        }

        let (consent, confidence) = self.matcher.match_consent(speech);
        match consent {
            Some(true) => {
                session.name_confirmed = true;
                if !session.introduced {
                    self.introduction(session, confidence)
                } else {
                    DialogueResponse::ask(
                        "Great! Which city are you looking for property in?",
                        Stage::Location,
                        confidence,
                    )
                    .with_options(Stage::Location.options())
                }
            }
            Some(false) => {
                session.awaiting_name = true;
                DialogueResponse::ask(
                    "Oh, my apologies! May I know who I'm speaking with?",
                    Stage::Greeting,
                    0.8,
                )
            }
            None => {
                let lower = speech.to_lowercase();
                let words: Vec<&str> = lower.unicode_words().collect();
                let greeted = ["hello", "hi", "hey"].iter().any(|g| words.contains(g))
                    || ["good morning", "good afternoon", "good evening"]
                        .iter()
                        .any(|g| lower.contains(g));
                if speech.len() > 2 && !greeted {
                    // Substantive reply; assume we have the right person
                    session.name_confirmed = true;
                    return self.introduction(session, 0.6);
                }
                session.retry_count += 1;
                if session.retry_count > self.config.max_retries_per_stage {
                    session.name_confirmed = true;
                    return self.introduction(session, 0.5);
                }
                DialogueResponse::ask(
                    format!(
                        "Hello! This is RealtyAssistant calling. Am I speaking with {}?",
                        session.display_name()
                    ),
                    Stage::Greeting,
                    0.5,
                )
                .with_options(Stage::Greeting.options())
            }
        }
    }

    fn introduction(&self, session: &mut Session, confidence: f32) -> DialogueResponse {
        session.introduced = true;
        DialogueResponse::ask(
            "Great! I'm calling from RealtyAssistant. We help people find their \
             perfect property. Are you currently interested in purchasing or renting \
             a property?",
            Stage::InterestCheck,
            confidence,
        )
        .with_options(Stage::InterestCheck.options())
    }

    fn handle_interest_check(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let (consent, confidence) = self.matcher.match_consent(speech);
        match consent {
            Some(true) => DialogueResponse::ask(
                "Wonderful! Which city are you looking for property in?",
                Stage::Location,
                confidence,
            )
            .with_options(Stage::Location.options()),
            Some(false) => DialogueResponse::closing(
                "No problem at all. Thank you for your time, and feel free to reach \
                 out whenever you start looking. Have a great day!",
                Stage::ThankYou,
                session.data.clone(),
                confidence,
            ),
            None => {
                let lower = speech.to_lowercase();
                let interested = [
                    "looking", "want", "need", "interested", "search", "buy",
                    "purchase", "rent",
                ]
                .iter()
                .any(|kw| lower.contains(kw));
                if interested {
                    return DialogueResponse::ask(
                        "Wonderful! Which city are you looking for property in?",
                        Stage::Location,
                        0.7,
                    )
                    .with_options(Stage::Location.options());
                }

                // Callers often answer a question ahead of the script
                if let (Some(city), city_conf) = self.matcher.match_city(speech) {
                    session.data.location =
                        Some(SlotValue::new(city.clone(), city_conf, session.turn_count));
                    return DialogueResponse::ask(
                        format!(
                            "Got it, {city}! Are you looking for a Residential or \
                             Commercial property?"
                        ),
                        Stage::PropertyCategory,
                        city_conf,
                    )
                    .with_options(Stage::PropertyCategory.options());
                }

                session.retry_count += 1;
                if session.retry_count > self.config.max_retries_per_stage {
                    return DialogueResponse::ask(
                        "Let me help you explore what's available. Which city are you \
                         looking for property in?",
                        Stage::Location,
                        0.5,
                    )
                    .with_options(Stage::Location.options());
                }
                DialogueResponse::ask(
                    "Just to confirm, are you currently interested in purchasing or \
                     renting a property?",
                    Stage::InterestCheck,
                    0.3,
                )
                .with_options(Stage::InterestCheck.options())
            }
        }
    }

    async fn handle_location(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        if let (Some(city), conf) = self.matcher.match_city(speech) {
            session.data.location = Some(SlotValue::new(city, conf, session.turn_count));
            return self.category_question(conf);
        }

        // Deterministic miss; let the LLM reword before burning a retry
        if let Some(adapter) = &self.extraction {
            if let Some(interpreted) = adapter
                .interpret_unclear(speech, Stage::Location.expected_answer())
                .await
            {
                if let (Some(city), conf) = self.matcher.match_city(&interpreted) {
                    tracing::debug!(%interpreted, city, "location recovered via interpretation");
                    session.data.location =
                        Some(SlotValue::new(city, conf.min(0.8), session.turn_count));
                    return self.category_question(conf.min(0.8));
                }
            }
        }

        session.retry_count += 1;
        if session.retry_count > self.config.max_retries_per_stage {
            // Accept the caller's words verbatim rather than stall
            let verbatim = title_case(speech);
            let value = if verbatim.is_empty() {
                "Not Specified".to_string()
            } else {
                verbatim
            };
            session.data.location = Some(SlotValue::new(value, 0.5, session.turn_count));
            return self.category_question(0.5);
        }
        DialogueResponse::ask(
            "Sorry, which city was that? For example Noida, Mumbai, Delhi, \
             Bangalore, or Pune.",
            Stage::Location,
            0.3,
        )
        .with_options(Stage::Location.options())
    }

    fn category_question(&self, confidence: f32) -> DialogueResponse {
        DialogueResponse::ask(
            "Got it! Are you looking for a Residential or Commercial property?",
            Stage::PropertyCategory,
            confidence,
        )
        .with_options(Stage::PropertyCategory.options())
    }

    fn handle_category(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        if let (Some(category), conf) = self.matcher.match_category(speech) {
            session.data.category = Some(SlotValue::new(category, conf, session.turn_count));
            return self.property_type_question(category, conf);
        }

        session.retry_count += 1;
        if session.retry_count > self.config.max_retries_per_stage {
            let category = PropertyCategory::Residential;
            session.data.category = Some(SlotValue::new(category, 0.5, session.turn_count));
            return self.property_type_question(category, 0.5);
        }
        DialogueResponse::ask(
            "Are you looking for a Residential or Commercial property?",
            Stage::PropertyCategory,
            0.3,
        )
        .with_options(Stage::PropertyCategory.options())
    }

    fn property_type_question(
        &self,
        category: PropertyCategory,
        confidence: f32,
    ) -> DialogueResponse {
        let question = match category {
            PropertyCategory::Residential => {
                "And what type of property? An apartment, villa, plot, or builder floor?"
            }
            PropertyCategory::Commercial => {
                "And what type of commercial property? Office space, shop, showroom, \
                 or warehouse?"
            }
        };
        DialogueResponse::ask(question, Stage::PropertyType, confidence)
    }

    async fn handle_property_type(
        &self,
        session: &mut Session,
        speech: &str,
    ) -> DialogueResponse {
        let category = session
            .data
            .category
            .as_ref()
            .map(|c| c.value)
            .unwrap_or(PropertyCategory::Residential);
        let (ptype, conf) = self.matcher.match_property_type(speech, category);
        if let Some(ptype) = ptype {
            session.data.property_type =
                Some(SlotValue::new(ptype, conf, session.turn_count));
        }

        if category == PropertyCategory::Commercial {
            // Commercial has no bedroom stage; search right away
            let summary = self.perform_search(session).await;
            return DialogueResponse::ask(
                format!(
                    "{summary} Would you like our property expert to call you with \
                     personalized recommendations?"
                ),
                Stage::SearchComplete,
                conf,
            )
            .with_options(Stage::SearchComplete.options());
        }

        DialogueResponse::ask(
            "How many bedrooms do you need? 1 BHK, 2 BHK, 3 BHK, or 4 BHK?",
            Stage::Bedroom,
            conf,
        )
        .with_options(Stage::Bedroom.options())
    }

    async fn handle_bedroom(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let (mut bedroom, mut conf) = self.matcher.match_bedroom(speech);

        if bedroom.is_none() {
            if let Some(adapter) = &self.extraction {
                if let Some(interpreted) = adapter
                    .interpret_unclear(speech, Stage::Bedroom.expected_answer())
                    .await
                {
                    if let (Some(matched), _) = self.matcher.match_bedroom(&interpreted) {
                        bedroom = Some(matched);
                        conf = 0.7;
                    }
                }
            }
        }

        let (bedroom, conf) = match bedroom {
            Some(bedroom) => (bedroom, conf),
            None => {
                session.retry_count += 1;
                if session.retry_count <= self.config.max_retries_per_stage {
                    return DialogueResponse::ask(
                        "How many bedrooms are you looking for? For example 1 BHK, \
                         2 BHK, or 3 BHK.",
                        Stage::Bedroom,
                        0.3,
                    )
                    .with_options(Stage::Bedroom.options());
                }
                ("2 BHK".to_string(), 0.5)
            }
        };
        session.data.bedroom = Some(SlotValue::new(bedroom, conf, session.turn_count));

        let summary = self.perform_search(session).await;
        DialogueResponse::ask(
            format!(
                "{summary} Would you like our property expert to call you with \
                 personalized recommendations?"
            ),
            Stage::SearchComplete,
            conf,
        )
        .with_options(Stage::SearchComplete.options())
    }

    async fn handle_verify(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let (consent, _) = self.matcher.match_consent(speech);
        if consent == Some(false) {
            return DialogueResponse::ask(
                "No problem! Let's go over it again. Which city are you looking for \
                 property in?",
                Stage::Location,
                0.8,
            )
            .with_options(Stage::Location.options());
        }

        // Explicit yes and an unclear answer both proceed
        let prefix = if consent == Some(true) {
            "Perfect! "
        } else {
            "I'll proceed with that. "
        };
        let confidence = if consent == Some(true) { 0.9 } else { 0.6 };
        let summary = self.perform_search(session).await;
        DialogueResponse::ask(
            format!(
                "{prefix}{summary} Would you like our property expert to call you \
                 with personalized recommendations?"
            ),
            Stage::SearchComplete,
            confidence,
        )
        .with_options(Stage::SearchComplete.options())
    }

    fn handle_search_complete(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let (consent, confidence) = self.matcher.match_consent(speech);
        match consent {
            Some(true) => {
                session.data.consent =
                    Some(SlotValue::new(true, confidence, session.turn_count));
                self.route_after_consent(session, "Excellent! ", confidence)
            }
            Some(false) => {
                session.data.consent =
                    Some(SlotValue::new(false, confidence, session.turn_count));
                DialogueResponse::closing(
                    "That's completely fine. You can always find us at RealtyAssistant \
                     when you're ready. Thank you for your time, and have a great day!",
                    Stage::ThankYou,
                    session.data.clone(),
                    confidence,
                )
            }
            None => {
                let lower = speech.to_lowercase();
                let wants_info = ["more", "detail", "tell me", "about", "which", "what"]
                    .iter()
                    .any(|kw| lower.contains(kw));
                if wants_info && session.retry_count < self.config.max_retries_per_stage {
                    session.retry_count += 1;
                    let location = session
                        .data
                        .location
                        .as_ref()
                        .map(|s| s.value.clone())
                        .unwrap_or_else(|| "your area".to_string());
                    return DialogueResponse::ask(
                        format!(
                            "These are properties matching your requirements in \
                             {location}. Our expert can share full details on pricing, \
                             amenities, and site visits. Would you like a call back?"
                        ),
                        Stage::SearchComplete,
                        0.6,
                    )
                    .with_options(Stage::SearchComplete.options());
                }
                // Unclear answers default to arranging the callback
                session.data.consent = Some(SlotValue::new(true, 0.5, session.turn_count));
                self.route_after_consent(session, "Alright, I'll arrange that. ", 0.5)
            }
        }
    }

    fn route_after_consent(
        &self,
        session: &Session,
        prefix: &str,
        confidence: f32,
    ) -> DialogueResponse {
        if !session.has_real_name() {
            DialogueResponse::ask(
                format!(
                    "{prefix}By the way, may I know your good name so our expert \
                     knows who to ask for?"
                ),
                Stage::AskName,
                confidence,
            )
        } else if session.data.budget_parsed() {
            // Budget already captured up front; don't ask again
            self.phone_confirm_question(session, prefix, confidence)
        } else {
            DialogueResponse::ask(
                format!("{prefix}What's your budget range for this property?"),
                Stage::Budget,
                confidence,
            )
        }
    }

    fn phone_confirm_question(
        &self,
        session: &Session,
        prefix: &str,
        confidence: f32,
    ) -> DialogueResponse {
        DialogueResponse::ask(
            format!(
                "{prefix}I'll have an expert call you at {}. Can you also share your \
                 email for property alerts?",
                session.display_phone()
            ),
            Stage::PhoneConfirm,
            confidence,
        )
    }

    fn handle_ask_name(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let cleaned = clean_name(speech);
        if cleaned.len() > 1 {
            session.data.name = Some(SlotValue::new(cleaned, 0.9, session.turn_count));
            session.name_confirmed = true;
            let thanks = format!("Thank you, {}! ", session.display_name());
            if session.data.budget_parsed() {
                return self.phone_confirm_question(session, &thanks, 0.9);
            }
            return DialogueResponse::ask(
                format!("{thanks}What's your budget range for this property?"),
                Stage::Budget,
                0.9,
            );
        }

        session.retry_count += 1;
        if session.retry_count > self.config.max_retries_per_stage {
            if session.data.budget_parsed() {
                return self.phone_confirm_question(session, "No worries. ", 0.5);
            }
            return DialogueResponse::ask(
                "No worries. What's your budget range for this property?",
                Stage::Budget,
                0.5,
            );
        }
        DialogueResponse::ask(
            "Sorry, could you repeat your name for me?",
            Stage::AskName,
            0.4,
        )
    }

    fn handle_budget(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let (min, max) = parse_budget(speech);
        let parsed = min.is_some() && max.is_some();
        session.data.budget = Some(SlotValue::new(
            BudgetValue {
                raw: speech.to_string(),
                min,
                max,
            },
            if parsed { 0.9 } else { 0.6 },
            session.turn_count,
        ));

        let acknowledgment = if parsed {
            format!("Great, noted a budget of {speech}. ")
        } else {
            "Noted. ".to_string()
        };
        DialogueResponse::ask(
            format!(
                "{acknowledgment}I'll have an expert call you at {}. Can you also \
                 share your email for property alerts?",
                session.display_phone()
            ),
            Stage::PhoneConfirm,
            0.8,
        )
    }

    fn handle_phone_confirm(&self, session: &mut Session, speech: &str) -> DialogueResponse {
        let email_ack = match extract_email(speech) {
            Some(email) => {
                session.data.email = Some(SlotValue::new(email, 0.9, session.turn_count));
                "Got it, I've noted your email. "
            }
            None => "",
        };
        DialogueResponse::closing(
            format!(
                "{email_ack}You're all set, {}! Our property expert will call you at \
                 {} shortly. Thank you for choosing RealtyAssistant. Have a \
                 wonderful day!",
                session.display_name(),
                session.display_phone()
            ),
            Stage::Complete,
            session.data.clone(),
            0.95,
        )
    }

    fn handle_closed(&self, session: &Session) -> DialogueResponse {
        let stage = session.stage;
        DialogueResponse::closing(
            "This conversation is wrapped up. Our expert will be in touch. Goodbye!",
            stage,
            session.data.clone(),
            1.0,
        )
    }

    fn error_response(&self, session: &Session) -> DialogueResponse {
        DialogueResponse {
            speech: "I apologize, I'm having trouble understanding. Let me transfer \
                     you to a human agent. Please hold."
                .to_string(),
            next_stage: Stage::Error,
            options: None,
            is_complete: true,
            data: Some(session.data.clone()),
            confidence: 0.0,
            needs_human: true,
        }
    }

    /// Run the property search once per session and phrase the result.
    async fn perform_search(&self, session: &mut Session) -> String {
        let location = session
            .data
            .location
            .as_ref()
            .map(|s| s.value.clone())
            .unwrap_or_else(|| "your area".to_string());
        let query = SearchQuery {
            location: location.clone(),
            category: session
                .data
                .category
                .as_ref()
                .map(|c| c.value)
                .unwrap_or(PropertyCategory::Residential),
            property_type: session.data.property_type.as_ref().map(|s| s.value.clone()),
            bedroom: session.data.bedroom.as_ref().map(|s| s.value.clone()),
        };
        let outcome = self.searcher.search(&query).await;
        tracing::info!(
            count = outcome.count,
            success = outcome.success,
            url = %outcome.source_url,
            "property search finished"
        );
        session.search_count = Some(if outcome.success { outcome.count } else { 0 });
        session.search_titles = outcome
            .top_results
            .iter()
            .take(2)
            .map(|hit| hit.title.clone())
            .collect();

        if outcome.success && outcome.count > 0 {
            let mut message = format!(
                "I found {} properties in {} matching your criteria.",
                outcome.count, location
            );
            if !session.search_titles.is_empty() {
                message.push_str(&format!(
                    " The top ones are {}.",
                    session.search_titles.join(", ")
                ));
            }
            message
        } else {
            format!(
                "I couldn't find exact matches in {location} right now, but our \
                 experts have access to many more listings."
            )
        }
    }

    /// Evaluate qualification and hand the flat record to the sink.
    async fn finalize(&self, session: &Session) {
        let decision = evaluate(&session.data, session.search_count.unwrap_or(0));
        tracing::info!(
            session_id = %session.id,
            status = ?decision.status,
            summary = %decision.summary,
            "session finalized"
        );
        if let Some(sink) = &self.sink {
            let record = LeadRecord {
                session_id: session.id.clone(),
                channel: session.channel,
                data: session.data.clone(),
                search_count: session.search_count.unwrap_or(0),
                decision,
                transcript: session.turns.clone(),
                created_at: chrono::Utc::now(),
            };
            if let Err(error) = sink.record(&record).await {
                tracing::warn!(%error, "failed to persist lead record");
            }
        }
    }
}

fn seed_known_contact(session: &mut Session, name: Option<&str>, phone: Option<&str>) {
    if let Some(name) = name {
        let cleaned = clean_name(name);
        if !cleaned.is_empty() && cleaned.to_lowercase() != "customer" {
            session.data.name = Some(SlotValue::new(cleaned, 0.9, 0));
            session.name_confirmed = true;
        }
    }
    if let Some(phone) = phone {
        let phone = phone.trim();
        if !phone.is_empty() {
            session.phone = Some(phone.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_agent_search::FixedSearcher;

    fn manager() -> DialogueManager {
        DialogueManager::new(
            DialogueConfig::default(),
            Arc::new(FixedSearcher::with_count(12)),
        )
    }

    #[test]
    fn rich_input_detection() {
        let m = manager();
        assert!(m.is_rich_input(
            "I am looking for a 2 BHK apartment in Noida with a budget of 50 lakhs"
        ));
        // Two domain keywords even in a short utterance
        assert!(m.is_rich_input("2 bhk flat"));
        assert!(!m.is_rich_input("yes"));
        assert!(!m.is_rich_input("Noida"));
    }

    #[tokio::test]
    async fn greeting_yes_introduces_and_moves_to_interest() {
        let m = manager();
        let response = m.process_turn("g1", "yes", Some("Asha"), None).await;
        assert_eq!(response.next_stage, Stage::InterestCheck);
        assert!(response.speech.contains("RealtyAssistant"));
        assert!(!response.is_complete);
    }

    #[tokio::test]
    async fn greeting_wrong_person_captures_name() {
        let m = manager();
        let first = m.process_turn("g2", "no", None, None).await;
        assert_eq!(first.next_stage, Stage::Greeting);
        assert!(first.speech.contains("who"));

        let second = m.process_turn("g2", "this is Rohan", None, None).await;
        assert_eq!(second.next_stage, Stage::InterestCheck);
        assert!(second.speech.contains("Rohan"));

        let session = m.store().get("g2").unwrap();
        let session = session.lock().await;
        assert_eq!(session.data.name.as_ref().unwrap().value, "Rohan");
        assert!(session.has_real_name());
    }

    #[tokio::test]
    async fn interest_decline_ends_with_thank_you() {
        let m = manager();
        m.process_turn("d1", "yes", None, None).await;
        let response = m.process_turn("d1", "no thanks", None, None).await;
        assert_eq!(response.next_stage, Stage::ThankYou);
        assert!(response.is_complete);
        assert!(response.data.is_some());
    }

    #[tokio::test]
    async fn interest_check_accepts_a_city_answered_ahead() {
        let m = manager();
        m.process_turn("a1", "yes", None, None).await;
        let response = m.process_turn("a1", "Noida", None, None).await;
        assert_eq!(response.next_stage, Stage::PropertyCategory);

        let session = m.store().get("a1").unwrap();
        assert_eq!(
            session.lock().await.data.location.as_ref().unwrap().value,
            "Noida"
        );
    }

    #[tokio::test]
    async fn category_retries_then_defaults_to_residential() {
        let m = manager();
        m.process_turn("c1", "yes", None, None).await;
        m.process_turn("c1", "yes", None, None).await;
        m.process_turn("c1", "Pune", None, None).await;

        // Two unmatched answers re-ask, the third exhausts the budget
        let r1 = m.process_turn("c1", "umm", None, None).await;
        assert_eq!(r1.next_stage, Stage::PropertyCategory);
        let r2 = m.process_turn("c1", "umm", None, None).await;
        assert_eq!(r2.next_stage, Stage::PropertyCategory);
        let r3 = m.process_turn("c1", "umm", None, None).await;
        assert_eq!(r3.next_stage, Stage::PropertyType);

        let session = m.store().get("c1").unwrap();
        assert_eq!(
            session.lock().await.data.category.as_ref().unwrap().value,
            PropertyCategory::Residential
        );
    }

    #[tokio::test]
    async fn commercial_branch_skips_bedrooms() {
        let m = manager();
        m.process_turn("b1", "yes", None, None).await;
        m.process_turn("b1", "yes, looking to buy", None, None).await;
        m.process_turn("b1", "Gurgaon", None, None).await;
        m.process_turn("b1", "commercial", None, None).await;
        let response = m.process_turn("b1", "office space", None, None).await;
        assert_eq!(response.next_stage, Stage::SearchComplete);
        assert!(response.speech.contains("12 properties"));

        let session = m.store().get("b1").unwrap();
        let session = session.lock().await;
        assert_eq!(
            session.data.property_type.as_ref().unwrap().value,
            "Office Space"
        );
        assert!(session.data.bedroom.is_none());
    }

    #[tokio::test]
    async fn error_stage_escalates_to_human() {
        let m = manager();
        m.open_session("e1", ChannelMode::Chat);
        {
            let session = m.store().get("e1").unwrap();
            session.lock().await.stage = Stage::Error;
        }
        let response = m.process_turn("e1", "hello?", None, None).await;
        assert!(response.needs_human);
        assert!(response.is_complete);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.next_stage, Stage::Error);
    }
}
