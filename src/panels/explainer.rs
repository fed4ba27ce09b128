// Data Narrator - edit, commit, explain and clean the working dataset
//
// The draft lives here until committed; only a draft that passes validation
// ever reaches rawCsv.

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::state::StatePatch;
use crate::store::Store;
use crate::validator::{self, ValidationError};

pub const DEFAULT_QUERY: &str =
    "Analyze regional sales performance and identify hidden growth clusters.";
pub const DEFAULT_PERSONA: &str = "Aggressive Strategist";

/// Personas offered for narration
pub const PERSONAS: [&str; 3] = ["Aggressive Strategist", "Skeptical Auditor", "Growth Visionary"];

/// Match `name` against the known personas, ignoring case
pub fn persona(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PERSONAS
        .iter()
        .copied()
        .find(|p| p.eq_ignore_ascii_case(name))
}

const COMMITTED: &str = "Core synchronization complete. Data vectors locked.";
const SCRUBBED: &str = "Neural scrub complete. Data normalized.";
const SCRUB_INCONSISTENT: &str =
    "AI scrub attempted but data remains structurally inconsistent. Manual review required.";
const SCRUB_FAILED: &str = "Neural scrub failed. Check source data formatting.";
const KEY_REQUIRED: &str = "Neural link failure: API Key Required";
const SYNTHESIS_FAILED: &str = "Synthesis error. Ensure data schema integrity.";

#[derive(Debug)]
pub struct DataNarrator {
    /// Draft dataset being edited
    pub input: String,
    pub explanation: String,
    pub error: Option<String>,
    pub success: Option<String>,
    pub status: PanelStatus,
}

impl DataNarrator {
    /// Open with the draft seeded from the committed dataset
    pub fn open(store: &Store) -> Self {
        Self::with_input(store.state().raw_csv.clone())
    }

    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            explanation: String::new(),
            error: None,
            success: None,
            status: PanelStatus::Idle,
        }
    }

    fn reset_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Validate the draft and write it to rawCsv
    ///
    /// An invalid draft leaves the Store untouched.
    pub fn commit(&mut self, store: &mut Store) -> Result<(), ValidationError> {
        self.reset_messages();
        if let Err(e) = validator::validate(&self.input) {
            tracing::info!(line = ?e.line(), "explainer: commit rejected: {}", e);
            self.error = Some(e.to_string());
            return Err(e);
        }

        store.update(StatePatch::default().with_raw_csv(self.input.clone()));
        self.success = Some(COMMITTED.to_string());
        Ok(())
    }

    /// Commit the draft, then narrate it for `persona`
    pub async fn explain(
        &mut self,
        query: &str,
        persona: &str,
        store: &mut Store,
        service: &dyn InsightService,
    ) {
        self.reset_messages();
        if let Err(e) = validator::validate(&self.input) {
            self.error = Some(e.to_string());
            return;
        }
        store.update(StatePatch::default().with_raw_csv(self.input.clone()));

        match settle(
            &mut self.status,
            "explainer",
            service.explain(&self.input, query, persona),
        )
        .await
        {
            Ok(text) => self.explanation = text,
            Err(e) => {
                self.explanation.clear();
                let message = if e.is_missing_credentials() {
                    KEY_REQUIRED
                } else {
                    SYNTHESIS_FAILED
                };
                self.error = Some(message.to_string());
            }
        }
    }

    /// Ask the service to normalize the draft
    ///
    /// The cleaned text replaces the draft either way; it is committed only
    /// if it validates.
    pub async fn clean(&mut self, store: &mut Store, service: &dyn InsightService) {
        self.reset_messages();
        let cleaned = match settle(&mut self.status, "explainer", service.clean(&self.input)).await
        {
            Ok(cleaned) => cleaned,
            Err(_) => {
                self.error = Some(SCRUB_FAILED.to_string());
                return;
            }
        };

        self.input = cleaned;
        match validator::validate(&self.input) {
            Ok(()) => {
                store.update(StatePatch::default().with_raw_csv(self.input.clone()));
                self.success = Some(SCRUBBED.to_string());
            }
            Err(e) => {
                tracing::warn!("explainer: cleaned data still invalid: {}", e);
                self.error = Some(SCRUB_INCONSISTENT.to_string());
            }
        }
    }
}
