//! Lead sink implementations
//!
//! The dialogue hands a flat [`LeadRecord`] to a sink when a session
//! closes. The JSON-lines sink is the default durable store; the memory
//! sink backs tests.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use lead_agent_core::{Error, LeadRecord, LeadSink, Result};

/// Appends one JSON object per lead to a file
pub struct JsonlLeadSink {
    path: PathBuf,
    // Serializes appends so concurrent session closings interleave whole
    // lines, never partial ones
    write_lock: Mutex<()>,
}

impl JsonlLeadSink {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Sink(format!("creating {}: {e}", parent.display())))?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl LeadSink for JsonlLeadSink {
    async fn record(&self, lead: &LeadRecord) -> Result<()> {
        let line = serde_json::to_string(lead)?;
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Sink(format!("opening {}: {e}", self.path.display())))?;
        writeln!(file, "{line}").map_err(|e| Error::Sink(e.to_string()))?;
        tracing::info!(
            session_id = %lead.session_id,
            qualified = lead.decision.is_qualified(),
            "lead recorded"
        );
        Ok(())
    }
}

/// In-memory sink for tests
#[derive(Default)]
pub struct MemoryLeadSink {
    records: Mutex<Vec<LeadRecord>>,
}

impl MemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LeadRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl LeadSink for MemoryLeadSink {
    async fn record(&self, lead: &LeadRecord) -> Result<()> {
        self.records.lock().push(lead.clone());
        Ok(())
    }
}
