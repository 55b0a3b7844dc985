//! Staging of record fields before they reach the store.

use casebook_rs_registry::{PersonRecord, RecordStore, RegistryError, person_label};
use log::debug;
use tokio::task::JoinHandle;

/// Rejected staging input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
    /// Infection answers are `1` (yes) or `0` (no).
    #[error("invalid infection answer: {0} (expected 0 or 1)")]
    InvalidChoice(i64),
}

/// Result of committing a draft.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Record stored; the background upsert is running.
    Added {
        record: PersonRecord,
        upsert: JoinHandle<()>,
    },
    /// A record with the same name already exists; nothing changed.
    Duplicate(PersonRecord),
}

impl CommitOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// Field values collected for one person.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    name: String,
    condition: String,
    infected: bool,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_condition(&mut self, condition: impl Into<String>) {
        self.condition = condition.into();
    }

    /// Apply an infection answer: `1` marks infected, `0` leaves the flag alone.
    pub fn set_infected_choice(&mut self, choice: i64) -> Result<(), DraftError> {
        match choice {
            1 => {
                self.infected = true;
                Ok(())
            }
            0 => Ok(()),
            other => Err(DraftError::InvalidChoice(other)),
        }
    }

    /// Label of the staged person, as rendered by [`PersonRecord::describe`].
    pub fn name(&self) -> String {
        person_label(&self.name)
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    /// Build the record, add it to `store`, and push it remotely if accepted.
    ///
    /// Fails only when no fresh identifier is left.
    pub fn commit(self, store: &mut RecordStore) -> Result<CommitOutcome, RegistryError> {
        let record = PersonRecord::create(self.name, self.condition, self.infected)?;
        if !store.add_record(record.clone()) {
            debug!("draft rejected as duplicate (id={})", record.id());
            return Ok(CommitOutcome::Duplicate(record));
        }
        let upsert = store.upsert_remote(&record);
        Ok(CommitOutcome::Added { record, upsert })
    }
}
