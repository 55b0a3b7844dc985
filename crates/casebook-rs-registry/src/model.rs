//! Person record model tracked by the registry.

use crate::error::RegistryError;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next identifier handed out by [`PersonRecord::create`].
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Record identifier.
pub type RecordId = u64;

/// Reserved identifier; no record ever carries it, so the sequence can always
/// move past the largest id in use.
const RESERVED_ID: RecordId = RecordId::MAX;

/// Predicate deciding whether two records are the same person.
pub type DedupRule = fn(&PersonRecord, &PersonRecord) -> bool;

/// One tracked person.
///
/// Fields are private: after construction the only permitted change is
/// [`PersonRecord::mark_infected`]. Deserialization goes through
/// [`PersonRecord::restore`], so snapshot and remote payloads are checked the
/// same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "StoredRecord")]
pub struct PersonRecord {
    id: RecordId,
    name: String,
    condition: String,
    infected: bool,
    created_at: NaiveDate,
}

/// Serialized shape of a record before its id is checked.
#[derive(Deserialize)]
struct StoredRecord {
    id: RecordId,
    name: String,
    condition: String,
    infected: bool,
    created_at: NaiveDate,
}

impl TryFrom<StoredRecord> for PersonRecord {
    type Error = RegistryError;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        Self::restore(
            stored.id,
            stored.name,
            stored.condition,
            stored.infected,
            stored.created_at,
        )
    }
}

impl PersonRecord {
    /// Create a record with a fresh identifier and today's date.
    ///
    /// Fails only once the identifier sequence is used up.
    pub fn create(
        name: impl Into<String>,
        condition: impl Into<String>,
        infected: bool,
    ) -> Result<Self, RegistryError> {
        let id = NEXT_ID
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next < RESERVED_ID).then(|| next + 1)
            })
            .map_err(|_| RegistryError::IdsExhausted)?;
        Ok(Self {
            id,
            name: name.into(),
            condition: condition.into(),
            infected,
            created_at: Local::now().date_naive(),
        })
    }

    /// Rebuild a record whose identifier was assigned elsewhere.
    ///
    /// Later calls to [`PersonRecord::create`] never reuse `id`.
    pub fn restore(
        id: RecordId,
        name: impl Into<String>,
        condition: impl Into<String>,
        infected: bool,
        created_at: NaiveDate,
    ) -> Result<Self, RegistryError> {
        if id == RESERVED_ID {
            return Err(RegistryError::InvalidId(id));
        }
        observe_id(id);
        Ok(Self {
            id,
            name: name.into(),
            condition: condition.into(),
            infected,
            created_at,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Freeform condition notes; empty when none were given.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn created_at(&self) -> NaiveDate {
        self.created_at
    }

    /// Flag the person as infected. There is no way back.
    pub fn mark_infected(&mut self) {
        self.infected = true;
    }

    /// Human readable label. Carries the name only.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PersonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&person_label(&self.name))
    }
}

/// Label shown for a person called `name`.
pub fn person_label(name: &str) -> String {
    format!("Name: {name}")
}

/// Default dedup rule: exact, case-sensitive name match.
pub fn same_name(a: &PersonRecord, b: &PersonRecord) -> bool {
    a.name == b.name
}

/// Make sure future identifiers are strictly greater than `id`.
pub(crate) fn observe_id(id: RecordId) {
    NEXT_ID.fetch_max(id.saturating_add(1), Ordering::Relaxed);
}
