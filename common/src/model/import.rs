use serde::{Deserialize, Serialize};

/// The entity kinds an import touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Interruption,
    Notice,
    Customer,
    Activity,
    Personnel,
    Area,
    Barangay,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Interruption => "interruption",
            EntityKind::Notice => "notice",
            EntityKind::Customer => "customer",
            EntityKind::Activity => "activity",
            EntityKind::Personnel => "personnel",
            EntityKind::Area => "area",
            EntityKind::Barangay => "barangay",
        }
    }
}

/// What happened to one row while reconciling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
}

impl EntityCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
    }

    fn absorb(&mut self, other: &EntityCounts) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

/// Classification of a failed import entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Conflict,
    TransientStorage,
    Storage,
}

/// One top-level entry that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFailure {
    /// Position of the entry in the submitted document.
    pub index: usize,
    /// Natural key of the entry, as far as it could be read.
    pub date: Option<String>,
    pub area: Option<String>,
    /// Entity kind at which the failure was detected.
    pub entity: EntityKind,
    pub kind: FailureKind,
    pub reason: String,
}

/// Per-kind counters for one import, or for one entry of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub interruptions: EntityCounts,
    pub notices: EntityCounts,
    pub customers: EntityCounts,
    pub activities: EntityCounts,
    pub personnel: EntityCounts,
    pub areas: EntityCounts,
    pub barangays: EntityCounts,
}

impl KindCounts {
    pub fn get_mut(&mut self, kind: EntityKind) -> &mut EntityCounts {
        match kind {
            EntityKind::Interruption => &mut self.interruptions,
            EntityKind::Notice => &mut self.notices,
            EntityKind::Customer => &mut self.customers,
            EntityKind::Activity => &mut self.activities,
            EntityKind::Personnel => &mut self.personnel,
            EntityKind::Area => &mut self.areas,
            EntityKind::Barangay => &mut self.barangays,
        }
    }

    pub fn absorb(&mut self, other: &KindCounts) {
        self.interruptions.absorb(&other.interruptions);
        self.notices.absorb(&other.notices);
        self.customers.absorb(&other.customers);
        self.activities.absorb(&other.activities);
        self.personnel.absorb(&other.personnel);
        self.areas.absorb(&other.areas);
        self.barangays.absorb(&other.barangays);
    }
}

/// Summary returned by every import, including partially failed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub import_id: String,
    pub entries: usize,
    pub counts: KindCounts,
    pub failures: Vec<EntryFailure>,
}

impl ImportReport {
    pub fn new(import_id: String) -> Self {
        Self {
            import_id,
            entries: 0,
            counts: KindCounts::default(),
            failures: Vec::new(),
        }
    }

    pub fn committed(&self) -> usize {
        self.entries - self.failures.len()
    }
}
