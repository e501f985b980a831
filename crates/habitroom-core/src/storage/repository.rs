//! Persistence seam for the habit store.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::habit::Habit;
use crate::history::CompletionHistory;

/// Everything the habit store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub history: CompletionHistory,
}

/// Load/save capability the habit store depends on.
pub trait HabitRepository {
    /// Load the last saved snapshot, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<StoreSnapshot>;

    /// Persist a full snapshot.
    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<()>;
}

/// Repository that keeps the snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    snapshot: StoreSnapshot,
    saves: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self { snapshot, saves: 0 }
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl HabitRepository for MemoryRepository {
    fn load(&self) -> Result<StoreSnapshot> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<()> {
        self.snapshot = snapshot.clone();
        self.saves += 1;
        Ok(())
    }
}

impl<R: HabitRepository + ?Sized> HabitRepository for Box<R> {
    fn load(&self) -> Result<StoreSnapshot> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}
