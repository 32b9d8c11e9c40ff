//! Append-only record of orchestration turns.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};

/// One orchestration call as seen by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_input: String,
    pub timestamp: DateTime<Utc>,
    /// The router's selection, empty if nothing was selected.
    pub routed_agents: Vec<String>,
    pub confidence_score: f32,
}

impl ConversationTurn {
    pub fn new(user_input: impl Into<String>, routed_agents: Vec<String>, confidence_score: f32) -> Self {
        Self {
            user_input: user_input.into(),
            timestamp: Utc::now(),
            routed_agents,
            confidence_score,
        }
    }
}

/// In-memory ledger owned by one orchestrator.
///
/// Turns are never mutated once appended. Readers get copies.
#[derive(Debug, Default)]
pub struct ConversationLedger {
    turns: Mutex<Vec<ConversationTurn>>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn append(&self, turn: ConversationTurn) -> Result<()> {
        self.lock()?.push(turn);
        Ok(())
    }

    /// Snapshot of every turn, oldest first.
    pub fn all(&self) -> Result<Vec<ConversationTurn>> {
        Ok(self.lock()?.clone())
    }

    /// Number of recorded turns.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Drop every turn.
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ConversationTurn>>> {
        self.turns
            .lock()
            .map_err(|e| OrchestratorError::LockPoisoned(format!("conversation ledger: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_snapshot() {
        let ledger = ConversationLedger::new();
        ledger
            .append(ConversationTurn::new("chest pain", vec!["CardiologistAgent".into()], 0.82))
            .unwrap();
        ledger.append(ConversationTurn::new("hello", vec![], 0.1)).unwrap();

        let turns = ledger.all().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].routed_agents, vec!["CardiologistAgent"]);
        assert!(turns[1].routed_agents.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let ledger = ConversationLedger::new();
        ledger.append(ConversationTurn::new("a", vec![], 0.0)).unwrap();
        let snapshot = ledger.all().unwrap();

        ledger.append(ConversationTurn::new("b", vec![], 0.0)).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_clear() {
        let ledger = ConversationLedger::new();
        ledger.append(ConversationTurn::new("a", vec![], 0.0)).unwrap();
        ledger.clear().unwrap();
        assert!(ledger.is_empty().unwrap());
    }
}
