//! In-memory store for completed analyses
//!
//! Stands in for the persistence collaborator: the terminal progress
//! entry hands out an identifier that resolves here. Identifiers are
//! assigned sequentially per process.

use crate::models::MatchAnalysis;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<HashMap<i64, MatchAnalysis>>>,
    next_id: Arc<AtomicI64>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a completed analysis, returning its identifier
    pub fn insert(&self, analysis: MatchAnalysis) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, analysis);
        id
    }

    pub fn get(&self, id: i64) -> Option<MatchAnalysis> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}
