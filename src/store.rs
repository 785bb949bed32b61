//! The lead store: the single source of truth for every lead.
//!
//! All mutation goes through the methods here. Each one takes the lock, edits
//! the list, and writes the full collection back to the storage slot before
//! releasing it, so persisted writes land in mutation order. The lock is never
//! held across an `.await`.
//!
//! A failed write leaves the in-memory change in place and marks the store
//! unsaved. The next mutation rewrites the whole slot; [`LeadStore::flush`]
//! retries on demand and reports the error to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::stats;
use crate::storage::{KeyValueStorage, StorageError};
use crate::types::{IntentBreakdown, Lead, LeadPatch, LeadStatus, OutreachStats};

/// Fixed key of the storage slot holding the serialized lead list.
pub const LEADS_STORAGE_KEY: &str = "linkpulse_leads";

/// Why a guarded transition was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    NotFound,
    WrongStatus(LeadStatus),
}

pub struct LeadStore {
    leads: Mutex<Vec<Lead>>,
    storage: Arc<dyn KeyValueStorage>,
    /// Set while the slot lags behind `leads`.
    unsaved: AtomicBool,
}

impl LeadStore {
    /// Rehydrate from the storage slot.
    ///
    /// A missing, unreadable or corrupt slot yields an empty store. The
    /// failure is logged and never reaches the caller.
    ///
    /// No qualification is in flight in a freshly opened store, so leads
    /// persisted as `QUALIFYING` were interrupted mid-call. They go back to
    /// `NEW` and the slot is rewritten.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        let mut leads = load_leads(storage.as_ref());
        let stale = release_interrupted(&mut leads);
        log::info!("LeadStore: loaded {} leads", leads.len());

        let store = Self {
            leads: Mutex::new(leads),
            storage,
            unsaved: AtomicBool::new(false),
        };
        if stale > 0 {
            log::warn!(
                "LeadStore: reset {} interrupted QUALIFYING leads to NEW",
                stale
            );
            let leads = store.leads.lock();
            let _ = store.persist(&leads);
        }
        store
    }

    /// Snapshot of every lead, newest first.
    pub fn all(&self) -> Vec<Lead> {
        self.leads.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Lead> {
        self.leads.lock().iter().find(|l| l.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.leads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.lock().is_empty()
    }

    /// Insert a batch ahead of the existing leads, keeping the batch order.
    ///
    /// Leads whose id is already present (in the store or earlier in the
    /// batch) are skipped. Returns the leads that were inserted.
    pub fn append(&self, batch: Vec<Lead>) -> Vec<Lead> {
        let mut leads = self.leads.lock();
        let mut fresh: Vec<Lead> = Vec::with_capacity(batch.len());
        for lead in batch {
            let taken = leads.iter().chain(fresh.iter()).any(|l| l.id == lead.id);
            if taken {
                log::warn!("LeadStore: skipped duplicate id {}", lead.id);
                continue;
            }
            fresh.push(lead);
        }

        let inserted = fresh.clone();
        if !inserted.is_empty() {
            fresh.extend(leads.drain(..));
            *leads = fresh;
            let _ = self.persist(&leads);
        }
        inserted
    }

    /// Patch a lead in place. Unknown ids are a no-op; returns whether a lead
    /// was updated.
    pub fn update_by_id(&self, id: &str, patch: LeadPatch) -> bool {
        let mut leads = self.leads.lock();
        let Some(lead) = leads.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        lead.apply(patch);
        let _ = self.persist(&leads);
        true
    }

    /// Patch a lead only if its status is one of `allowed_from`.
    ///
    /// The status check and the write happen under one lock acquisition, so a
    /// concurrent caller either sees the lead before or after the patch, never
    /// in between. Returns the patched lead.
    pub fn transition(
        &self,
        id: &str,
        allowed_from: &[LeadStatus],
        patch: LeadPatch,
    ) -> Result<Lead, TransitionError> {
        let mut leads = self.leads.lock();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(TransitionError::NotFound)?;
        if !allowed_from.contains(&lead.status) {
            return Err(TransitionError::WrongStatus(lead.status));
        }
        lead.apply(patch);
        let updated = lead.clone();
        let _ = self.persist(&leads);
        Ok(updated)
    }

    /// Delete a lead. Returns whether it existed.
    pub fn remove_by_id(&self, id: &str) -> bool {
        let mut leads = self.leads.lock();
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return false;
        }
        let _ = self.persist(&leads);
        true
    }

    /// Drop every lead.
    pub fn clear(&self) {
        let mut leads = self.leads.lock();
        leads.clear();
        let _ = self.persist(&leads);
    }

    /// Leads with the given status, in store order.
    pub fn with_status(&self, status: LeadStatus) -> Vec<Lead> {
        self.leads
            .lock()
            .iter()
            .filter(|l| l.status == status)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> OutreachStats {
        stats::compute(&self.leads.lock())
    }

    pub fn intent_breakdown(&self) -> IntentBreakdown {
        stats::intent_breakdown(&self.leads.lock())
    }

    /// True when the last slot write failed and nothing has rewritten it since.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.load(Ordering::SeqCst)
    }

    /// Rewrite the slot if an earlier write failed. Callers that exit after a
    /// mutation use this to learn whether the change reached storage.
    pub fn flush(&self) -> Result<(), StorageError> {
        let leads = self.leads.lock();
        if !self.has_unsaved_changes() {
            return Ok(());
        }
        self.persist(&leads)
    }

    /// Write the full collection to the slot. Callers hold the lock.
    fn persist(&self, leads: &[Lead]) -> Result<(), StorageError> {
        let result = serde_json::to_string(leads)
            .map_err(StorageError::from)
            .and_then(|content| self.storage.write(LEADS_STORAGE_KEY, &content));
        match &result {
            Ok(()) => self.unsaved.store(false, Ordering::SeqCst),
            Err(e) => {
                self.unsaved.store(true, Ordering::SeqCst);
                log::warn!("LeadStore: failed to persist leads: {}", e);
            }
        }
        result
    }
}

/// Put leads stranded in `QUALIFYING` back to `NEW`. Returns how many moved.
fn release_interrupted(leads: &mut [Lead]) -> usize {
    let mut released = 0;
    for lead in leads
        .iter_mut()
        .filter(|l| l.status == LeadStatus::Qualifying)
    {
        lead.status = LeadStatus::New;
        released += 1;
    }
    released
}

fn load_leads(storage: &dyn KeyValueStorage) -> Vec<Lead> {
    let content = match storage.read(LEADS_STORAGE_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("LeadStore: failed to read persisted leads: {}", e);
            return Vec::new();
        }
    };

    let leads: Vec<Lead> = match serde_json::from_str(&content) {
        Ok(leads) => leads,
        Err(e) => {
            log::warn!("LeadStore: persisted leads are corrupt, starting empty: {}", e);
            return Vec::new();
        }
    };

    let mut unique: Vec<Lead> = Vec::with_capacity(leads.len());
    for lead in leads {
        if unique.iter().any(|l| l.id == lead.id) {
            log::warn!("LeadStore: dropped duplicate persisted id {}", lead.id);
            continue;
        }
        unique.push(lead);
    }
    unique
}
