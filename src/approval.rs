//! Human sign-off on drafted outreach.

use crate::error::PipelineError;
use crate::store::{LeadStore, TransitionError};
use crate::types::{Lead, LeadPatch, LeadStatus};

/// Leads waiting for a human to approve their drafted message.
pub fn pending(store: &LeadStore) -> Vec<Lead> {
    store.with_status(LeadStatus::WaitingApproval)
}

/// Mark a drafted message as sent. Only `WAITING_APPROVAL` leads qualify;
/// anything else is rejected without touching the store.
pub fn approve(store: &LeadStore, id: &str) -> Result<Lead, PipelineError> {
    match store.transition(
        id,
        &[LeadStatus::WaitingApproval],
        LeadPatch::status(LeadStatus::Sent),
    ) {
        Ok(lead) => {
            log::info!("Approval: {} marked sent", id);
            Ok(lead)
        }
        Err(TransitionError::NotFound) => Err(PipelineError::LeadNotFound(id.to_string())),
        Err(TransitionError::WrongStatus(actual)) => Err(PipelineError::PreconditionViolation {
            id: id.to_string(),
            expected: LeadStatus::WaitingApproval,
            actual,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::{IntentLevel, LeadAssessment};
    use chrono::Utc;
    use std::sync::Arc;

    fn lead(id: &str, status: LeadStatus) -> Lead {
        Lead {
            id: id.to_string(),
            name: "Ada".to_string(),
            headline: "CTO".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            profile_url: "#".to_string(),
            recent_post: None,
            status,
            score: None,
            ai_reasoning: None,
            intent_level: None,
            generated_message: None,
            created_at: Utc::now(),
        }
    }

    fn store_with(leads: Vec<Lead>) -> LeadStore {
        let store = LeadStore::open(Arc::new(MemoryStorage::new()));
        store.append(leads);
        store
    }

    fn drafted(id: &str) -> Lead {
        let mut l = lead(id, LeadStatus::New);
        l.apply(LeadPatch {
            status: Some(LeadStatus::WaitingApproval),
            assessment: Some(LeadAssessment {
                score: 88.0,
                reasoning: "Founder".to_string(),
                intent: IntentLevel::High,
            }),
            generated_message: Some("Hi Ada".to_string()),
        });
        l
    }

    #[test]
    fn test_pending_filters_waiting_approval() {
        let store = store_with(vec![
            lead("a", LeadStatus::New),
            drafted("b"),
            lead("c", LeadStatus::Sent),
        ]);
        let ids: Vec<String> = pending(&store).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_approve_moves_to_sent() {
        let store = store_with(vec![drafted("b")]);
        let lead = approve(&store, "b").unwrap();
        assert_eq!(lead.status, LeadStatus::Sent);
        assert_eq!(lead.generated_message.as_deref(), Some("Hi Ada"));
        assert!(pending(&store).is_empty());
    }

    #[test]
    fn test_approve_twice_second_is_rejected_noop() {
        let store = store_with(vec![drafted("b")]);
        approve(&store, "b").unwrap();
        let after_first = store.all();

        let err = approve(&store, "b").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PreconditionViolation { actual: LeadStatus::Sent, .. }
        ));
        assert_eq!(store.all(), after_first);
    }

    #[test]
    fn test_approve_new_lead_rejected() {
        let store = store_with(vec![lead("a", LeadStatus::New)]);
        let before = store.all();
        assert!(matches!(
            approve(&store, "a"),
            Err(PipelineError::PreconditionViolation { actual: LeadStatus::New, .. })
        ));
        assert_eq!(store.all(), before);
    }

    #[test]
    fn test_approve_unknown_lead() {
        let store = store_with(vec![]);
        assert!(matches!(approve(&store, "nope"), Err(PipelineError::LeadNotFound(_))));
    }
}
