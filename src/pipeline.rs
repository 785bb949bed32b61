//! Lead qualification pipeline.
//!
//! `qualify` walks one lead through `NEW → QUALIFYING → WAITING_APPROVAL` (score
//! above threshold, message drafted) or `→ DISQUALIFIED`. The `QUALIFYING`
//! marker is written under the store lock before the first gateway call, so
//! a second `qualify` on the same lead fails its precondition instead of
//! issuing another call. Any gateway failure puts the lead back to `NEW`
//! without writing partial results.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::error::PipelineError;
use crate::gateway::{self, AiGateway, GatewayError};
use crate::store::{LeadStore, TransitionError};
use crate::types::{Lead, LeadPatch, LeadStatus};

#[derive(Clone)]
pub struct Qualifier {
    store: Arc<LeadStore>,
    gateway: Arc<dyn AiGateway>,
    threshold: f64,
}

impl Qualifier {
    /// `threshold` is the score a lead must strictly exceed to get a draft.
    pub fn new(store: Arc<LeadStore>, gateway: Arc<dyn AiGateway>, threshold: f64) -> Self {
        Self {
            store,
            gateway,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score one lead and, if it clears the threshold, draft outreach for it.
    ///
    /// Returns the lead as written back to the store. The lead is left in
    /// `NEW` if either gateway call fails.
    pub async fn qualify(&self, id: &str) -> Result<Lead, PipelineError> {
        let lead = self.mark_qualifying(id)?;
        log::info!("Qualify: {} ({} @ {}) started", id, lead.name, lead.company);

        match self.assess(&lead).await {
            Ok(patch) => self.write_result(id, patch),
            Err(e) => {
                self.roll_back(id, &e);
                Err(e.into())
            }
        }
    }

    /// Qualify every `NEW` lead concurrently. Outcomes arrive in completion
    /// order, one per lead.
    pub async fn qualify_all_new(&self) -> Vec<(String, Result<Lead, PipelineError>)> {
        let ids: Vec<String> = self
            .store
            .with_status(LeadStatus::New)
            .into_iter()
            .map(|l| l.id)
            .collect();

        let mut tasks = JoinSet::new();
        for id in ids {
            let qualifier = self.clone();
            tasks.spawn(async move {
                let result = qualifier.qualify(&id).await;
                (id, result)
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => log::warn!("Qualify: task failed: {}", e),
            }
        }
        outcomes
    }

    fn mark_qualifying(&self, id: &str) -> Result<Lead, PipelineError> {
        self.store
            .transition(
                id,
                &[LeadStatus::New],
                LeadPatch::status(LeadStatus::Qualifying),
            )
            .map_err(|e| match e {
                TransitionError::NotFound => PipelineError::LeadNotFound(id.to_string()),
                TransitionError::WrongStatus(actual) => PipelineError::PreconditionViolation {
                    id: id.to_string(),
                    expected: LeadStatus::New,
                    actual,
                },
            })
    }

    async fn assess(&self, lead: &Lead) -> Result<LeadPatch, GatewayError> {
        let assessment = gateway::score_lead(self.gateway.as_ref(), lead).await?;

        if assessment.score > self.threshold {
            let message = gateway::draft_outreach(self.gateway.as_ref(), lead).await?;
            Ok(LeadPatch {
                status: Some(LeadStatus::WaitingApproval),
                assessment: Some(assessment),
                generated_message: Some(message),
            })
        } else {
            Ok(LeadPatch {
                status: Some(LeadStatus::Disqualified),
                assessment: Some(assessment),
                generated_message: None,
            })
        }
    }

    fn write_result(&self, id: &str, patch: LeadPatch) -> Result<Lead, PipelineError> {
        match self.store.transition(id, &[LeadStatus::Qualifying], patch) {
            Ok(lead) => {
                log::info!(
                    "Qualify: {} scored {} ({}) -> {}",
                    id,
                    lead.score.unwrap_or_default(),
                    lead.intent_level.map(|i| i.to_string()).unwrap_or_default(),
                    lead.status
                );
                Ok(lead)
            }
            Err(TransitionError::NotFound) => {
                log::info!("Qualify: {} was removed while in flight, result dropped", id);
                Err(PipelineError::LeadNotFound(id.to_string()))
            }
            Err(TransitionError::WrongStatus(actual)) => Err(PipelineError::PreconditionViolation {
                id: id.to_string(),
                expected: LeadStatus::Qualifying,
                actual,
            }),
        }
    }

    fn roll_back(&self, id: &str, cause: &GatewayError) {
        match self.store.transition(
            id,
            &[LeadStatus::Qualifying],
            LeadPatch::status(LeadStatus::New),
        ) {
            Ok(_) => log::warn!("Qualify: {} failed, rolled back to NEW: {}", id, cause),
            Err(_) => log::warn!("Qualify: {} failed after removal: {}", id, cause),
        }
    }
}
