use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayConfig;

/// Default score a lead must exceed before outreach is drafted.
///
/// Earlier dashboards used 40 and 50; 60 is what the current one ships with.
pub const DEFAULT_OUTREACH_THRESHOLD: f64 = 60.0;

/// How many leads the assistant sees when answering chat questions.
pub const DEFAULT_CHAT_CONTEXT_LIMIT: usize = 10;

/// Configuration stored in ~/.linkpulse/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Score a lead must strictly exceed to be drafted and sent for approval.
    #[serde(default = "default_outreach_threshold")]
    pub outreach_threshold: f64,
    #[serde(default = "default_chat_context_limit")]
    pub chat_context_limit: usize,
    /// Directory holding the persisted lead slot. Defaults to ~/.linkpulse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_outreach_threshold() -> f64 {
    DEFAULT_OUTREACH_THRESHOLD
}

fn default_chat_context_limit() -> usize {
    DEFAULT_CHAT_CONTEXT_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            outreach_threshold: default_outreach_threshold(),
            chat_context_limit: default_chat_context_limit(),
            data_dir: None,
            gateway: GatewayConfig::default(),
        }
    }
}

/// Where a lead sits in the qualification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Qualifying,
    WaitingApproval,
    Disqualified,
    Sent,
    Replied,
}

impl LeadStatus {
    /// Wire name, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Qualifying => "QUALIFYING",
            LeadStatus::WaitingApproval => "WAITING_APPROVAL",
            LeadStatus::Disqualified => "DISQUALIFIED",
            LeadStatus::Sent => "SENT",
            LeadStatus::Replied => "REPLIED",
        }
    }

    /// Human label for status badges ("WAITING APPROVAL").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical engagement signal returned by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentLevel {
    Low,
    Medium,
    High,
}

impl IntentLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(IntentLevel::Low),
            "Medium" => Some(IntentLevel::Medium),
            "High" => Some(IntentLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for IntentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentLevel::Low => "Low",
            IntentLevel::Medium => "Medium",
            IntentLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// One tracked prospect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub headline: String,
    pub company: String,
    pub location: String,
    pub profile_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_post: Option<String>,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_level: Option<IntentLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Apply a patch in place. See [`LeadPatch`] for field semantics.
    pub fn apply(&mut self, patch: LeadPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(assessment) = patch.assessment {
            self.score = Some(assessment.score);
            self.ai_reasoning = Some(assessment.reasoning);
            self.intent_level = Some(assessment.intent);
            self.generated_message = patch.generated_message;
        }
    }
}

/// Validated result of a scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadAssessment {
    pub score: f64,
    pub reasoning: String,
    pub intent: IntentLevel,
}

/// Partial update for [`crate::store::LeadStore::update_by_id`].
///
/// Score, reasoning and intent travel together as one assessment. Applying an
/// assessment also replaces the drafted message, clearing it when the patch
/// carries none, so the message always belongs to the latest score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPatch {
    pub status: Option<LeadStatus>,
    pub assessment: Option<LeadAssessment>,
    pub generated_message: Option<String>,
}

impl LeadPatch {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Dashboard counters, always derived from the current lead list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachStats {
    pub total_leads: usize,
    pub qualified: usize,
    pub pending_approval: usize,
    pub sent: usize,
    pub replied: usize,
}

/// Share of scored leads per intent level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentBreakdown {
    pub scored: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub high_pct: u8,
    pub medium_pct: u8,
    pub low_pct: u8,
}

/// Coarse score bucket shown next to each lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score > 70.0 {
            ScoreBand::Strong
        } else if score > 40.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}
