//! Pasted prospect lists into lead records.
//!
//! One record per line, comma-separated `name, company, headline, recentPost`.
//! The recent post is the remainder of the line, so it may contain commas.

use chrono::Utc;
use uuid::Uuid;

use crate::store::LeadStore;
use crate::types::{Lead, LeadStatus};

pub const DEFAULT_NAME: &str = "Anonymous";
pub const DEFAULT_COMPANY: &str = "Unknown";
pub const DEFAULT_HEADLINE: &str = "Professional";
pub const DEFAULT_LOCATION: &str = "Remote";
pub const DEFAULT_PROFILE_URL: &str = "#";

const FIELD_COUNT: usize = 4;

/// Parse raw text into fresh `NEW` leads. Blank and all-empty lines are
/// skipped; nothing here fails the batch.
pub fn parse(raw: &str) -> Vec<Lead> {
    raw.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Lead> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.splitn(FIELD_COUNT, ',').map(str::trim).collect();
    if fields.iter().all(|f| f.is_empty()) {
        log::debug!("Import: skipped empty record '{}'", line);
        return None;
    }

    let field = |idx: usize| fields.get(idx).copied().filter(|f| !f.is_empty());

    Some(Lead {
        id: format!("lead-{}", Uuid::new_v4()),
        name: field(0).unwrap_or(DEFAULT_NAME).to_string(),
        company: field(1).unwrap_or(DEFAULT_COMPANY).to_string(),
        headline: field(2).unwrap_or(DEFAULT_HEADLINE).to_string(),
        recent_post: field(3).map(str::to_string),
        location: DEFAULT_LOCATION.to_string(),
        profile_url: DEFAULT_PROFILE_URL.to_string(),
        status: LeadStatus::New,
        score: None,
        ai_reasoning: None,
        intent_level: None,
        generated_message: None,
        created_at: Utc::now(),
    })
}

/// Parse and append to the store. Returns the leads that were inserted,
/// which excludes any whose id the store already held.
pub fn import(store: &LeadStore, raw: &str) -> Vec<Lead> {
    let leads = parse(raw);
    let parsed = leads.len();
    let inserted = store.append(leads);
    log::info!("Import: {} leads parsed, {} inserted", parsed, inserted.len());
    inserted
}
