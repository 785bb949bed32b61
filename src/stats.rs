//! Dashboard counters derived from the lead list.
//!
//! Nothing here is stored. Callers recompute after every change.

use crate::types::{IntentBreakdown, IntentLevel, Lead, LeadStatus, OutreachStats};

/// Score a lead must exceed to count as "AI qualified" on the dashboard.
/// Independent of the outreach threshold.
pub const QUALIFIED_SCORE: f64 = 70.0;

pub fn compute(leads: &[Lead]) -> OutreachStats {
    let count = |status: LeadStatus| leads.iter().filter(|l| l.status == status).count();

    OutreachStats {
        total_leads: leads.len(),
        qualified: leads
            .iter()
            .filter(|l| l.score.is_some_and(|s| s > QUALIFIED_SCORE))
            .count(),
        pending_approval: count(LeadStatus::WaitingApproval),
        sent: count(LeadStatus::Sent),
        replied: count(LeadStatus::Replied),
    }
}

/// Count scored leads per intent level. Percentages are rounded shares of
/// the scored total, all zero when nothing is scored.
pub fn intent_breakdown(leads: &[Lead]) -> IntentBreakdown {
    let mut breakdown = IntentBreakdown::default();
    for intent in leads.iter().filter_map(|l| l.intent_level) {
        breakdown.scored += 1;
        match intent {
            IntentLevel::High => breakdown.high += 1,
            IntentLevel::Medium => breakdown.medium += 1,
            IntentLevel::Low => breakdown.low += 1,
        }
    }

    if breakdown.scored > 0 {
        let pct = |n: usize| ((n as f64 / breakdown.scored as f64) * 100.0).round() as u8;
        breakdown.high_pct = pct(breakdown.high);
        breakdown.medium_pct = pct(breakdown.medium);
        breakdown.low_pct = pct(breakdown.low);
    }
    breakdown
}
