//! Prompt text for the scoring, drafting and chat contracts.

use serde_json::{json, Value};

use crate::types::Lead;

const NO_ACTIVITY: &str = "No recent activity available";

fn activity(lead: &Lead) -> &str {
    lead.recent_post
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(NO_ACTIVITY)
}

/// Ask for a 0-100 score with a short justification and an intent level.
pub fn scoring_prompt(lead: &Lead) -> String {
    format!(
        "ROLE: Senior Sales Intelligence Architect.\n\
         OBJECTIVE: Qualify this LinkedIn lead based on potential ROI and conversion probability.\n\
         CONTEXT: High-end B2B SaaS target. Look for authority roles (Director+), scaling indicators, or relevant industry pain points.\n\
         DATA:\n\
         Name: {name}\n\
         Headline: {headline}\n\
         Company: {company}\n\
         Activity: {activity}\n\
         \n\
         TASK: Provide a JSON response with:\n\
         - score (0-100)\n\
         - reasoning (1-2 sentences why this score was given)\n\
         - intent (Low, Medium, High)",
        name = lead.name,
        headline = lead.headline,
        company = lead.company,
        activity = activity(lead),
    )
}

/// Response schema in the Gemini `responseSchema` dialect.
pub fn scoring_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "reasoning": { "type": "STRING" },
            "intent": { "type": "STRING", "enum": ["Low", "Medium", "High"] }
        },
        "required": ["score", "reasoning", "intent"]
    })
}

/// Ask for a short, non-salesy connection message.
pub fn outreach_prompt(lead: &Lead) -> String {
    format!(
        "ROLE: Relationship Builder (Anti-Spam expert).\n\
         OBJECTIVE: Write a non-salesy, personalized LinkedIn message.\n\
         RULES: Max 3 sentences. No fluff. No \"I hope you are well\". Focus on a specific observation from their headline or post.\n\
         DATA: {name} at {company}. Bio: {headline}. Recent Activity: {activity}\n\
         GOAL: Spark curiosity or a low-friction question.",
        name = lead.name,
        company = lead.company,
        headline = lead.headline,
        activity = activity(lead),
    )
}

/// One line per lead: name, company, score, status.
pub fn lead_summary(leads: &[Lead], limit: usize) -> String {
    if leads.is_empty() {
        return "No leads currently in the database.".to_string();
    }
    leads
        .iter()
        .take(limit)
        .map(|l| {
            let score = l
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Unscored".to_string());
            format!("- {} ({}): Score {}, Status {}", l.name, l.company, score, l.status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn chat_prompt(message: &str, leads: &[Lead], limit: usize) -> String {
    format!(
        "ROLE: LinkPulse Sales Strategist & Outreach Coach.\n\
         CONTEXT: You are assisting a user managing their LinkedIn lead pipeline. You have access to their top {limit} leads:\n\
         {summary}\n\
         \n\
         USER MESSAGE: {message}\n\
         \n\
         TASK: Answer the user's question with actionable sales advice. Be professional, concise, and encourage best practices. If they ask about specific leads, use the context provided.",
        limit = limit,
        summary = lead_summary(leads, limit),
        message = message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeadStatus;
    use chrono::Utc;

    fn lead(name: &str, score: Option<f64>) -> Lead {
        Lead {
            id: format!("lead-{}", name),
            name: name.to_string(),
            headline: "CTO".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            profile_url: "#".to_string(),
            recent_post: None,
            status: if score.is_some() { LeadStatus::WaitingApproval } else { LeadStatus::New },
            score,
            ai_reasoning: None,
            intent_level: None,
            generated_message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_scoring_prompt_marks_missing_activity() {
        let prompt = scoring_prompt(&lead("Ada", None));
        assert!(prompt.contains("Name: Ada"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains(NO_ACTIVITY));
    }

    #[test]
    fn test_outreach_prompt_includes_post() {
        let mut l = lead("Ada", None);
        l.recent_post = Some("We just closed our Series B".to_string());
        let prompt = outreach_prompt(&l);
        assert!(prompt.contains("Recent Activity: We just closed our Series B"));
        assert!(prompt.contains("Ada at Acme"));
    }

    #[test]
    fn test_lead_summary_limits_and_formats() {
        let leads: Vec<Lead> = (0..12).map(|i| lead(&format!("P{}", i), Some(80.0))).collect();
        let summary = lead_summary(&leads, 10);
        assert_eq!(summary.lines().count(), 10);
        assert!(summary.starts_with("- P0 (Acme): Score 80, Status WAITING_APPROVAL"));

        let unscored = lead_summary(&[lead("Q", None)], 10);
        assert_eq!(unscored, "- Q (Acme): Score Unscored, Status NEW");
    }

    #[test]
    fn test_lead_summary_empty() {
        assert_eq!(lead_summary(&[], 10), "No leads currently in the database.");
    }
}
