use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use linkpulse_lib::gateway::{self, AiGateway, GatewayError, GenerateRequest, RequestKind};
use linkpulse_lib::storage::MemoryStorage;
use linkpulse_lib::types::IntentLevel;
use linkpulse_lib::{approval, import, AppState, Config, ErrorReport, LeadStatus, PipelineError};

/// High score for founders, low for everyone else. Fails drafting for Initech.
#[derive(Default)]
struct FakeGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl AiGateway for FakeGateway {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match request.kind {
            RequestKind::Score if request.prompt.contains("Founder") => Ok(
                r#"{"score": 85, "reasoning": "Founder posting about hiring", "intent": "High"}"#
                    .to_string(),
            ),
            RequestKind::Score => {
                Ok(r#"{"score": 35, "reasoning": "Weak fit", "intent": "Medium"}"#.to_string())
            }
            RequestKind::Draft if request.prompt.contains("Initech") => {
                Err(GatewayError::Network("connection reset".to_string()))
            }
            RequestKind::Draft => Ok("Loved your post on hiring. Worth a chat?".to_string()),
            RequestKind::Chat => Ok(String::new()),
        }
    }
}

fn app(gateway: Arc<FakeGateway>) -> AppState {
    AppState::with_parts(Config::default(), Arc::new(MemoryStorage::new()), gateway)
}

#[tokio::test]
async fn test_import_qualify_approve() {
    let gateway = Arc::new(FakeGateway::default());
    let app = app(gateway.clone());

    let leads = import::import(
        &app.store,
        "Grace, Hopper Labs, Founder, We are hiring, again\n\nLinus, Kernel Co, Maintainer",
    );
    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].recent_post.as_deref(), Some("We are hiring, again"));

    let grace = app.qualifier.qualify(&leads[0].id).await.unwrap();
    assert_eq!(grace.status, LeadStatus::WaitingApproval);
    assert_eq!(grace.intent_level, Some(IntentLevel::High));
    assert!(grace.generated_message.is_some());

    let linus = app.qualifier.qualify(&leads[1].id).await.unwrap();
    assert_eq!(linus.status, LeadStatus::Disqualified);
    assert!(linus.generated_message.is_none());

    // score + draft for Grace, score only for Linus
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);

    let sent = approval::approve(&app.store, &grace.id).unwrap();
    assert_eq!(sent.status, LeadStatus::Sent);

    let stats = app.store.stats();
    assert_eq!(stats.total_leads, 2);
    assert_eq!(stats.qualified, 1);
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.pending_approval, 0);
}

#[tokio::test]
async fn test_drafting_failure_reports_retryable_error() {
    let app = app(Arc::new(FakeGateway::default()));
    let leads = import::import(&app.store, "Peter, Initech, Founder");
    let id = &leads[0].id;

    let err = app.qualifier.qualify(id).await.unwrap_err();
    assert!(matches!(err, PipelineError::Gateway(GatewayError::Network(_))));

    let report = ErrorReport::from(&err);
    assert!(report.can_retry);

    let lead = app.store.get(id).unwrap();
    assert_eq!(lead.status, LeadStatus::New);
    assert!(lead.score.is_none());
}

#[tokio::test]
async fn test_qualify_unknown_lead() {
    let app = app(Arc::new(FakeGateway::default()));
    assert!(matches!(
        app.qualifier.qualify("lead-missing").await,
        Err(PipelineError::LeadNotFound(_))
    ));
}

#[tokio::test]
async fn test_chat_falls_back_on_empty_reply() {
    let app = app(Arc::new(FakeGateway::default()));
    let reply = gateway::chat_with_assistant(
        app.gateway.as_ref(),
        "Who should I call first?",
        &app.store.all(),
        app.config.chat_context_limit,
    )
    .await;
    assert_eq!(reply, gateway::CHAT_FALLBACK_REPLY);
}
