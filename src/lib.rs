//! LinkPulse lead lifecycle core.
//!
//! Leads come in through [`import`], are scored and drafted by the
//! [`pipeline`] against an [`gateway::AiGateway`], signed off in [`approval`],
//! and counted by [`stats`]. The [`store`] owns every lead and persists the
//! full list to a [`storage`] slot after each change.

pub mod approval;
pub mod error;
pub mod gateway;
pub mod import;
pub mod pipeline;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{ErrorReport, PipelineError};
pub use pipeline::Qualifier;
pub use state::AppState;
pub use store::LeadStore;
pub use types::{Config, Lead, LeadStatus, OutreachStats};
