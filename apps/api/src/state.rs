use std::sync::Arc;

use crate::dialogue::orchestrator::DialogueOrchestrator;
use crate::dialogue::sessions::SessionRegistry;
use crate::job_search::JobSearchGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// `Config` is consumed during startup and is not carried here.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: DialogueOrchestrator,
    /// One isolated conversation context per session id.
    pub sessions: SessionRegistry,
    /// Also used directly by the job listing endpoint.
    pub jobs: Arc<dyn JobSearchGateway>,
}
