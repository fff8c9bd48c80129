use credit_assess::assessment::AssessmentService;
use credit_assess::config::AppConfig;
use credit_assess::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the service from configured policy limits and scorecard. Registry defects are fatal.
pub(crate) fn build_service(config: &AppConfig) -> Result<AssessmentService, AppError> {
    let scorecard = config.scorecard()?;
    if let Some(path) = &config.scorecard_path {
        info!(path = %path.display(), "using custom scorecard");
    }

    let service = AssessmentService::with_scorecard(&config.policy, scorecard)?;
    Ok(service)
}
