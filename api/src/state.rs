use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use common::config::Settings;
use common::service::TimerService;
use common::store::TimerStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: TimerService,
    pub store: Arc<dyn TimerStore>,
    pub metrics_handle: PrometheusHandle,
    pub config: Arc<Settings>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(service: TimerService, metrics_handle: PrometheusHandle, config: Settings) -> Self {
        Self {
            store: service.store().clone(),
            service,
            metrics_handle,
            config: Arc::new(config),
        }
    }
}
