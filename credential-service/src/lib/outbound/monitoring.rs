use std::collections::HashMap;

use crate::config::MonitoringConfig;
use crate::config::StageConfig;
use crate::domain::monitoring::Monitor;
use crate::domain::monitoring::MonitoringEvent;

const DEFAULT_STAGE_KEY: &str = "DEF";

/// Monitoring sink that reports events as structured log lines on the
/// `monitoring` target, tagged with the stage configured for the code
/// namespace.
pub struct TracingMonitor {
    application: String,
    stages: HashMap<String, StageConfig>,
    fallback: StageConfig,
}

impl TracingMonitor {
    pub fn new(config: &MonitoringConfig) -> Self {
        let fallback = config
            .stages
            .get(DEFAULT_STAGE_KEY)
            .cloned()
            .unwrap_or_else(|| StageConfig {
                stage: "unknown".to_string(),
                operation: "unclassified".to_string(),
            });

        Self {
            application: config.application.clone(),
            stages: config.stages.clone(),
            fallback,
        }
    }

    /// Stage entry for a code, falling back to the `DEF` entry.
    pub fn stage_for(&self, event: &MonitoringEvent) -> &StageConfig {
        self.stages.get(event.namespace()).unwrap_or(&self.fallback)
    }
}

impl Monitor for TracingMonitor {
    fn record(&self, event: &MonitoringEvent) {
        let stage = self.stage_for(event);

        tracing::info!(
            target: "monitoring",
            application = %self.application,
            stage = %stage.stage,
            operation = %stage.operation,
            code = event.code,
            kind = %event.kind,
            status = event.http_status.as_u16(),
            request_id = %event.request_id,
            endpoint = %event.endpoint,
            summary = %event.summary,
            "Error recorded"
        );
    }
}
