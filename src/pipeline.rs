//! Turns a batch of alerts into ServiceNow incidents.
//!
//! Alerts are processed one after another in the order alertmanager sent them. The first
//! incident that can't be created aborts the batch: incidents created before stay, the
//! remaining alerts are not attempted.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    alert::AlertBatch,
    incident::Ticket,
    servicenow::{TicketClient, TicketError},
    telemetry_endpoint::Metrics,
};

/// creating the incident for the alert at `index` failed
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineError {
    /// position of the failed alert in the batch
    pub index: usize,
    #[source]
    pub error: TicketError,
}

#[derive(Clone)]
pub struct IncidentPipeline {
    client: Arc<dyn TicketClient>,
    metrics: Arc<Metrics>,
}

impl IncidentPipeline {
    pub fn new(client: Arc<dyn TicketClient>, metrics: Arc<Metrics>) -> Self {
        Self { client, metrics }
    }

    /// Create one incident per alert of the batch.
    ///
    /// Returns the error of the first incident creation that failed.
    pub async fn process_batch(&self, batch: &AlertBatch) -> Result<(), PipelineError> {
        tracing::info!(
            "Alerts: Status={}, GroupLabels={:?}, CommonLabels={:?}",
            batch.status,
            batch.group_labels,
            batch.common_labels
        );

        self.metrics
            .alerts_received
            .inc_by(batch.alerts.len() as u64);

        for (index, alert) in batch.alerts.iter().enumerate() {
            let ticket = Ticket::from_alert(alert);

            let result = {
                let _timer = self.metrics.incident_request_duration.start_timer();
                self.client.create_ticket(&ticket).await
            };

            match result {
                Ok(receipt) => {
                    self.metrics.incidents_created.inc();
                    tracing::debug!(
                        number = ?receipt.number,
                        sys_id = ?receipt.sys_id,
                        "created incident for alert {}",
                        index
                    );
                }
                Err(error) => {
                    self.metrics.incidents_failed.inc();
                    tracing::error!(
                        skipped = batch.alerts.len() - index - 1,
                        "error while creating incident for alert {}: {}",
                        index,
                        error
                    );
                    return Err(PipelineError { index, error });
                }
            }
        }

        Ok(())
    }
}
