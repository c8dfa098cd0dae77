//! Here we expose prometheus metrics about the receiver
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{
    exponential_buckets, histogram_opts, opts, Encoder, Histogram, IntCounter, IntCounterVec,
    Registry, TextEncoder,
};

const NAMESPACE: &str = "alertmanager_servicenow";

/// prometheus meters of the webhook receiver and the incident pipeline
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    /// webhook requests by response status code
    pub(crate) requests: IntCounterVec,
    /// alerts contained in decoded batches
    pub(crate) alerts_received: IntCounter,
    pub(crate) incidents_created: IntCounter,
    pub(crate) incidents_failed: IntCounter,
    /// duration of a single incident creation call
    pub(crate) incident_request_duration: Histogram,
}

impl Metrics {
    /// construct meters, registered in a registry owned by this instance
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            opts!("requests_total", "total number of webhook requests")
                .namespace(NAMESPACE)
                .subsystem("webhook"),
            &["code"],
        )?;

        let alerts_received = IntCounter::with_opts(
            opts!(
                "alerts_received_total",
                "total number of deserialized alerts"
            )
            .namespace(NAMESPACE)
            .subsystem("webhook"),
        )?;

        let incidents_created = IntCounter::with_opts(
            opts!("incidents_created_total", "incidents created in ServiceNow")
                .namespace(NAMESPACE),
        )?;

        let incidents_failed = IntCounter::with_opts(
            opts!(
                "incidents_failed_total",
                "incident creation requests that failed"
            )
            .namespace(NAMESPACE),
        )?;

        let incident_request_duration = Histogram::with_opts(
            histogram_opts!(
                "incident_request_duration_seconds",
                "time of an incident creation request in seconds",
                exponential_buckets(0.01, 2., 12)?
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(alerts_received.clone()))?;
        registry.register(Box::new(incidents_created.clone()))?;
        registry.register(Box::new(incidents_failed.clone()))?;
        registry.register(Box::new(incident_request_duration.clone()))?;

        Ok(Self {
            registry,
            requests,
            alerts_received,
            incidents_created,
            incidents_failed,
            incident_request_duration,
        })
    }

    /// counts a webhook response
    pub(crate) fn record_request(&self, status: StatusCode) {
        self.requests.with_label_values(&[status.as_str()]).inc();
    }

    /// text exposition of all meters
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

pub async fn metrics_handler(Extension(metrics): Extension<Arc<Metrics>>) -> Response {
    match metrics.encode() {
        Ok(buffer) => (
            [(CONTENT_TYPE, TextEncoder::new().format_type().to_owned())],
            buffer,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("failed to encode metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_recorded_values() {
        let metrics = Metrics::new().unwrap();

        metrics.record_request(StatusCode::OK);
        metrics.record_request(StatusCode::OK);
        metrics.record_request(StatusCode::BAD_REQUEST);
        metrics.alerts_received.inc_by(3);
        metrics.incidents_failed.inc();

        let text = String::from_utf8(metrics.encode().unwrap()).unwrap();

        assert!(text.contains(r#"alertmanager_servicenow_webhook_requests_total{code="200"} 2"#));
        assert!(text.contains(r#"alertmanager_servicenow_webhook_requests_total{code="400"} 1"#));
        assert!(text.contains("alertmanager_servicenow_webhook_alerts_received_total 3"));
        assert!(text.contains("alertmanager_servicenow_incidents_failed_total 1"));
        assert!(text.contains("alertmanager_servicenow_incidents_created_total 0"));
    }

    #[test]
    fn instances_do_not_share_meters() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.incidents_created.inc();

        assert_eq!(first.incidents_created.get(), 1);
        assert_eq!(second.incidents_created.get(), 0);
    }
}
