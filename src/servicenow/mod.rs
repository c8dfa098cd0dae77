//! Creating incidents in ServiceNow.
//!
//! The [IncidentPipeline](crate::pipeline::IncidentPipeline) only knows the [TicketClient]
//! capability, [ServiceNowClient] implements it on top of the table REST api.

mod client;
mod settings;

use async_trait::async_trait;
pub use client::ServiceNowClient;
use serde::Deserialize;
pub use settings::ServiceNowSettings;
use thiserror::Error;

use crate::incident::Ticket;

/// Errors returned by a [TicketClient].
#[derive(Debug, Error)]
pub enum TicketError {
    /// the settings can't be turned into a usable client
    #[error("invalid ServiceNow configuration: {0}")]
    InvalidConfig(String),

    /// the request didn't make it to ServiceNow or the answer couldn't be read
    #[error("request to ServiceNow failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// ServiceNow rejected the incident
    #[error("ServiceNow returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// identifiers ServiceNow assigned to a created incident
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketReceipt {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub sys_id: Option<String>,
}

/// Anything able to open an incident.
#[async_trait]
pub trait TicketClient: Send + Sync {
    /// Submit one incident, a single round trip without retries.
    async fn create_ticket(&self, ticket: &Ticket) -> Result<TicketReceipt, TicketError>;
}
