use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use super::{ServiceNowSettings, TicketClient, TicketError, TicketReceipt};
use crate::incident::Ticket;

/// path of the incident table relative to the instance url
const INCIDENT_TABLE: &str = "api/now/table/incident";

#[derive(Debug, Deserialize)]
struct TableResponse {
    result: TicketReceipt,
}

#[derive(Debug, Clone)]
/// Client for the table api of a ServiceNow instance, authenticated via basic auth.
///
/// Cheap to clone and safe to share between concurrently running requests.
pub struct ServiceNowClient {
    client: reqwest::Client,
    endpoint: Url,
    user_name: String,
    password: String,
}

impl ServiceNowClient {
    pub fn new(settings: &ServiceNowSettings) -> Result<Self, TicketError> {
        let base_url = match &settings.base_url {
            Some(url) => url.clone(),
            None => {
                let instance = settings.instance_name.trim();
                if instance.is_empty() {
                    return Err(TicketError::InvalidConfig(
                        "instance name is empty".to_owned(),
                    ));
                }

                let url = format!("https://{}.service-now.com/", instance);
                Url::parse(&url).map_err(|err| {
                    TicketError::InvalidConfig(format!("instance name {:?}: {}", instance, err))
                })?
            }
        };

        Self::with_base_url(base_url, &settings.user_name, &settings.password)
    }

    pub fn with_base_url(
        base_url: Url,
        user_name: &str,
        password: &str,
    ) -> Result<Self, TicketError> {
        if user_name.is_empty() {
            return Err(TicketError::InvalidConfig("user name is empty".to_owned()));
        }

        if base_url.cannot_be_a_base() {
            return Err(TicketError::InvalidConfig(format!(
                "{} can't be used as base url",
                base_url
            )));
        }

        let endpoint = base_url
            .join(INCIDENT_TABLE)
            .map_err(|err| TicketError::InvalidConfig(err.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            user_name: user_name.to_owned(),
            password: password.to_owned(),
        })
    }

    /// url incidents are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TicketClient for ServiceNowClient {
    async fn create_ticket(&self, ticket: &Ticket) -> Result<TicketReceipt, TicketError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.user_name, Some(&self.password))
            .header(ACCEPT, "application/json")
            .json(ticket)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TicketError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // the incident exists at this point, an odd answer body is not worth failing the alert
        let receipt = match serde_json::from_str::<TableResponse>(&body) {
            Ok(TableResponse { result }) => result,
            Err(err) => {
                tracing::debug!("unexpected ServiceNow response body: {}", err);
                TicketReceipt::default()
            }
        };

        Ok(receipt)
    }
}
