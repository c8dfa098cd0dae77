//! prometheus alertmanager receiver that opens ServiceNow incidents
//!
//! Every alert of a webhook notification becomes one incident, created through the
//! ServiceNow table api. The first incident that can't be created fails the whole
//! notification so alertmanager sees the error.

use std::sync::Arc;

use anyhow::{Context, Result};
use servicenow::ServiceNowClient;
use settings::{CommandLine, Settings};

use crate::{pipeline::IncidentPipeline, telemetry_endpoint::Metrics};

mod alert;
mod alertmanager_webhook_receiver;
mod incident;
mod log;
mod pipeline;
mod servicenow;
mod settings;
mod telemetry_endpoint;

/// exit the complete program if one thread panics
fn setup_panic_handler() {
	let default_panic = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		default_panic(info);
		std::process::exit(1);
	}));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
	setup_panic_handler();

	let command_line = CommandLine::parse()?;

	log::setup_logging(&command_line.log).context("could not setup logging")?;

	tracing::info!(
		version = env!("CARGO_PKG_VERSION"),
		"Starting {}",
		env!("CARGO_PKG_NAME")
	);

	let settings = Settings::load(&command_line)
		.context("failed to load config and command line arguments")
		.map_err(|err| {
			tracing::error!("{:#}", err);
			err
		})?;

	let client = ServiceNowClient::new(&settings.service_now)
		.context("Error creating the ServiceNow client")
		.map_err(|err| {
			tracing::error!("{:#}", err);
			err
		})?;

	tracing::info!(endpoint = %client.endpoint(), "ServiceNow config loaded");

	let metrics = Arc::new(Metrics::new().context("failed to register metrics")?);
	let pipeline = IncidentPipeline::new(Arc::new(client), metrics.clone());

	alertmanager_webhook_receiver::run_prometheus_receiver(
		settings.listen_address,
		pipeline,
		metrics,
	)
	.await
}
