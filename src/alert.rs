//! data structures for deserializing incoming alerts
//!
//! Every field is optional: alertmanager versions differ in what they send and a
//! missing field must never be the reason a notification is dropped.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
/// data from prometheus received by the alertmanager webhook receiver
pub struct AlertBatch {
	#[serde(deserialize_with = "null_as_default")]
	pub version: String,
	#[serde(deserialize_with = "null_as_default")]
	pub group_key: String,
	#[serde(deserialize_with = "null_as_default")]
	pub receiver: String,
	/// `firing` or `resolved`
	#[serde(deserialize_with = "null_as_default")]
	pub status: String,
	#[serde(deserialize_with = "null_as_default")]
	pub alerts: Vec<Alert>,
	#[serde(deserialize_with = "null_as_default")]
	pub group_labels: HashMap<String, String>,
	#[serde(deserialize_with = "null_as_default")]
	pub common_labels: HashMap<String, String>,
	#[serde(deserialize_with = "null_as_default")]
	pub common_annotations: HashMap<String, String>,
	#[serde(rename = "externalURL", deserialize_with = "null_as_default")]
	pub external_url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
	#[serde(deserialize_with = "null_as_default")]
	pub status: String,
	#[serde(deserialize_with = "null_as_default")]
	pub labels: HashMap<String, String>,
	#[serde(deserialize_with = "null_as_default")]
	pub annotations: HashMap<String, String>,
	pub starts_at: Option<DateTime<Utc>>,
	pub ends_at: Option<DateTime<Utc>>,
	#[serde(rename = "generatorURL", deserialize_with = "null_as_default")]
	pub generator_url: String,
	#[serde(deserialize_with = "null_as_default")]
	pub fingerprint: String,
}

impl Alert {
	/// value of a label, empty if the alert doesn't carry it
	pub fn label(&self, key: &str) -> &str {
		self.labels.get(key).map(String::as_str).unwrap_or_default()
	}

	/// value of an annotation, empty if the alert doesn't carry it
	pub fn annotation(&self, key: &str) -> &str {
		self.annotations
			.get(key)
			.map(String::as_str)
			.unwrap_or_default()
	}
}
