//! config file options for the ServiceNow instance

use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
/// login data for the ServiceNow REST api
pub struct ServiceNowSettings {
	/// instance name, the `<name>` in `https://<name>.service-now.com`
	pub instance_name: String,
	pub user_name: String,
	pub password: String,
	/// overrides the url derived from `instance_name`, e.g. for on-premise instances
	#[serde(default)]
	pub base_url: Option<Url>,
}
