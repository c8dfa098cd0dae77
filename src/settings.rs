use std::{
    net::{SocketAddr, ToSocketAddrs},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::{log::LogSettings, servicenow::ServiceNowSettings};

pub const DEFAULT_CONFIG_FILE: &str = "config/servicenow.yml";
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9877";

/// prefix of environment variables overriding config file values
const ENV_PREFIX: &str = "SERVICENOW_BRIDGE";

/// options given on the command line
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub config_file: PathBuf,
    pub listen_address: String,
    pub log: LogSettings,
}

impl CommandLine {
    fn command() -> Command<'static> {
        Command::new(clap::crate_name!())
            .version(clap::crate_version!())
            .about(clap::crate_description!())
            .author(clap::crate_authors!())
            .arg(
                Arg::new("config")
                    .help("ServiceNow configuration file")
                    .takes_value(true)
                    .long("config.file")
                    .default_value(DEFAULT_CONFIG_FILE),
            )
            .arg(
                Arg::new("listen")
                    .help("the address to listen on for HTTP requests")
                    .takes_value(true)
                    .long("web.listen-address")
                    .default_value(DEFAULT_LISTEN_ADDRESS),
            )
            .arg(
                Arg::new("level")
                    .help("log level")
                    .possible_values(["error", "warn", "info", "debug", "trace"])
                    .ignore_case(true)
                    .takes_value(true)
                    .long("log")
                    .default_value("info"),
            )
    }

    /// parse the process arguments, exits on `--help`, `--version` or invalid arguments
    pub fn parse() -> Result<Self> {
        Self::from_matches(&Self::command().get_matches())
    }

    #[cfg(test)]
    pub fn try_parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .context("invalid command line arguments")?;

        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let value = |name: &str| {
            matches
                .value_of(name)
                .ok_or_else(|| anyhow!("missing value for {}", name))
        };

        Ok(Self {
            config_file: PathBuf::from(value("config")?),
            listen_address: value("listen")?.to_owned(),
            log: LogSettings {
                level: value("level")?
                    .parse()
                    .context("invalid log level")?,
            },
        })
    }
}

/// contents of the config file
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    service_now: ServiceNowSettings,
}

impl ConfigFile {
    /// values from `<env_prefix>__SECTION__KEY` variables win over the file
    fn load(path: &Path, env_prefix: &str) -> Result<Self> {
        let conf = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Yaml))
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .build()
            .context(format!("can't load config file {}", path.display()))?;

        conf.try_deserialize()
            .context(format!("invalid config file {}", path.display()))
    }
}

/// everything needed to start the receiver
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_address: SocketAddr,
    pub service_now: ServiceNowSettings,
}

impl Settings {
    pub fn load(command_line: &CommandLine) -> Result<Self> {
        let listen_address = parse_listen_address(&command_line.listen_address)?;
        let ConfigFile { service_now } =
            ConfigFile::load(&command_line.config_file, ENV_PREFIX)?;

        Ok(Self {
            listen_address,
            service_now,
        })
    }
}

/// accepts `host:port` as well as `:port` for all interfaces
fn parse_listen_address(addr: &str) -> Result<SocketAddr> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_owned(),
    };

    full.to_socket_addrs()
        .context(format!("invalid listen address {:?}", addr))?
        .next()
        .ok_or_else(|| anyhow!("listen address {:?} doesn't resolve", addr))
}
