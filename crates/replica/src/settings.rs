// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Declaration of a replica catalog: engine arguments and settings.

use std::{collections::BTreeMap, time::Duration};

use mirror_catalog::HostSettings;
use mirror_type::return_error;

use crate::{ConnectionConfig, ENGINE_NAME, ReplicaError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_PORT: u16 = 5432;

const MAX_BLOCK_SIZE: &str = "max_block_size";
const TABLES_LIST: &str = "tables_list";
const POLL_INTERVAL_MS: &str = "poll_interval_ms";
const LEGACY_PREFIX: &str = "postgresql_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaSettings {
	/// Overrides the host's insert block size when set.
	pub max_block_size: Option<u64>,
	/// Allow-list of remote tables, before macro expansion.
	pub tables_list: String,
	pub poll_interval: Duration,
}

impl Default for ReplicaSettings {
	fn default() -> Self {
		Self {
			max_block_size: None,
			tables_list: String::new(),
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}
}

impl ReplicaSettings {
	pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self> {
		let mut settings = Self::default();

		for (key, value) in options {
			let name = key.strip_prefix(LEGACY_PREFIX).unwrap_or(key);
			match name {
				MAX_BLOCK_SIZE => settings.max_block_size = Some(parse_positive(key, value)?),
				TABLES_LIST => settings.tables_list = value.clone(),
				POLL_INTERVAL_MS if !key.starts_with(LEGACY_PREFIX) => {
					settings.poll_interval = Duration::from_millis(parse_positive(key, value)?)
				}
				_ => {
					return_error!(ReplicaError::UnknownSetting {
						key: key.clone(),
					});
				}
			}
		}

		Ok(settings)
	}

	pub fn effective_block_size(&self, host: &HostSettings) -> u64 {
		self.max_block_size.unwrap_or(host.max_insert_block_size)
	}
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
	let invalid = |reason: &str| ReplicaError::InvalidSetting {
		key: key.to_string(),
		value: value.to_string(),
		reason: reason.to_string(),
	};

	let parsed = value.trim().parse::<u64>().map_err(|_| invalid("expected a positive integer"))?;
	if parsed == 0 {
		return Err(invalid("must be greater than zero").into());
	}
	Ok(parsed)
}

/// How a catalog instance was declared. Cloned at construction and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDefinition {
	pub engine: String,
	/// `'host:port'`, remote database, user, password.
	pub arguments: Vec<String>,
	pub settings: BTreeMap<String, String>,
}

impl EngineDefinition {
	pub fn new(arguments: Vec<String>) -> Self {
		Self {
			engine: ENGINE_NAME.to_string(),
			arguments,
			settings: BTreeMap::new(),
		}
	}

	pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.settings.insert(key.into(), value.into());
		self
	}

	pub fn replica_settings(&self) -> Result<ReplicaSettings> {
		ReplicaSettings::from_options(&self.settings)
	}

	pub fn connection_config(&self) -> Result<ConnectionConfig> {
		let [address, database, user, password] = self.arguments.as_slice() else {
			return_error!(ReplicaError::InvalidEngineArguments {
				engine: self.engine.clone(),
				expected: 4,
				actual: self.arguments.len(),
			});
		};

		let (host, port) = parse_address(address)?;
		Ok(ConnectionConfig {
			host,
			port,
			database: database.clone(),
			user: user.clone(),
			password: password.clone(),
		})
	}
}

fn parse_address(address: &str) -> Result<(String, u16)> {
	let invalid = |reason: &str| ReplicaError::InvalidAddress {
		address: address.to_string(),
		reason: reason.to_string(),
	};

	let (host, port) = match address.rsplit_once(':') {
		Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid("port is not a number"))?),
		None => (address, DEFAULT_PORT),
	};

	if host.is_empty() {
		return Err(invalid("host is empty").into());
	}
	Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
		pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	#[test]
	fn test_defaults() {
		let settings = ReplicaSettings::from_options(&BTreeMap::new()).unwrap();
		assert_eq!(settings, ReplicaSettings::default());
		assert_eq!(settings.effective_block_size(&HostSettings::default()), 1_048_576);
	}

	#[test]
	fn test_block_size_override() {
		let settings = ReplicaSettings::from_options(&options(&[("max_block_size", "500")])).unwrap();
		assert_eq!(settings.effective_block_size(&HostSettings::default()), 500);
	}

	#[test]
	fn test_legacy_aliases() {
		let settings = ReplicaSettings::from_options(&options(&[
			("postgresql_max_block_size", "64"),
			("postgresql_tables_list", "orders"),
		]))
		.unwrap();
		assert_eq!(settings.max_block_size, Some(64));
		assert_eq!(settings.tables_list, "orders");
	}

	#[test]
	fn test_poll_interval() {
		let settings = ReplicaSettings::from_options(&options(&[("poll_interval_ms", "5")])).unwrap();
		assert_eq!(settings.poll_interval, Duration::from_millis(5));
	}

	#[test]
	fn test_zero_block_size() {
		let err = ReplicaSettings::from_options(&options(&[("max_block_size", "0")])).unwrap_err();
		assert_eq!(err.code(), "REPLICA_001");
	}

	#[test]
	fn test_non_numeric_block_size() {
		let err = ReplicaSettings::from_options(&options(&[("max_block_size", "lots")])).unwrap_err();
		assert_eq!(err.code(), "REPLICA_001");
	}

	#[test]
	fn test_unknown_setting() {
		let err = ReplicaSettings::from_options(&options(&[("replication_slot", "s1")])).unwrap_err();
		assert_eq!(err.code(), "REPLICA_002");

		let err = ReplicaSettings::from_options(&options(&[("postgresql_poll_interval_ms", "5")])).unwrap_err();
		assert_eq!(err.code(), "REPLICA_002");
	}

	#[test]
	fn test_connection_config() {
		let definition = EngineDefinition::new(vec![
			"db.internal:6543".into(),
			"shop".into(),
			"reader".into(),
			"secret".into(),
		]);
		let config = definition.connection_config().unwrap();
		assert_eq!(config.host, "db.internal");
		assert_eq!(config.port, 6543);
		assert_eq!(config.database, "shop");
		assert_eq!(config.user, "reader");
	}

	#[test]
	fn test_connection_config_default_port() {
		let definition = EngineDefinition::new(vec!["db".into(), "shop".into(), "u".into(), "p".into()]);
		assert_eq!(definition.connection_config().unwrap().port, DEFAULT_PORT);
	}

	#[test]
	fn test_connection_config_arity() {
		let definition = EngineDefinition::new(vec!["db:5432".into(), "shop".into()]);
		let err = definition.connection_config().unwrap_err();
		assert_eq!(err.code(), "REPLICA_003");
	}

	#[test]
	fn test_connection_config_bad_port() {
		let definition = EngineDefinition::new(vec!["db:port".into(), "shop".into(), "u".into(), "p".into()]);
		let err = definition.connection_config().unwrap_err();
		assert_eq!(err.code(), "REPLICA_004");
	}
}
