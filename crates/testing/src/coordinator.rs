// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Coordinator that does no replication and journals every call it receives.

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::Arc,
	thread,
	time::Duration,
};

use mirror_catalog::StorageRef;
use mirror_replica::{
	CoordinatorConfig, CoordinatorFactory, LifecycleState, ReplicaError, ReplicaTable, ReplicationCoordinator,
	ReplicationSource, Result, handler::TablesFilter,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
	Create,
	FetchRequiredTables,
	AddStorage(String),
	Startup,
	Shutdown,
	/// Recorded when the final shutdown completes, together with whether the
	/// metadata file still existed at that moment.
	ShutdownFinal {
		metadata_present: bool,
	},
}

#[derive(Default)]
struct Shared {
	events: Mutex<Vec<CoordinatorEvent>>,
	configs: Mutex<Vec<CoordinatorConfig>>,
	tables: Mutex<BTreeMap<String, Arc<ReplicaTable>>>,
	fail_create: bool,
	fail_startup: bool,
	final_delay: Duration,
}

impl Shared {
	fn record(&self, event: CoordinatorEvent) {
		self.events.lock().push(event);
	}
}

/// Hands out [`RecordingCoordinator`]s that share one journal. Clones share
/// the journal too, so a test keeps one clone and installs the other.
#[derive(Clone, Default)]
pub struct RecordingFactory {
	shared: Arc<Shared>,
}

impl RecordingFactory {
	pub fn new() -> Self {
		Self::default()
	}

	fn configured(configure: impl FnOnce(&mut Shared)) -> Self {
		let mut shared = Shared::default();
		configure(&mut shared);
		Self {
			shared: Arc::new(shared),
		}
	}

	pub fn failing_create() -> Self {
		Self::configured(|shared| shared.fail_create = true)
	}

	pub fn failing_startup() -> Self {
		Self::configured(|shared| shared.fail_startup = true)
	}

	/// Coordinators whose final shutdown takes `delay`, as if they were in
	/// the middle of a synchronization.
	pub fn slow_final_shutdown(delay: Duration) -> Self {
		Self::configured(|shared| shared.final_delay = delay)
	}

	pub fn as_factory(&self) -> Arc<dyn CoordinatorFactory> {
		Arc::new(self.clone())
	}

	pub fn events(&self) -> Vec<CoordinatorEvent> {
		self.shared.events.lock().clone()
	}

	pub fn last_config(&self) -> Option<CoordinatorConfig> {
		self.shared.configs.lock().last().cloned()
	}

	/// Names handed to `add_storage`, sorted.
	pub fn registered(&self) -> Vec<String> {
		self.shared.tables.lock().keys().cloned().collect()
	}

	pub fn table(&self, name: &str) -> Option<Arc<ReplicaTable>> {
		self.shared.tables.lock().get(name).cloned()
	}

	/// Completes the initial synchronization of `name` with `nested`.
	pub fn mark_loaded(&self, name: &str, nested: StorageRef) -> Result<()> {
		match self.table(name) {
			Some(table) => table.set_nested(nested),
			None => Err(ReplicaError::UnknownRemoteTable {
				table: name.to_string(),
			}
			.into()),
		}
	}
}

impl CoordinatorFactory for RecordingFactory {
	fn create(&self, config: CoordinatorConfig) -> Result<Box<dyn ReplicationCoordinator>> {
		self.shared.record(CoordinatorEvent::Create);
		if self.shared.fail_create {
			return Err(ReplicaError::SourceUnavailable {
				reason: "coordinator construction failed".to_string(),
			}
			.into());
		}

		self.shared.configs.lock().push(config.clone());
		Ok(Box::new(RecordingCoordinator {
			config,
			shared: self.shared.clone(),
			state: Mutex::new(LifecycleState::NotStarted),
		}))
	}
}

pub struct RecordingCoordinator {
	config: CoordinatorConfig,
	shared: Arc<Shared>,
	state: Mutex<LifecycleState>,
}

impl ReplicationCoordinator for RecordingCoordinator {
	fn fetch_required_tables(&self, source: &dyn ReplicationSource) -> Result<BTreeSet<String>> {
		self.shared.record(CoordinatorEvent::FetchRequiredTables);
		Ok(TablesFilter::parse(&self.config.tables_list)?.resolve(source.tables()?))
	}

	fn add_storage(&self, name: &str, table: Arc<ReplicaTable>) {
		self.shared.record(CoordinatorEvent::AddStorage(name.to_string()));
		self.shared.tables.lock().insert(name.to_string(), table);
	}

	fn startup(&self) -> Result<()> {
		self.shared.record(CoordinatorEvent::Startup);
		if self.shared.fail_startup {
			return Err(ReplicaError::SpawnFailed {
				reason: "startup failed".to_string(),
			}
			.into());
		}
		*self.state.lock() = LifecycleState::Running;
		Ok(())
	}

	fn shutdown(&self) {
		self.shared.record(CoordinatorEvent::Shutdown);
		let mut state = self.state.lock();
		*state = match *state {
			LifecycleState::Running => LifecycleState::Stopping,
			LifecycleState::NotStarted => LifecycleState::Stopped,
			other => other,
		};
	}

	fn shutdown_final(&self) {
		if !self.shared.final_delay.is_zero() {
			thread::sleep(self.shared.final_delay);
		}
		*self.state.lock() = LifecycleState::Stopped;
		self.shared.record(CoordinatorEvent::ShutdownFinal {
			metadata_present: self.config.metadata_path.exists(),
		});
	}

	fn state(&self) -> LifecycleState {
		*self.state.lock()
	}
}
