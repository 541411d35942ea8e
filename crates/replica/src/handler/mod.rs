// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Default replication coordinator: one background thread per catalog that
//! loads the initial snapshot of every registered table and then follows the
//! remote change stream.

mod metadata;
mod sync;
mod task;
mod tables;

use std::{
	collections::{BTreeMap, BTreeSet},
	sync::Arc,
};

pub use metadata::ReplicationMetadata;
use parking_lot::Mutex;
pub use tables::TablesFilter;
use tracing::{debug, instrument, warn};

use crate::{
	CoordinatorConfig, CoordinatorFactory, LifecycleState, ReplicaTable, ReplicationCoordinator, ReplicationSource,
	Result,
	handler::{sync::SyncWorker, task::ReplicationTask},
};

pub struct ReplicationHandler {
	config: CoordinatorConfig,
	filter: TablesFilter,
	tables: Mutex<BTreeMap<String, Arc<ReplicaTable>>>,
	task: ReplicationTask,
}

impl ReplicationHandler {
	pub fn new(config: CoordinatorConfig) -> Result<Self> {
		let filter = TablesFilter::parse(&config.tables_list)?;
		let task = ReplicationTask::new(config.remote_database.clone());
		Ok(Self {
			config,
			filter,
			tables: Mutex::new(BTreeMap::new()),
			task,
		})
	}
}

impl ReplicationCoordinator for ReplicationHandler {
	#[instrument(name = "replica::handler::fetch_required_tables", level = "debug", skip_all)]
	fn fetch_required_tables(&self, source: &dyn ReplicationSource) -> Result<BTreeSet<String>> {
		let required = self.filter.resolve(source.tables()?);
		debug!(required = required.len(), "resolved tables list");
		Ok(required)
	}

	fn add_storage(&self, name: &str, table: Arc<ReplicaTable>) {
		if self.task.state() != LifecycleState::NotStarted {
			warn!(table = name, state = %self.task.state(), "storage added after startup ignored");
			return;
		}
		self.tables.lock().insert(name.to_string(), table);
	}

	#[instrument(name = "replica::handler::startup", level = "debug", skip_all, fields(database = %self.config.remote_database))]
	fn startup(&self) -> Result<()> {
		let mut metadata = ReplicationMetadata::load(&self.config.metadata_path)?;
		if metadata.is_fresh() {
			// snapshots are taken at or after this position
			metadata.lsn = self.config.source.current_lsn()?;
			debug!(lsn = %metadata.lsn, "starting at current source position");
		}
		let worker = SyncWorker::new(&self.config, self.tables.lock().clone(), metadata);
		self.task.spawn(move |stop| worker.run(stop))
	}

	fn shutdown(&self) {
		self.task.request_stop();
	}

	fn shutdown_final(&self) {
		self.task.join();
	}

	fn state(&self) -> LifecycleState {
		self.task.state()
	}
}

/// Builds a [`ReplicationHandler`] per catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicationHandlerFactory;

impl CoordinatorFactory for ReplicationHandlerFactory {
	fn create(&self, config: CoordinatorConfig) -> Result<Box<dyn ReplicationCoordinator>> {
		Ok(Box::new(ReplicationHandler::new(config)?))
	}
}
