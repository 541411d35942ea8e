// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	path::PathBuf,
	sync::Arc,
	time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use mirror_catalog::{
	Catalog, ReplacingStorage, StorageId, StorageKind, StorageRef, TableDefinition, storage::downcast,
};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
	Change, ChangeEvent, CoordinatorConfig, ReplicaError, ReplicaTable, ReplicationSource, Result, SyncContext,
	TableStructure, handler::metadata::ReplicationMetadata,
};

/// State owned by the replication thread: the registered handles and the
/// progress recorded in the metadata file.
pub(crate) struct SyncWorker {
	remote_database: String,
	source: Arc<dyn ReplicationSource>,
	sync: SyncContext,
	metadata_path: PathBuf,
	block_size: usize,
	poll_interval: Duration,
	tables: BTreeMap<String, Arc<ReplicaTable>>,
	metadata: ReplicationMetadata,
}

impl SyncWorker {
	pub fn new(
		config: &CoordinatorConfig,
		tables: BTreeMap<String, Arc<ReplicaTable>>,
		metadata: ReplicationMetadata,
	) -> Self {
		Self {
			remote_database: config.remote_database.clone(),
			source: config.source.clone(),
			sync: config.sync.clone(),
			metadata_path: config.metadata_path.clone(),
			block_size: usize::try_from(config.block_size).unwrap_or(usize::MAX).max(1),
			poll_interval: config.poll_interval,
			tables,
			metadata,
		}
	}

	pub fn run(mut self, stop: Receiver<()>) {
		info!(
			database = %self.remote_database,
			tables = self.tables.len(),
			lsn = %self.metadata.lsn,
			"synchronizing"
		);

		loop {
			if !self.tick(&stop) {
				break;
			}
			match stop.recv_timeout(self.poll_interval) {
				Err(RecvTimeoutError::Timeout) => continue,
				Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
			}
		}
	}

	/// One round of snapshot loading and change application. Returns false
	/// once the worker should exit.
	fn tick(&mut self, stop: &Receiver<()>) -> bool {
		let Some(catalog) = self.sync.catalog() else {
			debug!(database = %self.remote_database, "catalog released, stopping replication");
			return false;
		};

		let pending: Vec<Arc<ReplicaTable>> =
			self.tables.values().filter(|table| !table.is_loaded()).cloned().collect();
		for table in pending {
			if stop_requested(stop) {
				return false;
			}
			if let Err(err) = self.load_table(catalog.as_ref(), &table) {
				error!(table = table.name(), error = %err, "initial snapshot failed, retrying later");
			}
		}

		if let Err(err) = self.apply_changes() {
			error!(database = %self.remote_database, error = %err, "change application failed, retrying later");
		}
		true
	}

	#[instrument(name = "replica::sync::load_table", level = "debug", skip(self, catalog, table), fields(table = table.name()))]
	fn load_table(&mut self, catalog: &dyn Catalog, table: &ReplicaTable) -> Result<()> {
		let name = table.name();
		let structure = self.source.table_structure(name)?;
		let snapshot = self.source.snapshot(name)?;

		let nested = self.nested_storage(catalog, name, structure)?;
		nested.truncate();
		for block in snapshot.rows.chunks(self.block_size) {
			nested.upsert_batch(block, snapshot.lsn.0)?;
		}

		self.metadata.tables.insert(name.to_string(), snapshot.lsn);
		self.metadata.persist(&self.metadata_path)?;

		table.set_nested(nested as StorageRef)?;
		info!(table = name, rows = snapshot.rows.len(), lsn = %snapshot.lsn, "initial snapshot loaded");
		Ok(())
	}

	/// Reuses the persisted nested storage of `name` or creates it, both
	/// through the privileged path of the owning catalog.
	fn nested_storage(
		&self,
		catalog: &dyn Catalog,
		name: &str,
		structure: TableStructure,
	) -> Result<Arc<ReplacingStorage>> {
		let ctx = self.sync.caller_context();

		if let Some(existing) = catalog.try_get_table(name, &ctx) {
			trace!(table = name, "reusing nested storage");
			return downcast::<ReplacingStorage>(existing).ok_or_else(|| {
				ReplicaError::IncompatibleNested {
					table: name.to_string(),
				}
				.into()
			});
		}

		let definition =
			TableDefinition::new(name, structure.columns, structure.primary_key, StorageKind::Replacing);
		let storage = Arc::new(ReplacingStorage::new(StorageId::new(catalog.name(), name), definition.clone()));
		catalog.create_table(&ctx, name, storage.clone(), &definition)?;
		Ok(storage)
	}

	fn apply_changes(&mut self) -> Result<()> {
		let since = self.metadata.lsn;
		let events = self.source.changes(since, self.block_size)?;
		if events.is_empty() {
			return Ok(());
		}

		let mut last = since;
		let mut applied = 0usize;
		for event in &events {
			last = last.max(event.lsn);
			if self.apply(event) {
				applied += 1;
			}
		}

		self.metadata.lsn = last;
		self.metadata.persist(&self.metadata_path)?;
		debug!(received = events.len(), applied, lsn = %last, "applied changes");
		Ok(())
	}

	fn apply(&self, event: &ChangeEvent) -> bool {
		let Some(table) = self.tables.get(&event.table) else {
			trace!(table = %event.table, "change for unregistered table ignored");
			return false;
		};
		if self.metadata.snapshot_lsn(&event.table).is_some_and(|snapshot| event.lsn <= snapshot) {
			return false;
		}
		let Some(nested) = table.try_get_nested() else {
			return false;
		};
		let Some(storage) = nested.downcast_ref::<ReplacingStorage>() else {
			return false;
		};

		let version = event.lsn.0;
		let result = match &event.change {
			Change::Insert(row) | Change::Update(row) => storage.upsert(row.clone(), version),
			Change::Delete(key) => Ok(storage.delete(key.clone(), version)),
		};

		match result {
			Ok(changed) => changed,
			Err(err) => {
				warn!(table = %event.table, lsn = %event.lsn, error = %err, "change rejected");
				false
			}
		}
	}
}

fn stop_requested(stop: &Receiver<()>) -> bool {
	!matches!(stop.try_recv(), Err(TryRecvError::Empty))
}
