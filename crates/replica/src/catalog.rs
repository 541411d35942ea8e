// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Catalog that mirrors the tables of a remote database.
//!
//! A [`ReplicaCatalog`] wraps an underlying catalog and a replication
//! coordinator. Query threads only ever see tables whose initial snapshot has
//! completed. Every mutation of the underlying catalog comes from the
//! coordinator, which identifies itself with the [`SyncToken`] this catalog
//! minted for it.

use std::{
	ffi::OsString,
	fs,
	path::{Path, PathBuf},
	sync::{
		Arc, Weak,
		atomic::{AtomicBool, Ordering},
	},
};

use mirror_catalog::{
	CallerContext, Catalog, HostContext, StorageKind, StorageRef, SyncToken, TableDefinition, TablesSnapshot,
	storage::downcast,
};
use mirror_type::return_error;
use parking_lot::Mutex;
use tracing::{debug, instrument, trace, warn};

use crate::{
	ConnectionConfig, CoordinatorConfig, CoordinatorFactory, EngineDefinition, LifecycleState, ReplicaError,
	ReplicaSettings, ReplicaTable, ReplicationCoordinator, ReplicationSource, Result, SyncContext, TableRegistry,
};

pub const ENGINE_NAME: &str = "Replica";
pub const METADATA_SUFFIX: &str = ".replica_metadata";

pub struct ReplicaCatalog {
	this: Weak<ReplicaCatalog>,
	name: String,
	base: Box<dyn Catalog>,
	host: Arc<HostContext>,
	definition: EngineDefinition,
	connection: ConnectionConfig,
	settings: ReplicaSettings,
	source: Arc<dyn ReplicationSource>,
	factory: Arc<dyn CoordinatorFactory>,
	token: SyncToken,
	registry: TableRegistry,
	coordinator: Mutex<Option<Box<dyn ReplicationCoordinator>>>,
	loaded: AtomicBool,
}

impl ReplicaCatalog {
	/// Fails if the engine arguments or settings of `definition` are invalid,
	/// or if `source` is connected elsewhere than the arguments declare.
	pub fn new(
		base: Box<dyn Catalog>,
		host: Arc<HostContext>,
		definition: EngineDefinition,
		source: Arc<dyn ReplicationSource>,
		factory: Arc<dyn CoordinatorFactory>,
	) -> Result<Arc<Self>> {
		let connection = definition.connection_config()?;
		let settings = definition.replica_settings()?;
		if !connection.same_endpoint(source.config()) {
			return_error!(ReplicaError::SourceMismatch {
				declared: connection.to_string(),
				connected: source.config().to_string(),
			});
		}

		Ok(Arc::new_cyclic(|this| Self {
			this: this.clone(),
			name: base.name().to_string(),
			base,
			host,
			definition,
			connection,
			settings,
			source,
			factory,
			token: SyncToken::issue(),
			registry: TableRegistry::new(),
			coordinator: Mutex::new(None),
			loaded: AtomicBool::new(false),
		}))
	}

	pub fn definition(&self) -> &EngineDefinition {
		&self.definition
	}

	pub fn settings(&self) -> &ReplicaSettings {
		&self.settings
	}

	pub fn connection(&self) -> &ConnectionConfig {
		&self.connection
	}

	/// Engine of the wrapped catalog.
	pub fn base_engine(&self) -> &'static str {
		self.base.engine()
	}

	/// Location of the coordinator-owned metadata file.
	pub fn replica_metadata_path(&self) -> PathBuf {
		let mut path = OsString::from(self.base.metadata_path().as_os_str());
		path.push(METADATA_SUFFIX);
		PathBuf::from(path)
	}

	/// Names of every registered handle, loaded or not.
	pub fn registered_tables(&self) -> Vec<String> {
		self.registry.names()
	}

	pub fn coordinator_state(&self) -> Option<LifecycleState> {
		self.coordinator.lock().as_ref().map(|coordinator| coordinator.state())
	}

	pub fn is_synchronizing(&self) -> bool {
		self.coordinator_state() == Some(LifecycleState::Running)
	}

	fn is_privileged(&self, ctx: &CallerContext) -> bool {
		ctx.carries(&self.token)
	}

	/// A handle already known for `name`, either registered here or stored
	/// in the underlying catalog.
	fn existing_handle(&self, name: &str) -> Option<Arc<ReplicaTable>> {
		self.registry.get(name).or_else(|| {
			let ctx = CallerContext::synchronization(self.token);
			self.base.try_get_table(name, &ctx).and_then(downcast::<ReplicaTable>)
		})
	}

	#[instrument(name = "replica::catalog::start_synchronization", level = "debug", skip(self), fields(catalog = %self.name))]
	fn start_synchronization(&self) -> Result<()> {
		let catalog: Weak<dyn Catalog> = self.this.clone();
		let config = CoordinatorConfig {
			remote_database: self.connection.database.clone(),
			connection: self.connection.clone(),
			source: self.source.clone(),
			metadata_path: self.replica_metadata_path(),
			block_size: self.settings.effective_block_size(&self.host.settings),
			tables_list: self.host.macros.expand(&self.settings.tables_list)?,
			poll_interval: self.settings.poll_interval,
			sync: SyncContext::new(catalog, self.token),
		};

		let coordinator = self.factory.create(config)?;
		let required = coordinator.fetch_required_tables(self.source.as_ref())?;

		for name in &required {
			let table = self.existing_handle(name).unwrap_or_else(|| Arc::new(ReplicaTable::new(&self.name, name)));
			coordinator.add_storage(name, table.clone());
			self.registry.insert(table);
		}

		trace!(tables = required.len(), "starting replication");

		let mut slot = self.coordinator.lock();
		let coordinator = slot.insert(coordinator);
		coordinator.startup()
	}
}

impl Catalog for ReplicaCatalog {
	fn name(&self) -> &str {
		&self.name
	}

	fn engine(&self) -> &'static str {
		ENGINE_NAME
	}

	/// Hydrates the underlying catalog and starts replication. May run once.
	fn load_stored_objects(&self, ctx: &CallerContext) -> Result<()> {
		if self.loaded.swap(true, Ordering::SeqCst) {
			return_error!(ReplicaError::AlreadyLoaded {
				catalog: self.name.clone(),
			});
		}

		self.base.load_stored_objects(ctx)?;
		self.start_synchronization()
	}

	fn try_get_table(&self, name: &str, ctx: &CallerContext) -> Option<StorageRef> {
		if self.is_privileged(ctx) {
			return self.base.try_get_table(name, ctx);
		}

		let table = self.registry.get(name)?;
		if table.is_loaded() {
			Some(table as StorageRef)
		} else {
			None
		}
	}

	fn create_table(
		&self,
		ctx: &CallerContext,
		name: &str,
		storage: StorageRef,
		definition: &TableDefinition,
	) -> Result<()> {
		if self.is_privileged(ctx) && storage.kind() == StorageKind::Replacing {
			return self.base.create_table(ctx, name, storage, definition);
		}

		warn!(
			catalog = %self.name,
			table = name,
			kind = %storage.kind(),
			"create table ignored, tables of a replica catalog are created by replication"
		);
		Ok(())
	}

	fn drop_table(&self, ctx: &CallerContext, name: &str, no_delay: bool) -> Result<()> {
		self.base.drop_table(ctx, name, no_delay)
	}

	/// Stops replication, then removes the metadata file, then drops the
	/// underlying catalog.
	#[instrument(name = "replica::catalog::drop", level = "debug", skip(self, ctx), fields(catalog = %self.name))]
	fn drop_catalog(&self, ctx: &CallerContext) -> Result<()> {
		if let Some(coordinator) = self.coordinator.lock().as_ref() {
			coordinator.shutdown();
			coordinator.shutdown_final();
		}

		let metadata = self.replica_metadata_path();
		if metadata.exists() {
			fs::remove_file(&metadata)?;
			debug!(path = %metadata.display(), "removed replication metadata");
		}

		self.base.drop_catalog(ctx)?;
		self.registry.clear();
		Ok(())
	}

	fn shutdown(&self) {
		if let Some(coordinator) = self.coordinator.lock().as_ref() {
			coordinator.shutdown();
		}
	}

	fn tables(&self, _ctx: &CallerContext) -> TablesSnapshot {
		TablesSnapshot::new(&self.name, self.registry.loaded())
	}

	fn metadata_path(&self) -> &Path {
		self.base.metadata_path()
	}
}

impl Drop for ReplicaCatalog {
	fn drop(&mut self) {
		if let Some(coordinator) = self.coordinator.get_mut().as_ref() {
			coordinator.shutdown();
			coordinator.shutdown_final();
		}
	}
}
