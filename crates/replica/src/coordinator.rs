// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Contract between a replica catalog and the process that populates it.

use std::{
	collections::BTreeSet,
	fmt::{Display, Formatter},
	path::PathBuf,
	sync::{Arc, Weak},
	time::Duration,
};

use mirror_catalog::{CallerContext, Catalog, SyncToken};

use crate::{ConnectionConfig, ReplicaTable, ReplicationSource, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
	NotStarted,
	Running,
	Stopping,
	Stopped,
}

impl Display for LifecycleState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			LifecycleState::NotStarted => f.write_str("not started"),
			LifecycleState::Running => f.write_str("running"),
			LifecycleState::Stopping => f.write_str("stopping"),
			LifecycleState::Stopped => f.write_str("stopped"),
		}
	}
}

/// Route back into the owning catalog for the coordinator's privileged
/// lookups and creates. Holds the catalog weakly so a running coordinator
/// never keeps it alive.
#[derive(Clone)]
pub struct SyncContext {
	catalog: Weak<dyn Catalog>,
	token: SyncToken,
}

impl SyncContext {
	pub fn new(catalog: Weak<dyn Catalog>, token: SyncToken) -> Self {
		Self {
			catalog,
			token,
		}
	}

	/// The owning catalog, unless it is already gone.
	pub fn catalog(&self) -> Option<Arc<dyn Catalog>> {
		self.catalog.upgrade()
	}

	pub fn token(&self) -> SyncToken {
		self.token
	}

	/// A caller context the owning catalog treats as privileged.
	pub fn caller_context(&self) -> CallerContext {
		CallerContext::synchronization(self.token)
	}
}

#[derive(Clone)]
pub struct CoordinatorConfig {
	/// Name of the mirrored remote database.
	pub remote_database: String,
	pub connection: ConnectionConfig,
	pub source: Arc<dyn ReplicationSource>,
	/// Location of the coordinator-owned metadata file.
	pub metadata_path: PathBuf,
	pub block_size: u64,
	/// Allow-list after macro expansion.
	pub tables_list: String,
	pub poll_interval: Duration,
	pub sync: SyncContext,
}

pub trait ReplicationCoordinator: Send + Sync {
	/// Resolves the allow-list against the remote schema.
	fn fetch_required_tables(&self, source: &dyn ReplicationSource) -> Result<BTreeSet<String>>;

	/// Registers a handle to populate. Only valid before [`Self::startup`].
	fn add_storage(&self, name: &str, table: Arc<ReplicaTable>);

	/// Schedules background synchronization and returns immediately.
	fn startup(&self) -> Result<()>;

	/// Requests a cooperative stop. Idempotent.
	fn shutdown(&self);

	/// Blocks until background work has stopped. Idempotent.
	fn shutdown_final(&self);

	fn state(&self) -> LifecycleState;
}

pub trait CoordinatorFactory: Send + Sync {
	fn create(&self, config: CoordinatorConfig) -> Result<Box<dyn ReplicationCoordinator>>;
}
