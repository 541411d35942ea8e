// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use mirror_type::return_error;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
	CallerContext, Catalog, CatalogError, Result, StorageFactory, StorageId, StorageRef, TableDefinition,
	TablesSnapshot,
	persist::{StoredTable, definition_path, list_definitions, read_stored, remove_dir_if_exists, remove_if_exists, write_stored},
};

const DROPPED_DIR: &str = "dropped";

struct TableEntry {
	uuid: Uuid,
	storage: StorageRef,
	definition: TableDefinition,
}

/// A table removed with a delayed drop. Its storage stays alive until the
/// next purge.
#[derive(Clone)]
pub struct DroppedTable {
	pub name: String,
	pub uuid: Uuid,
	pub storage: StorageRef,
}

/// Catalog variant that assigns every table a stable uuid, replaces
/// definition files atomically and supports delayed drops.
pub struct AtomicCatalog {
	name: String,
	metadata_path: PathBuf,
	factory: StorageFactory,
	tables: RwLock<BTreeMap<String, TableEntry>>,
	dropped: Mutex<Vec<DroppedTable>>,
}

impl AtomicCatalog {
	pub fn new(name: impl Into<String>, metadata_path: impl Into<PathBuf>, factory: StorageFactory) -> Self {
		Self {
			name: name.into(),
			metadata_path: metadata_path.into(),
			factory,
			tables: RwLock::new(BTreeMap::new()),
			dropped: Mutex::new(Vec::new()),
		}
	}

	pub fn table_uuid(&self, name: &str) -> Option<Uuid> {
		self.tables.read().get(name).map(|entry| entry.uuid)
	}

	pub fn definition(&self, name: &str) -> Option<TableDefinition> {
		self.tables.read().get(name).map(|entry| entry.definition.clone())
	}

	/// Tables dropped with a delay and not yet purged.
	pub fn dropped_tables(&self) -> Vec<DroppedTable> {
		self.dropped.lock().clone()
	}

	fn dropped_dir(&self) -> PathBuf {
		self.metadata_path.join(DROPPED_DIR)
	}

	fn dropped_path(&self, uuid: Uuid) -> PathBuf {
		self.dropped_dir().join(format!("{}.json", uuid))
	}

	/// Releases every delayed drop, removing its parked definition file.
	/// Returns the number of tables purged.
	#[instrument(name = "catalog::atomic::purge", level = "debug", skip(self), fields(catalog = %self.name))]
	pub fn purge_dropped(&self) -> Result<usize> {
		let pending: Vec<DroppedTable> = self.dropped.lock().drain(..).collect();
		let mut purged = pending.len();

		for table in &pending {
			remove_if_exists(&self.dropped_path(table.uuid))?;
		}

		// leftovers from a previous process
		let dir = self.dropped_dir();
		if dir.is_dir() {
			for path in list_definitions(&dir)? {
				if remove_if_exists(&path)? {
					purged += 1;
				}
			}
		}

		debug!(purged, "purged dropped tables");
		Ok(purged)
	}
}

impl Catalog for AtomicCatalog {
	fn name(&self) -> &str {
		&self.name
	}

	fn engine(&self) -> &'static str {
		"Atomic"
	}

	#[instrument(name = "catalog::atomic::load", level = "debug", skip(self, _ctx), fields(catalog = %self.name))]
	fn load_stored_objects(&self, _ctx: &CallerContext) -> Result<()> {
		fs::create_dir_all(&self.metadata_path)?;

		let mut loaded = BTreeMap::new();
		for path in list_definitions(&self.metadata_path)? {
			let StoredTable {
				uuid,
				definition,
			} = read_stored(&path)?;

			let uuid = match uuid {
				Some(uuid) => uuid,
				None => {
					let uuid = Uuid::new_v4();
					warn!(table = %definition.name, %uuid, "definition without uuid, assigning one");
					write_stored(
						&path,
						&StoredTable {
							uuid: Some(uuid),
							definition: definition.clone(),
						},
						true,
					)?;
					uuid
				}
			};

			let storage = self.factory.create(StorageId::new(&self.name, &definition.name), &definition)?;
			loaded.insert(definition.name.clone(), TableEntry {
				uuid,
				storage,
				definition,
			});
		}

		debug!(tables = loaded.len(), "loaded stored tables");
		*self.tables.write() = loaded;

		self.purge_dropped()?;
		Ok(())
	}

	fn try_get_table(&self, name: &str, _ctx: &CallerContext) -> Option<StorageRef> {
		self.tables.read().get(name).map(|entry| entry.storage.clone())
	}

	#[instrument(name = "catalog::atomic::create_table", level = "debug", skip(self, _ctx, storage, definition))]
	fn create_table(
		&self,
		_ctx: &CallerContext,
		name: &str,
		storage: StorageRef,
		definition: &TableDefinition,
	) -> Result<()> {
		let mut tables = self.tables.write();
		if tables.contains_key(name) {
			return_error!(CatalogError::TableAlreadyExists {
				catalog: self.name.clone(),
				name: name.to_string(),
			});
		}

		let uuid = Uuid::new_v4();
		fs::create_dir_all(&self.metadata_path)?;
		write_stored(
			&definition_path(&self.metadata_path, name),
			&StoredTable {
				uuid: Some(uuid),
				definition: definition.clone(),
			},
			true,
		)?;

		tables.insert(name.to_string(), TableEntry {
			uuid,
			storage,
			definition: definition.clone(),
		});
		Ok(())
	}

	#[instrument(name = "catalog::atomic::drop_table", level = "debug", skip(self, _ctx))]
	fn drop_table(&self, _ctx: &CallerContext, name: &str, no_delay: bool) -> Result<()> {
		let mut tables = self.tables.write();
		let Some(entry) = tables.get(name) else {
			return_error!(CatalogError::UnknownTable {
				catalog: self.name.clone(),
				name: name.to_string(),
			});
		};

		let path = definition_path(&self.metadata_path, name);
		if no_delay {
			remove_if_exists(&path)?;
		} else {
			fs::create_dir_all(self.dropped_dir())?;
			fs::rename(&path, self.dropped_path(entry.uuid))?;
			self.dropped.lock().push(DroppedTable {
				name: name.to_string(),
				uuid: entry.uuid,
				storage: entry.storage.clone(),
			});
		}

		tables.remove(name);
		Ok(())
	}

	#[instrument(name = "catalog::atomic::drop", level = "debug", skip(self, _ctx), fields(catalog = %self.name))]
	fn drop_catalog(&self, _ctx: &CallerContext) -> Result<()> {
		self.dropped.lock().clear();
		self.tables.write().clear();
		remove_dir_if_exists(&self.metadata_path)
	}

	fn shutdown(&self) {
		debug!(catalog = %self.name, pending_drops = self.dropped.lock().len(), "atomic catalog detached");
	}

	fn tables(&self, _ctx: &CallerContext) -> TablesSnapshot {
		let tables =
			self.tables.read().iter().map(|(name, entry)| (name.clone(), entry.storage.clone())).collect();
		TablesSnapshot::new(&self.name, tables)
	}

	fn metadata_path(&self) -> &Path {
		&self.metadata_path
	}
}
