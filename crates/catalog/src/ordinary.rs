// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use mirror_type::return_error;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::{
	CallerContext, Catalog, CatalogError, Result, StorageFactory, StorageId, StorageRef, TableDefinition,
	TablesSnapshot,
	persist::{StoredTable, definition_path, list_definitions, read_stored, remove_dir_if_exists, remove_if_exists, write_stored},
};

struct TableEntry {
	storage: StorageRef,
	definition: TableDefinition,
}

/// File-backed catalog: every table definition is a JSON document in the
/// metadata directory, written in place and removed on drop.
pub struct OrdinaryCatalog {
	name: String,
	metadata_path: PathBuf,
	factory: StorageFactory,
	tables: RwLock<BTreeMap<String, TableEntry>>,
}

impl OrdinaryCatalog {
	pub fn new(name: impl Into<String>, metadata_path: impl Into<PathBuf>, factory: StorageFactory) -> Self {
		Self {
			name: name.into(),
			metadata_path: metadata_path.into(),
			factory,
			tables: RwLock::new(BTreeMap::new()),
		}
	}

	pub fn definition(&self, name: &str) -> Option<TableDefinition> {
		self.tables.read().get(name).map(|entry| entry.definition.clone())
	}
}

impl Catalog for OrdinaryCatalog {
	fn name(&self) -> &str {
		&self.name
	}

	fn engine(&self) -> &'static str {
		"Ordinary"
	}

	#[instrument(name = "catalog::ordinary::load", level = "debug", skip(self, _ctx), fields(catalog = %self.name))]
	fn load_stored_objects(&self, _ctx: &CallerContext) -> Result<()> {
		fs::create_dir_all(&self.metadata_path)?;

		let mut loaded = BTreeMap::new();
		for path in list_definitions(&self.metadata_path)? {
			let StoredTable {
				definition,
				..
			} = read_stored(&path)?;
			let storage = self.factory.create(StorageId::new(&self.name, &definition.name), &definition)?;
			loaded.insert(definition.name.clone(), TableEntry {
				storage,
				definition,
			});
		}

		debug!(tables = loaded.len(), "loaded stored tables");
		*self.tables.write() = loaded;
		Ok(())
	}

	fn try_get_table(&self, name: &str, _ctx: &CallerContext) -> Option<StorageRef> {
		self.tables.read().get(name).map(|entry| entry.storage.clone())
	}

	#[instrument(name = "catalog::ordinary::create_table", level = "debug", skip(self, _ctx, storage, definition))]
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

		fs::create_dir_all(&self.metadata_path)?;
		write_stored(
			&definition_path(&self.metadata_path, name),
			&StoredTable {
				uuid: None,
				definition: definition.clone(),
			},
			false,
		)?;

		tables.insert(name.to_string(), TableEntry {
			storage,
			definition: definition.clone(),
		});
		Ok(())
	}

	#[instrument(name = "catalog::ordinary::drop_table", level = "debug", skip(self, _ctx))]
	fn drop_table(&self, _ctx: &CallerContext, name: &str, _no_delay: bool) -> Result<()> {
		let mut tables = self.tables.write();
		if !tables.contains_key(name) {
			return_error!(CatalogError::UnknownTable {
				catalog: self.name.clone(),
				name: name.to_string(),
			});
		}

		remove_if_exists(&definition_path(&self.metadata_path, name))?;
		tables.remove(name);
		Ok(())
	}

	#[instrument(name = "catalog::ordinary::drop", level = "debug", skip(self, _ctx), fields(catalog = %self.name))]
	fn drop_catalog(&self, _ctx: &CallerContext) -> Result<()> {
		self.tables.write().clear();
		remove_dir_if_exists(&self.metadata_path)
	}

	fn shutdown(&self) {
		debug!(catalog = %self.name, "ordinary catalog detached");
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
