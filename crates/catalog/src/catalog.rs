// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use crate::{CallerContext, Result, StorageRef, TableDefinition};

/// Capability interface of a catalog: a named set of table storages whose
/// definitions are persisted under a metadata directory.
pub trait Catalog: Send + Sync {
	fn name(&self) -> &str;

	fn engine(&self) -> &'static str;

	/// Hydrates previously persisted table definitions.
	fn load_stored_objects(&self, ctx: &CallerContext) -> Result<()>;

	/// Absence is not an error.
	fn try_get_table(&self, name: &str, ctx: &CallerContext) -> Option<StorageRef>;

	fn create_table(
		&self,
		ctx: &CallerContext,
		name: &str,
		storage: StorageRef,
		definition: &TableDefinition,
	) -> Result<()>;

	fn drop_table(&self, ctx: &CallerContext, name: &str, no_delay: bool) -> Result<()>;

	/// Drops the whole catalog together with its persisted state.
	fn drop_catalog(&self, ctx: &CallerContext) -> Result<()>;

	/// Detaches the catalog. Persisted state is kept.
	fn shutdown(&self);

	fn tables(&self, ctx: &CallerContext) -> TablesSnapshot;

	fn metadata_path(&self) -> &Path;
}

/// Point-in-time listing of the tables of one catalog.
pub struct TablesSnapshot {
	catalog: String,
	tables: std::vec::IntoIter<(String, StorageRef)>,
}

impl TablesSnapshot {
	pub fn new(catalog: impl Into<String>, tables: Vec<(String, StorageRef)>) -> Self {
		Self {
			catalog: catalog.into(),
			tables: tables.into_iter(),
		}
	}

	pub fn catalog(&self) -> &str {
		&self.catalog
	}

	pub fn names(self) -> Vec<String> {
		self.map(|(name, _)| name).collect()
	}
}

impl Iterator for TablesSnapshot {
	type Item = (String, StorageRef);

	fn next(&mut self) -> Option<Self::Item> {
		self.tables.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.tables.size_hint()
	}
}

impl ExactSizeIterator for TablesSnapshot {}
