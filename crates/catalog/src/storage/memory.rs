// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use mirror_type::Row;
use parking_lot::RwLock;

use crate::{Result, Storage, StorageId, StorageKind, TableDefinition};

/// Append-only in-memory rows.
pub struct MemoryStorage {
	id: StorageId,
	definition: TableDefinition,
	rows: RwLock<Vec<Row>>,
}

impl MemoryStorage {
	pub fn new(id: StorageId, definition: TableDefinition) -> Self {
		Self {
			id,
			definition,
			rows: RwLock::new(Vec::new()),
		}
	}

	pub fn definition(&self) -> &TableDefinition {
		&self.definition
	}

	pub fn append(&self, row: Row) -> Result<()> {
		self.definition.check_row(&row)?;
		self.rows.write().push(row);
		Ok(())
	}
}

impl Storage for MemoryStorage {
	fn id(&self) -> &StorageId {
		&self.id
	}

	fn kind(&self) -> StorageKind {
		StorageKind::Memory
	}

	fn scan(&self) -> Vec<Row> {
		self.rows.read().clone()
	}

	fn len(&self) -> usize {
		self.rows.read().len()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}
