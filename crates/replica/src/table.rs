// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use mirror_catalog::{Storage, StorageId, StorageKind, StorageRef};
use mirror_type::Row;
use once_cell::sync::OnceCell;

use crate::{ReplicaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
	/// Registered, no data yet.
	Pending,
	/// Initial snapshot applied, nested storage queryable.
	Loaded,
}

/// Handle of one mirrored table. The nested storage is set exactly once, by
/// the replication coordinator, when the initial snapshot completes.
pub struct ReplicaTable {
	id: StorageId,
	nested: OnceCell<StorageRef>,
}

impl ReplicaTable {
	pub fn new(catalog: impl Into<String>, table: impl Into<String>) -> Self {
		Self {
			id: StorageId::new(catalog, table),
			nested: OnceCell::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.id.table
	}

	pub fn state(&self) -> TableState {
		if self.nested.get().is_some() {
			TableState::Loaded
		} else {
			TableState::Pending
		}
	}

	pub fn is_loaded(&self) -> bool {
		self.state() == TableState::Loaded
	}

	pub fn try_get_nested(&self) -> Option<StorageRef> {
		self.nested.get().cloned()
	}

	/// Moves the handle from Pending to Loaded.
	pub fn set_nested(&self, storage: StorageRef) -> Result<()> {
		self.nested.set(storage).map_err(|_| {
			ReplicaError::NestedAlreadySet {
				table: self.id.table.clone(),
			}
			.into()
		})
	}
}

impl Storage for ReplicaTable {
	fn id(&self) -> &StorageId {
		&self.id
	}

	fn kind(&self) -> StorageKind {
		StorageKind::Replica
	}

	fn scan(&self) -> Vec<Row> {
		self.nested.get().map(|nested| nested.scan()).unwrap_or_default()
	}

	fn len(&self) -> usize {
		self.nested.get().map_or(0, |nested| nested.len())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

#[cfg(test)]
mod tests {
	use mirror_catalog::{ColumnDef, MemoryStorage, TableDefinition};
	use mirror_type::{Type, Value};

	use super::*;

	fn nested(rows: &[i64]) -> StorageRef {
		let definition =
			TableDefinition::new("orders", vec![ColumnDef::new("id", Type::Int8)], vec![], StorageKind::Memory);
		let storage = MemoryStorage::new(StorageId::new("shop", "orders"), definition);
		for id in rows {
			storage.append(vec![Value::int8(*id)]).unwrap();
		}
		Arc::new(storage)
	}

	#[test]
	fn test_new_handle_is_pending() {
		let table = ReplicaTable::new("shop", "orders");
		assert_eq!(table.state(), TableState::Pending);
		assert!(table.try_get_nested().is_none());
		assert!(table.is_empty());
		assert_eq!(table.kind(), StorageKind::Replica);
	}

	#[test]
	fn test_set_nested_loads() {
		let table = ReplicaTable::new("shop", "orders");
		table.set_nested(nested(&[1, 2])).unwrap();

		assert_eq!(table.state(), TableState::Loaded);
		assert!(table.try_get_nested().is_some());
		assert_eq!(table.len(), 2);
		assert_eq!(table.scan(), vec![vec![Value::int8(1)], vec![Value::int8(2)]]);
	}

	#[test]
	fn test_second_set_nested_is_rejected() {
		let table = ReplicaTable::new("shop", "orders");
		table.set_nested(nested(&[1])).unwrap();

		let err = table.set_nested(nested(&[1, 2, 3])).unwrap_err();
		assert_eq!(err.code(), "REPLICA_006");
		assert_eq!(table.state(), TableState::Loaded);
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn test_nested_present_iff_loaded() {
		let table = ReplicaTable::new("shop", "orders");
		assert_eq!(table.try_get_nested().is_some(), table.is_loaded());
		table.set_nested(nested(&[])).unwrap();
		assert_eq!(table.try_get_nested().is_some(), table.is_loaded());
	}
}
