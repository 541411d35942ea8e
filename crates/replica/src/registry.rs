// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use mirror_catalog::StorageRef;
use parking_lot::RwLock;

use crate::ReplicaTable;

/// Name to handle map of one replica catalog. Read by query threads, written
/// only during synchronization startup and table drops.
#[derive(Default)]
pub struct TableRegistry {
	tables: RwLock<HashMap<String, Arc<ReplicaTable>>>,
}

impl TableRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the handle previously registered under the same name, if any.
	pub fn insert(&self, table: Arc<ReplicaTable>) -> Option<Arc<ReplicaTable>> {
		self.tables.write().insert(table.name().to_string(), table)
	}

	pub fn get(&self, name: &str) -> Option<Arc<ReplicaTable>> {
		self.tables.read().get(name).cloned()
	}

	pub fn clear(&self) {
		self.tables.write().clear();
	}

	pub fn contains(&self, name: &str) -> bool {
		self.tables.read().contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.tables.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// `(name, nested storage)` of every loaded handle, sorted by name.
	pub fn loaded(&self) -> Vec<(String, StorageRef)> {
		let mut loaded: Vec<(String, StorageRef)> = self
			.tables
			.read()
			.iter()
			.filter_map(|(name, table)| table.try_get_nested().map(|nested| (name.clone(), nested)))
			.collect();
		loaded.sort_by(|l, r| l.0.cmp(&r.0));
		loaded
	}
}

#[cfg(test)]
mod tests {
	use mirror_catalog::{ColumnDef, MemoryStorage, StorageId, StorageKind, TableDefinition};
	use mirror_type::Type;

	use super::*;

	fn nested() -> StorageRef {
		let definition =
			TableDefinition::new("t", vec![ColumnDef::new("id", Type::Int8)], vec![], StorageKind::Memory);
		Arc::new(MemoryStorage::new(StorageId::new("shop", "t"), definition))
	}

	#[test]
	fn test_insert_and_get() {
		let registry = TableRegistry::new();
		assert!(registry.insert(Arc::new(ReplicaTable::new("shop", "orders"))).is_none());

		assert!(registry.contains("orders"));
		assert_eq!(registry.get("orders").unwrap().name(), "orders");
		assert!(registry.get("customers").is_none());
	}

	#[test]
	fn test_insert_replaces_wholesale() {
		let registry = TableRegistry::new();
		let first = Arc::new(ReplicaTable::new("shop", "orders"));
		first.set_nested(nested()).unwrap();
		registry.insert(first);

		let previous = registry.insert(Arc::new(ReplicaTable::new("shop", "orders"))).unwrap();
		assert!(previous.is_loaded());
		assert!(!registry.get("orders").unwrap().is_loaded());
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_loaded_skips_pending() {
		let registry = TableRegistry::new();
		let orders = Arc::new(ReplicaTable::new("shop", "orders"));
		registry.insert(orders.clone());
		registry.insert(Arc::new(ReplicaTable::new("shop", "customers")));
		assert!(registry.loaded().is_empty());

		orders.set_nested(nested()).unwrap();
		let loaded = registry.loaded();
		assert_eq!(loaded.len(), 1);
		assert_eq!(loaded[0].0, "orders");
		assert_eq!(registry.names(), vec!["customers".to_string(), "orders".to_string()]);
	}

	#[test]
	fn test_clear() {
		let registry = TableRegistry::new();
		registry.insert(Arc::new(ReplicaTable::new("shop", "orders")));
		registry.insert(Arc::new(ReplicaTable::new("shop", "customers")));

		registry.clear();
		assert!(registry.is_empty());
		assert!(!registry.contains("orders"));
	}
}
