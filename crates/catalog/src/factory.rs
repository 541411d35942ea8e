// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use crate::{CatalogError, MemoryStorage, ReplacingStorage, Result, StorageId, StorageKind, StorageRef, TableDefinition};

type Constructor = Arc<dyn Fn(StorageId, &TableDefinition) -> Result<StorageRef> + Send + Sync>;

/// Rebuilds storages from persisted table definitions.
#[derive(Clone)]
pub struct StorageFactory {
	constructors: HashMap<StorageKind, Constructor>,
}

impl StorageFactory {
	/// A factory without any registered kind.
	pub fn empty() -> Self {
		Self {
			constructors: HashMap::new(),
		}
	}

	pub fn register<F>(mut self, kind: StorageKind, constructor: F) -> Self
	where
		F: Fn(StorageId, &TableDefinition) -> Result<StorageRef> + Send + Sync + 'static,
	{
		self.constructors.insert(kind, Arc::new(constructor));
		self
	}

	pub fn supports(&self, kind: StorageKind) -> bool {
		self.constructors.contains_key(&kind)
	}

	pub fn create(&self, id: StorageId, definition: &TableDefinition) -> Result<StorageRef> {
		match self.constructors.get(&definition.kind) {
			Some(constructor) => constructor(id, definition),
			None => Err(CatalogError::UnsupportedStorage {
				kind: definition.kind,
			}
			.into()),
		}
	}
}

impl Default for StorageFactory {
	fn default() -> Self {
		Self::empty()
			.register(StorageKind::Replacing, |id, definition| {
				Ok(Arc::new(ReplacingStorage::new(id, definition.clone())) as StorageRef)
			})
			.register(StorageKind::Memory, |id, definition| {
				Ok(Arc::new(MemoryStorage::new(id, definition.clone())) as StorageRef)
			})
	}
}

#[cfg(test)]
mod tests {
	use mirror_type::Type;

	use super::*;
	use crate::ColumnDef;

	fn definition(kind: StorageKind) -> TableDefinition {
		TableDefinition::new("t", vec![ColumnDef::new("id", Type::Int8)], vec![0], kind)
	}

	#[test]
	fn test_default_kinds() {
		let factory = StorageFactory::default();

		let storage = factory.create(StorageId::new("db", "t"), &definition(StorageKind::Replacing)).unwrap();
		assert_eq!(storage.kind(), StorageKind::Replacing);

		let storage = factory.create(StorageId::new("db", "t"), &definition(StorageKind::Memory)).unwrap();
		assert_eq!(storage.kind(), StorageKind::Memory);
	}

	#[test]
	fn test_replica_handles_are_not_constructible() {
		let factory = StorageFactory::default();
		assert!(!factory.supports(StorageKind::Replica));

		let err = factory.create(StorageId::new("db", "t"), &definition(StorageKind::Replica)).err().unwrap();
		assert_eq!(err.code(), "CATALOG_004");
	}
}
