// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, collections::BTreeMap, sync::Arc};

use mirror_type::{Row, Value};
use parking_lot::RwLock;

use crate::{Result, Storage, StorageId, StorageKind, TableDefinition};

#[derive(Debug, Clone)]
struct VersionedRow {
	version: u64,
	/// `None` marks a deletion at `version`.
	row: Option<Row>,
}

/// Rows keyed by primary key where the newest version wins.
///
/// Writes carrying a version older than the stored one are ignored, which
/// makes replaying a change stream over a snapshot safe.
pub struct ReplacingStorage {
	id: StorageId,
	definition: TableDefinition,
	rows: RwLock<BTreeMap<Vec<Value>, VersionedRow>>,
}

impl ReplacingStorage {
	pub fn new(id: StorageId, definition: TableDefinition) -> Self {
		Self {
			id,
			definition,
			rows: RwLock::new(BTreeMap::new()),
		}
	}

	pub fn definition(&self) -> &TableDefinition {
		&self.definition
	}

	/// Returns whether the write replaced the stored version.
	pub fn upsert(&self, row: Row, version: u64) -> Result<bool> {
		self.definition.check_row(&row)?;
		let key = self.definition.key_of(&row);
		Ok(Self::apply(&mut self.rows.write(), key, Some(row), version))
	}

	/// Applies `rows` under a single write lock. Every row is validated
	/// before any of them is written.
	pub fn upsert_batch(&self, rows: &[Row], version: u64) -> Result<usize> {
		for row in rows {
			self.definition.check_row(row)?;
		}

		let mut guard = self.rows.write();
		let mut applied = 0;
		for row in rows {
			let key = self.definition.key_of(row);
			if Self::apply(&mut guard, key, Some(row.clone()), version) {
				applied += 1;
			}
		}
		Ok(applied)
	}

	pub fn delete(&self, key: Vec<Value>, version: u64) -> bool {
		Self::apply(&mut self.rows.write(), key, None, version)
	}

	pub fn get(&self, key: &[Value]) -> Option<Row> {
		self.rows.read().get(key).and_then(|v| v.row.clone())
	}

	pub fn version_of(&self, key: &[Value]) -> Option<u64> {
		self.rows.read().get(key).map(|v| v.version)
	}

	pub fn truncate(&self) {
		self.rows.write().clear();
	}

	fn apply(rows: &mut BTreeMap<Vec<Value>, VersionedRow>, key: Vec<Value>, row: Option<Row>, version: u64) -> bool {
		match rows.get(&key) {
			Some(existing) if existing.version > version => false,
			_ => {
				rows.insert(key, VersionedRow {
					version,
					row,
				});
				true
			}
		}
	}
}

impl Storage for ReplacingStorage {
	fn id(&self) -> &StorageId {
		&self.id
	}

	fn kind(&self) -> StorageKind {
		StorageKind::Replacing
	}

	fn scan(&self) -> Vec<Row> {
		self.rows.read().values().filter_map(|v| v.row.clone()).collect()
	}

	fn len(&self) -> usize {
		self.rows.read().values().filter(|v| v.row.is_some()).count()
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
	use mirror_type::Type;

	use super::*;
	use crate::ColumnDef;

	fn storage() -> ReplacingStorage {
		ReplacingStorage::new(
			StorageId::new("db", "orders"),
			TableDefinition::new(
				"orders",
				vec![ColumnDef::new("id", Type::Int8), ColumnDef::new("item", Type::Utf8)],
				vec![0],
				StorageKind::Replacing,
			),
		)
	}

	fn row(id: i64, item: &str) -> Row {
		vec![Value::int8(id), Value::utf8(item)]
	}

	#[test]
	fn test_newer_version_replaces() {
		let storage = storage();
		assert!(storage.upsert(row(1, "pen"), 1).unwrap());
		assert!(storage.upsert(row(1, "ink"), 2).unwrap());

		assert_eq!(storage.get(&[Value::int8(1)]), Some(row(1, "ink")));
		assert_eq!(storage.len(), 1);
	}

	#[test]
	fn test_older_version_is_ignored() {
		let storage = storage();
		storage.upsert(row(1, "ink"), 5).unwrap();
		assert!(!storage.upsert(row(1, "pen"), 3).unwrap());

		assert_eq!(storage.get(&[Value::int8(1)]), Some(row(1, "ink")));
		assert_eq!(storage.version_of(&[Value::int8(1)]), Some(5));
	}

	#[test]
	fn test_delete_is_versioned_tombstone() {
		let storage = storage();
		storage.upsert(row(1, "pen"), 1).unwrap();
		assert!(storage.delete(vec![Value::int8(1)], 2));

		assert!(storage.get(&[Value::int8(1)]).is_none());
		assert!(storage.is_empty());

		// a late insert from before the delete must not resurrect the row
		assert!(!storage.upsert(row(1, "pen"), 1).unwrap());
		assert!(storage.scan().is_empty());
	}

	#[test]
	fn test_batch_rejects_before_writing() {
		let storage = storage();
		let rows = vec![row(1, "pen"), vec![Value::int8(2)]];

		assert!(storage.upsert_batch(&rows, 1).is_err());
		assert!(storage.is_empty());
	}

	#[test]
	fn test_scan_is_key_ordered() {
		let storage = storage();
		storage.upsert_batch(&[row(3, "c"), row(1, "a"), row(2, "b")], 1).unwrap();

		assert_eq!(storage.scan(), vec![row(1, "a"), row(2, "b"), row(3, "c")]);
	}

	#[test]
	fn test_truncate() {
		let storage = storage();
		storage.upsert(row(1, "pen"), 1).unwrap();
		storage.truncate();
		assert!(storage.is_empty());
		assert!(storage.version_of(&[Value::int8(1)]).is_none());
	}
}
