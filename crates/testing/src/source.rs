// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scriptable in-memory remote database.

use std::collections::{BTreeMap, BTreeSet};

use mirror_catalog::ColumnDef;
use mirror_replica::{
	Change, ChangeEvent, ConnectionConfig, Lsn, ReplicaError, ReplicationSource, Result, Snapshot, TableStructure,
};
use mirror_type::{Row, Value};
use parking_lot::RwLock;

struct RemoteTable {
	structure: TableStructure,
	rows: BTreeMap<Vec<Value>, Row>,
}

impl RemoteTable {
	fn key_of(&self, row: &Row) -> Vec<Value> {
		if self.structure.primary_key.is_empty() {
			return row.clone();
		}
		self.structure.primary_key.iter().map(|&idx| row.get(idx).cloned().unwrap_or(Value::Undefined)).collect()
	}
}

#[derive(Default)]
struct State {
	tables: BTreeMap<String, RemoteTable>,
	changes: Vec<ChangeEvent>,
	lsn: Lsn,
	unavailable: bool,
	failing_snapshots: BTreeSet<String>,
	snapshot_counts: BTreeMap<String, usize>,
}

/// Remote database kept in memory. Every write advances the lsn by one and
/// is appended to the change stream.
pub struct MemorySource {
	config: ConnectionConfig,
	state: RwLock<State>,
}

impl MemorySource {
	pub fn new(database: impl Into<String>) -> Self {
		Self {
			config: ConnectionConfig {
				host: "localhost".to_string(),
				port: 5432,
				database: database.into(),
				user: "replica".to_string(),
				password: "replica".to_string(),
			},
			state: RwLock::new(State::default()),
		}
	}

	pub fn with_table(self, name: impl Into<String>, columns: Vec<ColumnDef>, primary_key: Vec<usize>) -> Self {
		self.create_table(name, columns, primary_key);
		self
	}

	pub fn create_table(&self, name: impl Into<String>, columns: Vec<ColumnDef>, primary_key: Vec<usize>) {
		self.state.write().tables.insert(name.into(), RemoteTable {
			structure: TableStructure {
				columns,
				primary_key,
			},
			rows: BTreeMap::new(),
		});
	}

	/// Engine arguments that point at this source.
	pub fn engine_arguments(&self) -> Vec<String> {
		vec![
			format!("{}:{}", self.config.host, self.config.port),
			self.config.database.clone(),
			self.config.user.clone(),
			self.config.password.clone(),
		]
	}

	pub fn insert(&self, table: &str, row: Row) -> Lsn {
		self.write(table, Change::Insert(row))
	}

	pub fn update(&self, table: &str, row: Row) -> Lsn {
		self.write(table, Change::Update(row))
	}

	pub fn delete(&self, table: &str, key: Vec<Value>) -> Lsn {
		self.write(table, Change::Delete(key))
	}

	/// Applies `change` to `table` and records it. Changes to unknown tables
	/// are only recorded.
	pub fn write(&self, table: &str, change: Change) -> Lsn {
		let mut state = self.state.write();
		state.lsn = Lsn(state.lsn.0 + 1);
		let lsn = state.lsn;

		if let Some(remote) = state.tables.get_mut(table) {
			match &change {
				Change::Insert(row) | Change::Update(row) => {
					let key = remote.key_of(row);
					remote.rows.insert(key, row.clone());
				}
				Change::Delete(key) => {
					remote.rows.remove(key);
				}
			}
		}

		state.changes.push(ChangeEvent {
			lsn,
			table: table.to_string(),
			change,
		});
		lsn
	}

	/// Makes schema discovery fail while set.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.state.write().unavailable = unavailable;
	}

	/// Makes snapshots of `table` fail while set.
	pub fn fail_snapshot(&self, table: &str, fail: bool) {
		let mut state = self.state.write();
		if fail {
			state.failing_snapshots.insert(table.to_string());
		} else {
			state.failing_snapshots.remove(table);
		}
	}

	pub fn snapshot_count(&self, table: &str) -> usize {
		self.state.read().snapshot_counts.get(table).copied().unwrap_or(0)
	}

	pub fn remote_rows(&self, table: &str) -> Vec<Row> {
		self.state.read().tables.get(table).map(|remote| remote.rows.values().cloned().collect()).unwrap_or_default()
	}
}

fn unknown(table: &str) -> mirror_type::Error {
	ReplicaError::UnknownRemoteTable {
		table: table.to_string(),
	}
	.into()
}

impl ReplicationSource for MemorySource {
	fn config(&self) -> &ConnectionConfig {
		&self.config
	}

	fn tables(&self) -> Result<Vec<String>> {
		let state = self.state.read();
		if state.unavailable {
			return Err(ReplicaError::SourceUnavailable {
				reason: "connection refused".to_string(),
			}
			.into());
		}
		Ok(state.tables.keys().cloned().collect())
	}

	fn table_structure(&self, table: &str) -> Result<TableStructure> {
		self.state.read().tables.get(table).map(|remote| remote.structure.clone()).ok_or_else(|| unknown(table))
	}

	fn snapshot(&self, table: &str) -> Result<Snapshot> {
		let mut state = self.state.write();
		if state.failing_snapshots.contains(table) {
			return Err(ReplicaError::SourceUnavailable {
				reason: format!("snapshot of '{}' failed", table),
			}
			.into());
		}

		let lsn = state.lsn;
		let rows = state.tables.get(table).map(|remote| remote.rows.values().cloned().collect::<Vec<_>>());
		let Some(rows) = rows else {
			return Err(unknown(table));
		};

		*state.snapshot_counts.entry(table.to_string()).or_insert(0) += 1;
		Ok(Snapshot {
			lsn,
			rows,
		})
	}

	fn changes(&self, since: Lsn, limit: usize) -> Result<Vec<ChangeEvent>> {
		let state = self.state.read();
		Ok(state.changes.iter().filter(|event| event.lsn > since).take(limit).cloned().collect())
	}

	fn current_lsn(&self) -> Result<Lsn> {
		Ok(self.state.read().lsn)
	}
}

#[cfg(test)]
mod tests {
	use mirror_type::Type;

	use super::*;

	fn source() -> MemorySource {
		MemorySource::new("shop").with_table(
			"orders",
			vec![ColumnDef::new("id", Type::Int8), ColumnDef::new("item", Type::Utf8)],
			vec![0],
		)
	}

	#[test]
	fn test_writes_advance_lsn() {
		let source = source();
		assert_eq!(source.insert("orders", vec![Value::int8(1), Value::utf8("book")]), Lsn(1));
		assert_eq!(source.update("orders", vec![Value::int8(1), Value::utf8("pen")]), Lsn(2));
		assert_eq!(source.current_lsn().unwrap(), Lsn(2));
		assert_eq!(source.remote_rows("orders"), vec![vec![Value::int8(1), Value::utf8("pen")]]);
	}

	#[test]
	fn test_changes_since() {
		let source = source();
		source.insert("orders", vec![Value::int8(1), Value::utf8("book")]);
		source.insert("orders", vec![Value::int8(2), Value::utf8("pen")]);
		source.delete("orders", vec![Value::int8(1)]);

		let changes = source.changes(Lsn(1), 10).unwrap();
		assert_eq!(changes.len(), 2);
		assert_eq!(changes[0].lsn, Lsn(2));
		assert_eq!(source.changes(Lsn(0), 1).unwrap().len(), 1);
	}

	#[test]
	fn test_snapshot() {
		let source = source();
		source.insert("orders", vec![Value::int8(1), Value::utf8("book")]);

		let snapshot = source.snapshot("orders").unwrap();
		assert_eq!(snapshot.lsn, Lsn(1));
		assert_eq!(snapshot.rows.len(), 1);
		assert_eq!(source.snapshot_count("orders"), 1);

		source.fail_snapshot("orders", true);
		assert!(source.snapshot("orders").is_err());
		assert_eq!(source.snapshot("customers").unwrap_err().code(), "REPLICA_010");
	}

	#[test]
	fn test_unavailable() {
		let source = source();
		source.set_unavailable(true);
		assert_eq!(source.tables().unwrap_err().code(), "REPLICA_011");
	}
}
