// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use mirror_type::{Row, Type, Value, return_error};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
	/// Rows keyed by primary key, the newest version wins. Target of replication.
	Replacing,
	/// Append-only rows.
	Memory,
	/// Placeholder handle owned by a replica catalog, never persisted.
	Replica,
}

impl Display for StorageKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			StorageKind::Replacing => f.write_str("Replacing"),
			StorageKind::Memory => f.write_str("Memory"),
			StorageKind::Replica => f.write_str("Replica"),
		}
	}
}

/// Identity of a storage: owning catalog plus table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId {
	pub catalog: String,
	pub table: String,
}

impl StorageId {
	pub fn new(catalog: impl Into<String>, table: impl Into<String>) -> Self {
		Self {
			catalog: catalog.into(),
			table: table.into(),
		}
	}
}

impl Display for StorageId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.catalog, self.table)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub ty: Type,
}

impl ColumnDef {
	pub fn new(name: impl Into<String>, ty: Type) -> Self {
		Self {
			name: name.into(),
			ty,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
	pub name: String,
	pub columns: Vec<ColumnDef>,
	/// Positions of the primary key columns. Empty means the whole row is the key.
	pub primary_key: Vec<usize>,
	pub kind: StorageKind,
}

impl TableDefinition {
	pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>, primary_key: Vec<usize>, kind: StorageKind) -> Self {
		Self {
			name: name.into(),
			columns,
			primary_key,
			kind,
		}
	}

	/// Checks arity and that every value matches its column type. Undefined
	/// fits any column.
	pub fn check_row(&self, row: &Row) -> Result<()> {
		if row.len() != self.columns.len() {
			return_error!(CatalogError::RowArity {
				table: self.name.clone(),
				expected: self.columns.len(),
				actual: row.len(),
			});
		}

		for (column, value) in self.columns.iter().zip(row) {
			if !column.ty.accepts(value) {
				return_error!(CatalogError::ColumnType {
					table: self.name.clone(),
					column: column.name.clone(),
					expected: column.ty,
					actual: value.get_type(),
				});
			}
		}
		Ok(())
	}

	pub fn key_of(&self, row: &Row) -> Vec<Value> {
		if self.primary_key.is_empty() {
			return row.clone();
		}
		self.primary_key.iter().map(|&idx| row.get(idx).cloned().unwrap_or(Value::Undefined)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn orders() -> TableDefinition {
		TableDefinition::new(
			"orders",
			vec![ColumnDef::new("id", Type::Int8), ColumnDef::new("item", Type::Utf8)],
			vec![0],
			StorageKind::Replacing,
		)
	}

	#[test]
	fn test_key_of_uses_primary_key() {
		let row = vec![Value::int8(1), Value::utf8("pen")];
		assert_eq!(orders().key_of(&row), vec![Value::int8(1)]);
	}

	#[test]
	fn test_key_of_without_primary_key_is_whole_row() {
		let mut def = orders();
		def.primary_key.clear();
		let row = vec![Value::int8(1), Value::utf8("pen")];
		assert_eq!(def.key_of(&row), row);
	}

	#[test]
	fn test_check_row_arity() {
		let err = orders().check_row(&vec![Value::int8(1)]).unwrap_err();
		assert_eq!(err.code(), "CATALOG_005");
	}

	#[test]
	fn test_check_row_column_types() {
		let err = orders().check_row(&vec![Value::utf8("1"), Value::utf8("pen")]).unwrap_err();
		assert_eq!(err.code(), "CATALOG_008");
		assert!(err.message.contains("'id'"));

		assert!(orders().check_row(&vec![Value::int8(1), Value::utf8("pen")]).is_ok());
		assert!(orders().check_row(&vec![Value::int8(1), Value::undefined()]).is_ok());
	}
}
