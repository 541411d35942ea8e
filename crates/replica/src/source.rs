// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Boundary to the remote relational source. Decoding of the logical
//! replication stream happens behind [`ReplicationSource`].

use std::fmt::{Display, Formatter};

use mirror_catalog::ColumnDef;
use mirror_type::{Row, Value};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
	pub host: String,
	pub port: u16,
	pub database: String,
	pub user: String,
	pub password: String,
}

impl ConnectionConfig {
	/// Same server, database and role. Credentials are not compared.
	pub fn same_endpoint(&self, other: &ConnectionConfig) -> bool {
		self.host == other.host && self.port == other.port && self.database == other.database && self.user == other.user
	}
}

impl Display for ConnectionConfig {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
	}
}

impl std::fmt::Debug for ConnectionConfig {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionConfig")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("database", &self.database)
			.field("user", &self.user)
			.field("password", &"***")
			.finish()
	}
}

/// Position in the remote change stream.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lsn(pub u64);

impl Display for Lsn {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:X}/{:X}", self.0 >> 32, self.0 & 0xFFFF_FFFF)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStructure {
	pub columns: Vec<ColumnDef>,
	/// Positions of the replica identity columns.
	pub primary_key: Vec<usize>,
}

/// Consistent copy of one remote table taken at `lsn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
	pub lsn: Lsn,
	pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
	Insert(Row),
	Update(Row),
	/// Primary key values of the removed row.
	Delete(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
	pub lsn: Lsn,
	pub table: String,
	pub change: Change,
}

pub trait ReplicationSource: Send + Sync {
	/// Endpoint this source is connected to.
	fn config(&self) -> &ConnectionConfig;

	/// Names of every table of the remote database.
	fn tables(&self) -> Result<Vec<String>>;

	fn table_structure(&self, table: &str) -> Result<TableStructure>;

	fn snapshot(&self, table: &str) -> Result<Snapshot>;

	/// Up to `limit` events with an lsn strictly greater than `since`, in lsn order.
	fn changes(&self, since: Lsn, limit: usize) -> Result<Vec<ChangeEvent>>;

	/// Position of the newest event in the change stream.
	fn current_lsn(&self) -> Result<Lsn>;
}
