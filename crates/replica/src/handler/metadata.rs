// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	ffi::OsString,
	fs, io,
	path::{Path, PathBuf},
};

use mirror_type::return_error;
use serde::{Deserialize, Serialize};

use crate::{Lsn, ReplicaError, Result};

const FORMAT_VERSION: u32 = 1;

/// Replication progress persisted next to the catalog directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationMetadata {
	pub version: u32,
	/// Last change stream position applied.
	pub lsn: Lsn,
	/// Position at which each table's snapshot was taken.
	#[serde(default)]
	pub tables: BTreeMap<String, Lsn>,
}

impl ReplicationMetadata {
	pub fn new() -> Self {
		Self {
			version: FORMAT_VERSION,
			..Self::default()
		}
	}

	/// Reads the file at `path`. A missing file yields fresh metadata.
	pub fn load(path: &Path) -> Result<Self> {
		let content = match fs::read(path) {
			Ok(content) => content,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
			Err(err) => return Err(err.into()),
		};

		let metadata: Self = serde_json::from_slice(&content).map_err(|err| ReplicaError::CorruptedMetadata {
			path: path.to_path_buf(),
			reason: err.to_string(),
		})?;

		if metadata.version != FORMAT_VERSION {
			return_error!(ReplicaError::UnsupportedMetadataVersion {
				path: path.to_path_buf(),
				version: metadata.version,
			});
		}
		Ok(metadata)
	}

	/// Replaces the file at `path` through a temporary sibling.
	pub fn persist(&self, path: &Path) -> Result<()> {
		let content = serde_json::to_vec_pretty(self)?;
		let tmp = tmp_path(path);
		fs::write(&tmp, &content)?;
		fs::rename(&tmp, path)?;
		Ok(())
	}

	/// Nothing replicated yet.
	pub fn is_fresh(&self) -> bool {
		self.lsn == Lsn::default() && self.tables.is_empty()
	}

	pub fn snapshot_lsn(&self, table: &str) -> Option<Lsn> {
		self.tables.get(table).copied()
	}
}

fn tmp_path(path: &Path) -> PathBuf {
	let mut tmp = OsString::from(path.as_os_str());
	tmp.push(".tmp");
	PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
	use mirror_testing::temp_dir;

	use super::*;

	#[test]
	fn test_missing_file_is_fresh() -> Result<()> {
		temp_dir(|dir| {
			let metadata = ReplicationMetadata::load(&dir.join("absent.replica_metadata"))?;
			assert_eq!(metadata, ReplicationMetadata::new());
			assert!(metadata.is_fresh());
			Ok(())
		})
	}

	#[test]
	fn test_persist_and_load() -> Result<()> {
		temp_dir(|dir| {
			let path = dir.join("shop.replica_metadata");

			let mut metadata = ReplicationMetadata::new();
			metadata.lsn = Lsn(42);
			metadata.tables.insert("orders".into(), Lsn(40));
			metadata.persist(&path)?;

			assert!(!tmp_path(&path).exists());
			let loaded = ReplicationMetadata::load(&path)?;
			assert_eq!(loaded.lsn, Lsn(42));
			assert_eq!(loaded.snapshot_lsn("orders"), Some(Lsn(40)));
			assert_eq!(loaded.snapshot_lsn("customers"), None);
			assert!(!loaded.is_fresh());
			Ok(())
		})
	}

	#[test]
	fn test_unknown_version() -> Result<()> {
		temp_dir(|dir| {
			let path = dir.join("shop.replica_metadata");
			fs::write(&path, br#"{"version": 7, "lsn": 1}"#)?;

			let err = ReplicationMetadata::load(&path).unwrap_err();
			assert_eq!(err.code(), "REPLICA_007");
			Ok(())
		})
	}

	#[test]
	fn test_corrupted() -> Result<()> {
		temp_dir(|dir| {
			let path = dir.join("shop.replica_metadata");
			fs::write(&path, b"not json")?;

			let err = ReplicationMetadata::load(&path).unwrap_err();
			assert_eq!(err.code(), "REPLICA_008");
			Ok(())
		})
	}
}
