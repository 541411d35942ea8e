// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! On-disk layout shared by the catalog variants: one JSON document per
//! table, named after the escaped table name.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CatalogError, Result, TableDefinition};

const DEFINITION_EXTENSION: &str = "json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredTable {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uuid: Option<Uuid>,
	pub definition: TableDefinition,
}

/// Keeps ASCII alphanumerics and `_`, percent-encodes every other byte.
pub(crate) fn escape_for_file_name(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for byte in name.bytes() {
		if byte.is_ascii_alphanumeric() || byte == b'_' {
			out.push(byte as char);
		} else {
			out.push_str(&format!("%{:02X}", byte));
		}
	}
	out
}

pub(crate) fn definition_path(dir: &Path, name: &str) -> PathBuf {
	dir.join(format!("{}.{}", escape_for_file_name(name), DEFINITION_EXTENSION))
}

/// Writes `stored` to `path`. With `atomic`, the document is written to a
/// temporary sibling first and renamed into place.
pub(crate) fn write_stored(path: &Path, stored: &StoredTable, atomic: bool) -> Result<()> {
	let content = serde_json::to_vec_pretty(stored)?;
	if atomic {
		let tmp = path.with_extension(format!("{}.tmp", DEFINITION_EXTENSION));
		fs::write(&tmp, &content)?;
		fs::rename(&tmp, path)?;
	} else {
		fs::write(path, &content)?;
	}
	Ok(())
}

pub(crate) fn read_stored(path: &Path) -> Result<StoredTable> {
	let content = fs::read(path)?;
	serde_json::from_slice(&content).map_err(|err| {
		CatalogError::CorruptedMetadata {
			path: path.to_path_buf(),
			reason: err.to_string(),
		}
		.into()
	})
}

/// Definition files directly under `dir`, sorted by path.
pub(crate) fn list_definitions(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut paths = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension().is_some_and(|ext| ext == DEFINITION_EXTENSION) {
			paths.push(path);
		}
	}
	paths.sort();
	Ok(paths)
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<bool> {
	match fs::remove_file(path) {
		Ok(()) => Ok(true),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
		Err(err) => Err(err.into()),
	}
}

pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<()> {
	match fs::remove_dir_all(path) {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(err) => Err(err.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_escape_keeps_plain_names() {
		assert_eq!(escape_for_file_name("orders_2024"), "orders_2024");
	}

	#[test]
	fn test_escape_encodes_separators() {
		assert_eq!(escape_for_file_name("a/b.c"), "a%2Fb%2Ec");
		assert_eq!(escape_for_file_name("über"), "%C3%BCber");
	}

	#[test]
	fn test_definition_path() {
		let path = definition_path(Path::new("/meta/db"), "my table");
		assert_eq!(path, PathBuf::from("/meta/db/my%20table.json"));
	}
}
