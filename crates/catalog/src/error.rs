// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::PathBuf;

use mirror_type::{Diagnostic, Error, IntoDiagnostic, Type};

use crate::StorageKind;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
	#[error("table '{name}' already exists in catalog '{catalog}'")]
	TableAlreadyExists {
		catalog: String,
		name: String,
	},

	#[error("table '{name}' does not exist in catalog '{catalog}'")]
	UnknownTable {
		catalog: String,
		name: String,
	},

	#[error("metadata file '{path}' is corrupted: {reason}")]
	CorruptedMetadata {
		path: PathBuf,
		reason: String,
	},

	#[error("no storage constructor registered for kind {kind}")]
	UnsupportedStorage {
		kind: StorageKind,
	},

	#[error("row has {actual} values, table '{table}' has {expected} columns")]
	RowArity {
		table: String,
		expected: usize,
		actual: usize,
	},

	#[error("column '{column}' of table '{table}' expects {expected}, got {actual}")]
	ColumnType {
		table: String,
		column: String,
		expected: Type,
		actual: Type,
	},

	#[error("unknown macro '{name}'")]
	UnknownMacro {
		name: String,
	},

	#[error("unterminated macro in '{input}'")]
	UnterminatedMacro {
		input: String,
	},
}

impl IntoDiagnostic for CatalogError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			CatalogError::TableAlreadyExists {
				..
			} => Diagnostic::new("CATALOG_001", message)
				.with_help("Drop the existing table first or choose a different name"),
			CatalogError::UnknownTable {
				..
			} => Diagnostic::new("CATALOG_002", message),
			CatalogError::CorruptedMetadata {
				path,
				..
			} => Diagnostic::new("CATALOG_003", message)
				.with_help("Remove or repair the file before loading the catalog again")
				.with_note(format!("file: {}", path.display())),
			CatalogError::UnsupportedStorage {
				..
			} => Diagnostic::new("CATALOG_004", message),
			CatalogError::RowArity {
				..
			} => Diagnostic::new("CATALOG_005", message),
			CatalogError::ColumnType {
				..
			} => Diagnostic::new("CATALOG_008", message),
			CatalogError::UnknownMacro {
				..
			} => Diagnostic::new("CATALOG_006", message)
				.with_help("Define the macro in the host context before using it"),
			CatalogError::UnterminatedMacro {
				..
			} => Diagnostic::new("CATALOG_007", message).with_label("missing closing '}'"),
		}
	}
}

impl From<CatalogError> for Error {
	fn from(err: CatalogError) -> Self {
		mirror_type::error!(err)
	}
}
