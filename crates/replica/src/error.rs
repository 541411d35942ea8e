// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::PathBuf;

use mirror_type::{Diagnostic, Error, IntoDiagnostic};

#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
	#[error("invalid value '{value}' for setting '{key}': {reason}")]
	InvalidSetting {
		key: String,
		value: String,
		reason: String,
	},

	#[error("unknown setting '{key}'")]
	UnknownSetting {
		key: String,
	},

	#[error("engine {engine} expects {expected} arguments, got {actual}")]
	InvalidEngineArguments {
		engine: String,
		expected: usize,
		actual: usize,
	},

	#[error("invalid address '{address}': {reason}")]
	InvalidAddress {
		address: String,
		reason: String,
	},

	#[error("catalog '{catalog}' has already loaded its stored objects")]
	AlreadyLoaded {
		catalog: String,
	},

	#[error("table '{table}' already has a nested storage")]
	NestedAlreadySet {
		table: String,
	},

	#[error("source is connected to {connected}, engine declares {declared}")]
	SourceMismatch {
		declared: String,
		connected: String,
	},

	#[error("metadata file '{path}' has unsupported format version {version}")]
	UnsupportedMetadataVersion {
		path: PathBuf,
		version: u32,
	},

	#[error("metadata file '{path}' is unreadable: {reason}")]
	CorruptedMetadata {
		path: PathBuf,
		reason: String,
	},

	#[error("invalid entry '{entry}' in tables list: {reason}")]
	InvalidTablesList {
		entry: String,
		reason: String,
	},

	#[error("remote table '{table}' does not exist")]
	UnknownRemoteTable {
		table: String,
	},

	#[error("remote source is unavailable: {reason}")]
	SourceUnavailable {
		reason: String,
	},

	#[error("nested storage of '{table}' is not a replacing storage")]
	IncompatibleNested {
		table: String,
	},

	#[error("replication coordinator of '{catalog}' is already running")]
	AlreadyStarted {
		catalog: String,
	},

	#[error("failed to spawn replication worker: {reason}")]
	SpawnFailed {
		reason: String,
	},
}

impl IntoDiagnostic for ReplicaError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			ReplicaError::InvalidSetting {
				..
			} => Diagnostic::new("REPLICA_001", message),
			ReplicaError::UnknownSetting {
				..
			} => Diagnostic::new("REPLICA_002", message)
				.with_help("Recognized settings are max_block_size, tables_list and poll_interval_ms"),
			ReplicaError::InvalidEngineArguments {
				..
			} => Diagnostic::new("REPLICA_003", message)
				.with_help("Expected arguments: 'host:port', database, user, password"),
			ReplicaError::InvalidAddress {
				..
			} => Diagnostic::new("REPLICA_004", message),
			ReplicaError::AlreadyLoaded {
				..
			} => Diagnostic::new("REPLICA_005", message),
			ReplicaError::NestedAlreadySet {
				..
			} => Diagnostic::new("REPLICA_006", message).with_label("a loaded table never changes its storage"),
			ReplicaError::UnsupportedMetadataVersion {
				path,
				..
			} => Diagnostic::new("REPLICA_007", message).with_note(format!("file: {}", path.display())),
			ReplicaError::CorruptedMetadata {
				path,
				..
			} => Diagnostic::new("REPLICA_008", message)
				.with_help("Delete the file to force a full resynchronization")
				.with_note(format!("file: {}", path.display())),
			ReplicaError::InvalidTablesList {
				..
			} => Diagnostic::new("REPLICA_009", message),
			ReplicaError::UnknownRemoteTable {
				..
			} => Diagnostic::new("REPLICA_010", message),
			ReplicaError::SourceUnavailable {
				..
			} => Diagnostic::new("REPLICA_011", message),
			ReplicaError::IncompatibleNested {
				..
			} => Diagnostic::new("REPLICA_012", message),
			ReplicaError::AlreadyStarted {
				..
			} => Diagnostic::new("REPLICA_013", message),
			ReplicaError::SpawnFailed {
				..
			} => Diagnostic::new("REPLICA_014", message),
			ReplicaError::SourceMismatch {
				..
			} => Diagnostic::new("REPLICA_015", message)
				.with_help("Pass a source opened with the engine arguments of the declaration"),
		}
	}
}

impl From<ReplicaError> for Error {
	fn from(err: ReplicaError) -> Self {
		mirror_type::error!(err)
	}
}
