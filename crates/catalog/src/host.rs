// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-wide context shared by every catalog of one host.

use std::collections::BTreeMap;

use mirror_type::return_error;

use crate::{CatalogError, Result};

pub const DEFAULT_MAX_INSERT_BLOCK_SIZE: u64 = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
	/// Default number of rows written per insert block.
	pub max_insert_block_size: u64,
}

impl Default for HostSettings {
	fn default() -> Self {
		Self {
			max_insert_block_size: DEFAULT_MAX_INSERT_BLOCK_SIZE,
		}
	}
}

/// Named substitutions applied to configuration strings, e.g. `{shard}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Macros {
	values: BTreeMap<String, String>,
}

impl Macros {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.insert(name.into(), value.into());
		self
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.values.get(name).map(String::as_str)
	}

	/// Replaces every `{name}` in `input` with its value.
	pub fn expand(&self, input: &str) -> Result<String> {
		let mut out = String::with_capacity(input.len());
		let mut rest = input;

		while let Some(open) = rest.find('{') {
			out.push_str(&rest[..open]);
			let after = &rest[open + 1..];
			let Some(close) = after.find('}') else {
				return_error!(CatalogError::UnterminatedMacro {
					input: input.to_string(),
				});
			};

			let name = &after[..close];
			match self.values.get(name) {
				Some(value) => out.push_str(value),
				None => {
					return_error!(CatalogError::UnknownMacro {
						name: name.to_string(),
					});
				}
			}
			rest = &after[close + 1..];
		}

		out.push_str(rest);
		Ok(out)
	}
}

#[derive(Debug, Clone, Default)]
pub struct HostContext {
	pub settings: HostSettings,
	pub macros: Macros,
}

impl HostContext {
	pub fn new(settings: HostSettings, macros: Macros) -> Self {
		Self {
			settings,
			macros,
		}
	}
}
