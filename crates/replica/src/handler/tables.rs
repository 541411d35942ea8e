// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use regex::Regex;

use crate::{ReplicaError, Result};

/// Parsed allow-list: comma separated entries, each an exact name or a
/// pattern with `*` and `?` wildcards. An empty list selects everything.
#[derive(Debug, Clone)]
pub struct TablesFilter {
	patterns: Vec<Regex>,
}

impl TablesFilter {
	pub fn parse(list: &str) -> Result<Self> {
		let mut patterns = Vec::new();
		for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
			patterns.push(compile(entry)?);
		}
		Ok(Self {
			patterns,
		})
	}

	pub fn selects_all(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn matches(&self, table: &str) -> bool {
		self.selects_all() || self.patterns.iter().any(|pattern| pattern.is_match(table))
	}

	/// The remote tables this filter selects.
	pub fn resolve<I, S>(&self, remote: I) -> BTreeSet<String>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		remote.into_iter().map(Into::into).filter(|table| self.matches(table)).collect()
	}
}

fn compile(entry: &str) -> Result<Regex> {
	let mut pattern = String::with_capacity(entry.len() + 2);
	pattern.push('^');
	for c in entry.chars() {
		match c {
			'*' => pattern.push_str(".*"),
			'?' => pattern.push('.'),
			c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
		}
	}
	pattern.push('$');

	Regex::new(&pattern).map_err(|err| {
		ReplicaError::InvalidTablesList {
			entry: entry.to_string(),
			reason: err.to_string(),
		}
		.into()
	})
}
