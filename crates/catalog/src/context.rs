// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Per-call context handed to every catalog operation.
//!
//! A context optionally carries a [`SyncToken`]. Tokens are minted by a
//! replica catalog and handed only to its own replication coordinator, so a
//! context carrying the right token identifies the synchronization path. The
//! context also carries the special scalars a query interpreter injects
//! before execution, such as the shard index and count of a distributed query.

use std::{
	collections::BTreeMap,
	fmt::{Display, Formatter},
};

use mirror_type::Value;
use uuid::Uuid;

pub const SHARD_NUM_SCALAR: &str = "_shard_num";
pub const SHARD_COUNT_SCALAR: &str = "_shard_count";

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncToken(Uuid);

impl SyncToken {
	pub fn issue() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Display for SyncToken {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Shard placement of a query dispatched as part of a distributed plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
	pub shard_num: Option<u32>,
	pub shard_count: Option<u32>,
}

impl SelectOptions {
	pub fn shard(shard_num: u32, shard_count: u32) -> Self {
		Self {
			shard_num: Some(shard_num),
			shard_count: Some(shard_count),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct CallerContext {
	sync: Option<SyncToken>,
	scalars: BTreeMap<String, Value>,
}

impl CallerContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Context of the synchronization path of the catalog that issued `token`.
	pub fn synchronization(token: SyncToken) -> Self {
		Self {
			sync: Some(token),
			scalars: BTreeMap::new(),
		}
	}

	/// Context of a select query, with the shard scalars injected.
	pub fn for_select(options: &SelectOptions) -> Self {
		let mut ctx = Self::new();
		ctx.apply_select_options(options);
		ctx
	}

	pub fn apply_select_options(&mut self, options: &SelectOptions) {
		if let Some(num) = options.shard_num {
			self.add_special_scalar(SHARD_NUM_SCALAR, Value::int8(num));
		}
		if let Some(count) = options.shard_count {
			self.add_special_scalar(SHARD_COUNT_SCALAR, Value::int8(count));
		}
	}

	pub fn sync_token(&self) -> Option<SyncToken> {
		self.sync
	}

	/// Whether this context carries exactly `token`.
	pub fn carries(&self, token: &SyncToken) -> bool {
		self.sync.as_ref() == Some(token)
	}

	pub fn add_special_scalar(&mut self, name: impl Into<String>, value: Value) {
		self.scalars.insert(name.into(), value);
	}

	pub fn special_scalar(&self, name: &str) -> Option<&Value> {
		self.scalars.get(name)
	}

	pub fn has_special_scalar(&self, name: &str) -> bool {
		self.scalars.contains_key(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_context_is_not_privileged() {
		let token = SyncToken::issue();
		assert!(!CallerContext::new().carries(&token));
	}

	#[test]
	fn test_foreign_token_is_rejected() {
		let ours = SyncToken::issue();
		let theirs = SyncToken::issue();
		assert_ne!(ours, theirs);

		let ctx = CallerContext::synchronization(theirs);
		assert!(!ctx.carries(&ours));
		assert!(ctx.carries(&theirs));
	}

	#[test]
	fn test_shard_scalars_injected() {
		let ctx = CallerContext::for_select(&SelectOptions::shard(2, 4));

		assert_eq!(ctx.special_scalar(SHARD_NUM_SCALAR), Some(&Value::int8(2)));
		assert_eq!(ctx.special_scalar(SHARD_COUNT_SCALAR), Some(&Value::int8(4)));
		assert!(ctx.sync_token().is_none());
	}

	#[test]
	fn test_only_present_options_are_injected() {
		let ctx = CallerContext::for_select(&SelectOptions {
			shard_num: Some(1),
			shard_count: None,
		});

		assert!(ctx.has_special_scalar(SHARD_NUM_SCALAR));
		assert!(!ctx.has_special_scalar(SHARD_COUNT_SCALAR));
	}
}
