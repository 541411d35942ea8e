// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use mirror_type::Row;

use crate::{StorageId, StorageKind};

mod memory;
mod replacing;

pub use memory::MemoryStorage;
pub use replacing::ReplacingStorage;

pub type StorageRef = Arc<dyn Storage>;

/// A readable table storage registered in a catalog.
pub trait Storage: Send + Sync + 'static {
	fn id(&self) -> &StorageId;

	fn kind(&self) -> StorageKind;

	/// Current rows, in storage order.
	fn scan(&self) -> Vec<Row>;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn as_any(&self) -> &dyn Any;

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl dyn Storage {
	pub fn downcast_ref<T: Storage>(&self) -> Option<&T> {
		self.as_any().downcast_ref::<T>()
	}
}

/// Downcasts a shared storage into its concrete type.
pub fn downcast<T: Storage>(storage: StorageRef) -> Option<Arc<T>> {
	storage.into_any().downcast::<T>().ok()
}
