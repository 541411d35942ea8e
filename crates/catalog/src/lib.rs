// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Generic catalog layer: table definitions, storages, caller contexts and
//! the two on-disk catalog variants the replica catalog is layered on.

mod atomic;
mod catalog;
pub mod context;
pub mod definition;
pub mod error;
mod factory;
pub mod host;
mod ordinary;
mod persist;
pub mod storage;

pub use atomic::{AtomicCatalog, DroppedTable};
pub use catalog::{Catalog, TablesSnapshot};
pub use context::{CallerContext, SelectOptions, SyncToken};
pub use definition::{ColumnDef, StorageId, StorageKind, TableDefinition};
pub use error::CatalogError;
pub use factory::StorageFactory;
pub use host::{HostContext, HostSettings, Macros};
pub use ordinary::OrdinaryCatalog;
pub use storage::{MemoryStorage, ReplacingStorage, Storage, StorageRef};

pub type Result<T> = mirror_type::Result<T>;
