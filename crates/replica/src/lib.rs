// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Replica catalog: a catalog whose tables mirror a remote database and are
//! kept current by a background replication coordinator.

mod builder;
mod catalog;
mod coordinator;
pub mod error;
pub mod handler;
mod registry;
pub mod settings;
mod source;
mod table;

pub use builder::{BaseCatalog, ReplicaCatalogBuilder};
pub use catalog::{ENGINE_NAME, METADATA_SUFFIX, ReplicaCatalog};
pub use coordinator::{CoordinatorConfig, CoordinatorFactory, LifecycleState, ReplicationCoordinator, SyncContext};
pub use error::ReplicaError;
pub use handler::{ReplicationHandler, ReplicationHandlerFactory};
pub use registry::TableRegistry;
pub use settings::{EngineDefinition, ReplicaSettings};
pub use source::{Change, ChangeEvent, ConnectionConfig, Lsn, ReplicationSource, Snapshot, TableStructure};
pub use table::{ReplicaTable, TableState};

pub type Result<T> = mirror_type::Result<T>;
