// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{path::PathBuf, sync::Arc};

use mirror_catalog::{AtomicCatalog, Catalog, HostContext, OrdinaryCatalog, StorageFactory};

use crate::{CoordinatorFactory, EngineDefinition, ReplicaCatalog, ReplicationHandlerFactory, ReplicationSource, Result};

/// Variant of the catalog a replica catalog is layered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseCatalog {
	Ordinary,
	#[default]
	Atomic,
}

pub struct ReplicaCatalogBuilder {
	name: String,
	metadata_path: PathBuf,
	definition: EngineDefinition,
	source: Arc<dyn ReplicationSource>,
	base: BaseCatalog,
	host: Option<Arc<HostContext>>,
	storage_factory: Option<StorageFactory>,
	coordinator_factory: Option<Arc<dyn CoordinatorFactory>>,
}

impl ReplicaCatalogBuilder {
	pub fn new(
		name: impl Into<String>,
		metadata_path: impl Into<PathBuf>,
		definition: EngineDefinition,
		source: Arc<dyn ReplicationSource>,
	) -> Self {
		Self {
			name: name.into(),
			metadata_path: metadata_path.into(),
			definition,
			source,
			base: BaseCatalog::default(),
			host: None,
			storage_factory: None,
			coordinator_factory: None,
		}
	}

	pub fn base(mut self, base: BaseCatalog) -> Self {
		self.base = base;
		self
	}

	pub fn ordinary(self) -> Self {
		self.base(BaseCatalog::Ordinary)
	}

	pub fn atomic(self) -> Self {
		self.base(BaseCatalog::Atomic)
	}

	pub fn host(mut self, host: Arc<HostContext>) -> Self {
		self.host = Some(host);
		self
	}

	pub fn storage_factory(mut self, factory: StorageFactory) -> Self {
		self.storage_factory = Some(factory);
		self
	}

	/// Replaces the default [`ReplicationHandlerFactory`].
	pub fn coordinator_factory(mut self, factory: Arc<dyn CoordinatorFactory>) -> Self {
		self.coordinator_factory = Some(factory);
		self
	}

	pub fn build(self) -> Result<Arc<ReplicaCatalog>> {
		let storages = self.storage_factory.unwrap_or_default();
		let base: Box<dyn Catalog> = match self.base {
			BaseCatalog::Ordinary => Box::new(OrdinaryCatalog::new(self.name, self.metadata_path, storages)),
			BaseCatalog::Atomic => Box::new(AtomicCatalog::new(self.name, self.metadata_path, storages)),
		};

		ReplicaCatalog::new(
			base,
			self.host.unwrap_or_default(),
			self.definition,
			self.source,
			self.coordinator_factory.unwrap_or_else(|| Arc::new(ReplicationHandlerFactory)),
		)
	}
}
