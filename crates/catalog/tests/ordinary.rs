// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, sync::Arc};

use mirror_catalog::{
	CallerContext, Catalog, ColumnDef, OrdinaryCatalog, ReplacingStorage, StorageFactory, StorageId, StorageKind,
	StorageRef, TableDefinition,
};
use mirror_testing::temp_dir;
use mirror_type::{Result, Type, Value};

fn orders() -> TableDefinition {
	TableDefinition::new(
		"orders",
		vec![ColumnDef::new("id", Type::Int8), ColumnDef::new("item", Type::Utf8)],
		vec![0],
		StorageKind::Replacing,
	)
}

fn storage(definition: &TableDefinition) -> StorageRef {
	Arc::new(ReplacingStorage::new(StorageId::new("shop", &definition.name), definition.clone()))
}

#[test]
fn test_create_persists_definition() -> Result<()> {
	temp_dir(|dir| {
		let path = dir.join("shop");
		let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
		let ctx = CallerContext::new();
		catalog.load_stored_objects(&ctx)?;

		let definition = orders();
		catalog.create_table(&ctx, "orders", storage(&definition), &definition)?;

		assert!(path.join("orders.json").is_file());
		assert!(catalog.try_get_table("orders", &ctx).is_some());
		assert_eq!(catalog.tables(&ctx).names(), vec!["orders".to_string()]);
		Ok(())
	})
}

#[test]
fn test_reload_rebuilds_storages() -> Result<()> {
	temp_dir(|dir| {
		let path = dir.join("shop");
		let ctx = CallerContext::new();
		{
			let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
			catalog.load_stored_objects(&ctx)?;
			let definition = orders();
			catalog.create_table(&ctx, "orders", storage(&definition), &definition)?;
		}

		let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
		catalog.load_stored_objects(&ctx)?;

		let table = catalog.try_get_table("orders", &ctx).unwrap();
		assert_eq!(table.kind(), StorageKind::Replacing);
		assert_eq!(catalog.definition("orders"), Some(orders()));

		let replacing = table.downcast_ref::<ReplacingStorage>().unwrap();
		replacing.upsert(vec![Value::int8(1), Value::utf8("book")], 1)?;
		assert_eq!(table.len(), 1);
		Ok(())
	})
}

#[test]
fn test_duplicate_create() -> Result<()> {
	temp_dir(|dir| {
		let catalog = OrdinaryCatalog::new("shop", dir.join("shop"), StorageFactory::default());
		let ctx = CallerContext::new();
		catalog.load_stored_objects(&ctx)?;

		let definition = orders();
		catalog.create_table(&ctx, "orders", storage(&definition), &definition)?;
		let err = catalog.create_table(&ctx, "orders", storage(&definition), &definition).unwrap_err();
		assert_eq!(err.code(), "CATALOG_001");
		Ok(())
	})
}

#[test]
fn test_drop_table() -> Result<()> {
	temp_dir(|dir| {
		let path = dir.join("shop");
		let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
		let ctx = CallerContext::new();
		catalog.load_stored_objects(&ctx)?;

		let definition = orders();
		catalog.create_table(&ctx, "orders", storage(&definition), &definition)?;
		catalog.drop_table(&ctx, "orders", false)?;

		assert!(catalog.try_get_table("orders", &ctx).is_none());
		assert!(!path.join("orders.json").exists());

		let err = catalog.drop_table(&ctx, "orders", false).unwrap_err();
		assert_eq!(err.code(), "CATALOG_002");
		Ok(())
	})
}

#[test]
fn test_drop_catalog_removes_directory() -> Result<()> {
	temp_dir(|dir| {
		let path = dir.join("shop");
		let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
		let ctx = CallerContext::new();
		catalog.load_stored_objects(&ctx)?;

		let definition = orders();
		catalog.create_table(&ctx, "orders", storage(&definition), &definition)?;
		catalog.drop_catalog(&ctx)?;

		assert!(!path.exists());
		assert_eq!(catalog.tables(&ctx).len(), 0);
		Ok(())
	})
}

#[test]
fn test_corrupted_definition() -> Result<()> {
	temp_dir(|dir| {
		let path = dir.join("shop");
		fs::create_dir_all(&path)?;
		fs::write(path.join("orders.json"), b"{ not json")?;

		let catalog = OrdinaryCatalog::new("shop", &path, StorageFactory::default());
		let err = catalog.load_stored_objects(&CallerContext::new()).unwrap_err();
		assert_eq!(err.code(), "CATALOG_003");
		Ok(())
	})
}
