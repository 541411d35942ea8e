// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a test-writer subscriber filtered by `RUST_LOG`, defaulting to
/// debug for the mirror crates. Safe to call from every test.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mirror_catalog=debug,mirror_replica=debug"));
	let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}
