// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared test tooling for the mirror crates.

pub mod coordinator;
mod logging;
pub mod source;
pub mod tempdir;
pub mod util;

pub use coordinator::{CoordinatorEvent, RecordingCoordinator, RecordingFactory};
pub use logging::init_tracing;
pub use source::MemorySource;
pub use tempdir::temp_dir;
pub use util::wait::{wait_for, wait_for_condition};
