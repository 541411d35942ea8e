// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Shared error and value types for the mirror catalog crates.

pub mod error;
pub mod value;

pub use error::{Diagnostic, Error, IntoDiagnostic};
pub use value::{OrderedF64, Row, Type, Value};

pub type Result<T> = std::result::Result<T, Error>;
