// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

mod diagnostic;
mod r#macro;

pub use diagnostic::{Diagnostic, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

impl Error {
	pub fn new(diagnostic: impl IntoDiagnostic) -> Self {
		Self(Box::new(diagnostic.into_diagnostic()))
	}

	pub fn diagnostic(self) -> Diagnostic {
		*self.0
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}
}

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Self(Box::new(diagnostic))
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::new(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::new(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_includes_code_help_and_notes() {
		let err = Error::new(
			Diagnostic::new("TEST_001", "something broke")
				.with_help("try again")
				.with_note("first note"),
		);

		let out = err.to_string();
		assert!(out.starts_with("[TEST_001] something broke"));
		assert!(out.contains("help: try again"));
		assert!(out.contains("note: first note"));
	}

	#[test]
	fn test_io_error_conversion() {
		let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
		let err: Error = io.into();
		assert_eq!(err.code(), "IO_001");
		assert!(err.message.contains("denied"));
	}

	#[test]
	fn test_cause_is_rendered() {
		let err = Error::new(
			Diagnostic::new("OUTER_001", "outer").with_cause(Diagnostic::new("INNER_001", "inner")),
		);
		assert!(err.to_string().contains("caused by: [INNER_001] inner"));
	}
}
