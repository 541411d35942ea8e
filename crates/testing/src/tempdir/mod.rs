// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, fs, path::Path};

use uuid::Uuid;

/// Runs `f` with a fresh directory under the OS temp dir, removed afterwards.
pub fn temp_dir<F, T, E>(f: F) -> Result<T, E>
where
	F: FnOnce(&Path) -> Result<T, E>,
	E: From<std::io::Error>,
{
	let mut path = env::temp_dir();
	path.push(format!("mirror-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_directory_is_removed() {
		let mut seen = None;
		temp_dir(|path| -> std::io::Result<()> {
			assert!(path.is_dir());
			seen = Some(path.to_path_buf());
			Ok(())
		})
		.unwrap();
		assert!(!seen.unwrap().exists());
	}
}
