// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Background thread with an explicit lifecycle.
//!
//! The stop signal is the disconnection of a channel: [`ReplicationTask::request_stop`]
//! drops the only sender, which wakes a worker blocked in `recv_timeout`.
//! Joining is idempotent and also happens on drop. A join issued from the
//! worker thread itself is skipped, since the worker may release the last
//! reference to its owner.

use std::{
	sync::Arc,
	thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, bounded};
use mirror_type::return_error;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::{LifecycleState, ReplicaError, Result};

pub(crate) struct ReplicationTask {
	name: String,
	state: Arc<Mutex<LifecycleState>>,
	stop: Mutex<Option<Sender<()>>>,
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReplicationTask {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			state: Arc::new(Mutex::new(LifecycleState::NotStarted)),
			stop: Mutex::new(None),
			handle: Mutex::new(None),
		}
	}

	pub fn state(&self) -> LifecycleState {
		*self.state.lock()
	}

	/// Runs `body` on a new named thread. `body` must return once the
	/// receiver reports disconnection.
	pub fn spawn<F>(&self, body: F) -> Result<()>
	where
		F: FnOnce(Receiver<()>) + Send + 'static,
	{
		let mut state = self.state.lock();
		if *state != LifecycleState::NotStarted {
			return_error!(ReplicaError::AlreadyStarted {
				catalog: self.name.clone(),
			});
		}

		let (sender, receiver) = bounded(1);
		let thread_state = self.state.clone();
		let name = self.name.clone();

		let handle = thread::Builder::new()
			.name(format!("replica-{}", self.name))
			.spawn(move || {
				info!(catalog = %name, "replication worker started");
				body(receiver);
				*thread_state.lock() = LifecycleState::Stopped;
				info!(catalog = %name, "replication worker stopped");
			})
			.map_err(|err| ReplicaError::SpawnFailed {
				reason: err.to_string(),
			})?;

		*self.stop.lock() = Some(sender);
		*self.handle.lock() = Some(handle);
		*state = LifecycleState::Running;
		Ok(())
	}

	/// Signals the worker to stop without waiting for it.
	pub fn request_stop(&self) {
		let sender = self.stop.lock().take();
		drop(sender);

		let mut state = self.state.lock();
		match *state {
			LifecycleState::Running => *state = LifecycleState::Stopping,
			LifecycleState::NotStarted => *state = LifecycleState::Stopped,
			LifecycleState::Stopping | LifecycleState::Stopped => {}
		}
	}

	/// Stops the worker and blocks until its thread has exited.
	pub fn join(&self) {
		self.request_stop();

		let Some(handle) = self.handle.lock().take() else {
			return;
		};

		if handle.thread().id() == thread::current().id() {
			debug!(catalog = %self.name, "join requested from the worker thread, detaching");
			return;
		}

		if handle.join().is_err() {
			error!(catalog = %self.name, "replication worker panicked");
		}
		*self.state.lock() = LifecycleState::Stopped;
	}
}

impl Drop for ReplicationTask {
	fn drop(&mut self) {
		self.join();
	}
}

#[cfg(test)]
mod tests {
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	use crossbeam_channel::RecvTimeoutError;

	use super::*;

	fn ticking(ticks: Arc<AtomicUsize>) -> impl FnOnce(Receiver<()>) + Send + 'static {
		move |stop| {
			loop {
				ticks.fetch_add(1, Ordering::SeqCst);
				match stop.recv_timeout(Duration::from_millis(1)) {
					Err(RecvTimeoutError::Timeout) => continue,
					_ => break,
				}
			}
		}
	}

	#[test]
	fn test_lifecycle() {
		let task = ReplicationTask::new("shop");
		assert_eq!(task.state(), LifecycleState::NotStarted);

		let ticks = Arc::new(AtomicUsize::new(0));
		task.spawn(ticking(ticks.clone())).unwrap();
		assert_eq!(task.state(), LifecycleState::Running);

		task.join();
		assert_eq!(task.state(), LifecycleState::Stopped);

		let observed = ticks.load(Ordering::SeqCst);
		thread::sleep(Duration::from_millis(5));
		assert_eq!(ticks.load(Ordering::SeqCst), observed);
	}

	#[test]
	fn test_request_stop_is_idempotent() {
		let task = ReplicationTask::new("shop");
		task.spawn(ticking(Arc::new(AtomicUsize::new(0)))).unwrap();

		task.request_stop();
		task.request_stop();
		assert!(matches!(task.state(), LifecycleState::Stopping | LifecycleState::Stopped));

		task.join();
		task.join();
		assert_eq!(task.state(), LifecycleState::Stopped);
	}

	#[test]
	fn test_spawn_twice_is_rejected() {
		let task = ReplicationTask::new("shop");
		task.spawn(ticking(Arc::new(AtomicUsize::new(0)))).unwrap();

		let err = task.spawn(ticking(Arc::new(AtomicUsize::new(0)))).unwrap_err();
		assert_eq!(err.code(), "REPLICA_013");
	}

	#[test]
	fn test_stop_before_start() {
		let task = ReplicationTask::new("shop");
		task.join();
		assert_eq!(task.state(), LifecycleState::Stopped);
	}

	#[test]
	fn test_drop_joins() {
		let ticks = Arc::new(AtomicUsize::new(0));
		{
			let task = ReplicationTask::new("shop");
			task.spawn(ticking(ticks.clone())).unwrap();
		}
		let observed = ticks.load(Ordering::SeqCst);
		thread::sleep(Duration::from_millis(5));
		assert_eq!(ticks.load(Ordering::SeqCst), observed);
	}
}
