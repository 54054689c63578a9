//! Handles for remotely executed structural operations
//!
//! A structural call (search, move, copy, delete) returns a task reference.
//! [`OperationTask`] wraps that reference together with the last state
//! observed from the service. The handle is never advanced locally: only
//! [`OperationTask::observe`], fed by a status fetched from the service,
//! changes it, and it never moves backwards.
//!
//! ```text
//! Queued ──► Running ──► Success
//!    │          └──────► Error
//!    └──► Success | Error
//! ```

pub mod poll;

pub use poll::{PollPolicy, TaskPoller};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::TaskError;
use crate::rpc::types::{TaskRef, TaskResult, TaskStatus};

/// State of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
	Queued,
	Running,
	Success,
	Error,
}

impl TaskState {
	/// States every synchronous caller waits for
	pub const TERMINAL: [TaskState; 2] = [TaskState::Success, TaskState::Error];

	pub fn is_terminal(&self) -> bool {
		matches!(self, TaskState::Success | TaskState::Error)
	}

	fn rank(&self) -> u8 {
		match self {
			TaskState::Queued => 0,
			TaskState::Running => 1,
			TaskState::Success | TaskState::Error => 2,
		}
	}
}

impl fmt::Display for TaskState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TaskState::Queued => write!(f, "queued"),
			TaskState::Running => write!(f, "running"),
			TaskState::Success => write!(f, "success"),
			TaskState::Error => write!(f, "error"),
		}
	}
}

/// Error reported by the service for a failed task, kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
	/// Fault type name, e.g. `FileNotFound`
	pub fault_type: String,
	/// Localized message supplied by the service
	pub message: String,
}

impl ErrorDetail {
	pub fn new(fault_type: impl Into<String>, message: impl Into<String>) -> Self {
		Self { fault_type: fault_type.into(), message: message.into() }
	}

	/// Placeholder for an error state the service reported without detail
	pub(crate) fn unspecified() -> Self {
		Self::new("Unspecified", "task failed without error detail")
	}
}

impl fmt::Display for ErrorDetail {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.message, self.fault_type)
	}
}

/// An in-flight or completed structural operation
#[derive(Debug, Clone)]
pub struct OperationTask {
	id: TaskRef,
	operation: &'static str,
	state: TaskState,
	error: Option<ErrorDetail>,
	result: Option<TaskResult>,
	polls: u32,
}

impl OperationTask {
	/// Wrap a freshly returned task reference; the task starts out `Queued`
	pub fn new(id: TaskRef) -> Self {
		Self { id, operation: "Task", state: TaskState::Queued, error: None, result: None, polls: 0 }
	}

	/// Label the task with the remote method that created it
	pub fn with_operation(mut self, operation: &'static str) -> Self {
		self.operation = operation;
		self
	}

	/// Remote method that created the task, `Task` if unknown
	pub fn operation(&self) -> &'static str {
		self.operation
	}

	pub fn id(&self) -> &TaskRef {
		&self.id
	}

	pub fn state(&self) -> TaskState {
		self.state
	}

	pub fn is_terminal(&self) -> bool {
		self.state.is_terminal()
	}

	/// Number of status fetches applied to this handle
	pub fn polls(&self) -> u32 {
		self.polls
	}

	/// Error detail of a failed task
	pub fn error(&self) -> Result<&ErrorDetail, TaskError> {
		match (&self.state, &self.error) {
			(TaskState::Error, Some(detail)) => Ok(detail),
			(state, _) => Err(TaskError::NotInErrorState { state: *state }),
		}
	}

	/// Result payload of a successful task, if the service returned one
	pub fn result(&self) -> Option<&TaskResult> {
		match self.state {
			TaskState::Success => self.result.as_ref(),
			_ => None,
		}
	}

	pub(crate) fn into_result(self) -> Option<TaskResult> {
		match self.state {
			TaskState::Success => self.result,
			_ => None,
		}
	}

	/// Apply a status fetched from the service
	///
	/// Returns the state after the update. Terminal tasks are immutable and a
	/// status older than what was already seen is dropped.
	pub fn observe(&mut self, status: TaskStatus) -> TaskState {
		self.polls += 1;

		if self.state.is_terminal() {
			if status.state != self.state {
				warn!(
					"Task {} reported {} after reaching {}, ignoring",
					self.id, status.state, self.state
				);
			}
			return self.state;
		}

		if status.state.rank() < self.state.rank() {
			warn!("Task {} regressed from {} to {}, ignoring", self.id, self.state, status.state);
			return self.state;
		}

		self.state = status.state;
		match status.state {
			TaskState::Error => {
				self.error = Some(status.error.unwrap_or_else(ErrorDetail::unspecified));
			}
			TaskState::Success => {
				self.result = status.result;
			}
			_ => {}
		}
		self.state
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn status(state: TaskState) -> TaskStatus {
		TaskStatus { state, error: None, result: None }
	}

	#[test]
	fn test_new_task_is_queued() {
		let task = OperationTask::new(TaskRef::new("task-1"));
		assert_eq!(task.state(), TaskState::Queued);
		assert!(!task.is_terminal());
		assert_eq!(task.polls(), 0);
	}

	#[test]
	fn test_queued_to_success_directly() {
		let mut task = OperationTask::new(TaskRef::new("task-1"));
		assert_eq!(task.observe(status(TaskState::Success)), TaskState::Success);
		assert!(task.is_terminal());
	}

	#[test]
	fn test_no_regression() {
		let mut task = OperationTask::new(TaskRef::new("task-1"));
		task.observe(status(TaskState::Running));
		assert_eq!(task.observe(status(TaskState::Queued)), TaskState::Running);
	}

	#[test]
	fn test_terminal_is_immutable() {
		let mut task = OperationTask::new(TaskRef::new("task-1"));
		task.observe(TaskStatus {
			state: TaskState::Error,
			error: Some(ErrorDetail::new("NoPermission", "denied")),
			result: None,
		});
		assert_eq!(task.observe(status(TaskState::Success)), TaskState::Error);
		assert_eq!(task.error().unwrap().fault_type, "NoPermission");
	}

	#[test]
	fn test_error_requires_error_state() {
		let mut task = OperationTask::new(TaskRef::new("task-1"));
		assert_eq!(
			task.error(),
			Err(TaskError::NotInErrorState { state: TaskState::Queued })
		);
		task.observe(status(TaskState::Success));
		assert_eq!(
			task.error(),
			Err(TaskError::NotInErrorState { state: TaskState::Success })
		);
	}

	#[test]
	fn test_error_without_detail_gets_placeholder() {
		let mut task = OperationTask::new(TaskRef::new("task-1"));
		task.observe(status(TaskState::Error));
		assert_eq!(task.error().unwrap(), &ErrorDetail::unspecified());
	}
}

// vim: ts=4
