//! Polling a task to a target state

use std::time::Duration;
use tracing::{debug, trace};

use super::{OperationTask, TaskState};
use crate::error::{FileManagerError, Result};
use crate::rpc::traits::ViService;

/// Interval between two status fetches
///
/// The n-th wait is `initial * multiplier^n`, capped at `max`. A multiplier of
/// 1.0 gives a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
	pub initial: Duration,
	pub max: Duration,
	pub multiplier: f64,
}

impl PollPolicy {
	pub fn fixed(interval: Duration) -> Self {
		Self { initial: interval, max: interval, multiplier: 1.0 }
	}

	pub fn backoff(initial: Duration, max: Duration, multiplier: f64) -> Self {
		Self { initial, max: max.max(initial), multiplier: multiplier.max(1.0) }
	}

	/// Delay before the fetch following `attempt` (0-based) fetches
	pub fn delay_for(&self, attempt: u32) -> Duration {
		if self.multiplier <= 1.0 {
			return self.initial;
		}
		let factor = self.multiplier.powi(attempt.min(64) as i32);
		let secs = self.initial.as_secs_f64() * factor;
		if !secs.is_finite() || secs >= self.max.as_secs_f64() {
			self.max
		} else {
			Duration::from_secs_f64(secs)
		}
	}
}

impl Default for PollPolicy {
	fn default() -> Self {
		PollPolicy::fixed(Duration::from_secs(2))
	}
}

/// Drives [`OperationTask`]s by fetching their status from the service
///
/// Each wait needs `&mut OperationTask`, so one task is only ever driven by
/// one loop at a time. Waiting on several tasks concurrently means running
/// several waits, one per task.
pub struct TaskPoller<'a, S: ViService + ?Sized> {
	service: &'a S,
	policy: PollPolicy,
}

impl<'a, S: ViService + ?Sized> TaskPoller<'a, S> {
	pub fn new(service: &'a S, policy: PollPolicy) -> Self {
		Self { service, policy }
	}

	pub fn policy(&self) -> &PollPolicy {
		&self.policy
	}

	/// Fetch the task status once and apply it
	pub async fn refresh(&self, task: &mut OperationTask) -> Result<TaskState> {
		let status = self
			.service
			.fetch_task_status(task.id())
			.await
			.map_err(|fault| FileManagerError::Api { operation: "FetchTaskStatus", fault })?;
		Ok(task.observe(status))
	}

	/// Poll until the task is in one of `targets`
	///
	/// Returns without contacting the service once the task is in a target
	/// state, or in a terminal state it can no longer leave. There is no
	/// built-in bound: if the service never reports a target state this never
	/// returns. Use [`wait_until_timeout`](Self::wait_until_timeout) for a
	/// bounded wait.
	pub async fn wait_until(&self, task: &mut OperationTask, targets: &[TaskState]) -> Result<TaskState> {
		let mut attempt = 0u32;
		loop {
			if targets.contains(&task.state()) {
				return Ok(task.state());
			}
			if task.is_terminal() {
				debug!("Task {} ended in {} outside the awaited states", task.id(), task.state());
				return Ok(task.state());
			}
			if attempt > 0 {
				let delay = self.policy.delay_for(attempt - 1);
				trace!("Task {} is {}, next poll in {:?}", task.id(), task.state(), delay);
				tokio::time::sleep(delay).await;
			}
			self.refresh(task).await?;
			attempt += 1;
		}
	}

	/// [`wait_until`](Self::wait_until) for the terminal states
	pub async fn wait_for_completion(&self, task: &mut OperationTask) -> Result<TaskState> {
		self.wait_until(task, &TaskState::TERMINAL).await
	}

	/// [`wait_until`](Self::wait_until) bounded by `limit`
	///
	/// On expiry this fails with [`FileManagerError::Timeout`]; the task keeps
	/// the last observed state and can be waited on again. The remote task is
	/// not cancelled.
	pub async fn wait_until_timeout(
		&self,
		task: &mut OperationTask,
		targets: &[TaskState],
		limit: Duration,
	) -> Result<TaskState> {
		match tokio::time::timeout(limit, self.wait_until(task, targets)).await {
			Ok(result) => result,
			Err(_) => Err(FileManagerError::Timeout { elapsed: limit }),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_policy() {
		let p = PollPolicy::fixed(Duration::from_millis(500));
		assert_eq!(p.delay_for(0), Duration::from_millis(500));
		assert_eq!(p.delay_for(10), Duration::from_millis(500));
	}

	#[test]
	fn test_backoff_policy_caps_at_max() {
		let p = PollPolicy::backoff(Duration::from_millis(100), Duration::from_secs(1), 2.0);
		assert_eq!(p.delay_for(0), Duration::from_millis(100));
		assert_eq!(p.delay_for(1), Duration::from_millis(200));
		assert_eq!(p.delay_for(3), Duration::from_millis(800));
		assert_eq!(p.delay_for(4), Duration::from_secs(1));
		assert_eq!(p.delay_for(1000), Duration::from_secs(1));
	}

	#[test]
	fn test_backoff_clamps_bad_input() {
		let p = PollPolicy::backoff(Duration::from_secs(2), Duration::from_secs(1), 0.5);
		assert_eq!(p.max, Duration::from_secs(2));
		assert_eq!(p.multiplier, 1.0);
	}

	#[test]
	fn test_default_policy() {
		assert_eq!(PollPolicy::default(), PollPolicy::fixed(Duration::from_secs(2)));
	}
}

// vim: ts=4
