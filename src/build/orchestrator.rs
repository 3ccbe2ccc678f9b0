//! Bounded parallel build scheduling
//!
//! Every (platform, entry point) pair becomes one task. Tasks are spawned
//! up front and wait on a semaphore whose capacity is the parallelism
//! ceiling, so at most that many compilers run at once. A task holds its
//! permit only while the compiler runs.
//!
//! Failures never stop other tasks. They are appended to a shared list in
//! the order tasks finish and reported together once every task is done.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::platform::Platform;

/// One build of one entry point for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    pub platform: Platform,
    pub entry_point: String,
}

/// Executes a single task; implemented by the go compiler adapter
pub trait TaskRunner: Send + Sync + 'static {
    fn run(&self, task: &BuildTask) -> Result<()>;
}

/// A task that did not produce a binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub platform: Platform,
    pub entry_point: String,
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error ({}): {}",
            self.platform, self.entry_point, self.message
        )
    }
}

/// Aggregate outcome of a run
#[derive(Debug)]
pub struct BuildReport {
    /// Number of tasks that reached a terminal state
    pub completed: usize,
    /// Failures in completion order
    pub failures: Vec<TaskFailure>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status for this report
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Print every failure to stderr; prints nothing on success
    pub fn print(&self) {
        if self.is_success() {
            return;
        }

        eprintln!(
            "\n{} errors occurred:",
            style(self.failures.len()).red().bold()
        );
        for failure in &self.failures {
            eprintln!("--> {}", failure);
        }
    }
}

/// Resolve the parallelism ceiling from the configured value
///
/// Values of 2 or more are used as given. Anything lower means one less
/// than the number of CPUs, but never less than one.
pub fn effective_parallelism(configured: i32) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    parallelism_for(configured, available)
}

fn parallelism_for(configured: i32, available: usize) -> usize {
    if configured >= 2 {
        return configured as usize;
    }
    if available > 1 {
        available - 1
    } else {
        1
    }
}

/// Schedules tasks over a runner under a concurrency ceiling
pub struct Orchestrator<R: TaskRunner> {
    runner: Arc<R>,
    ceiling: usize,
    progress: ProgressBar,
}

impl<R: TaskRunner> Orchestrator<R> {
    pub fn new(runner: R, ceiling: usize) -> Self {
        Self {
            runner: Arc::new(runner),
            ceiling: ceiling.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Run every task to completion on a dedicated runtime
    pub fn run(&self, platforms: &[Platform], entry_points: &[String]) -> Result<BuildReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start the build scheduler")?;

        Ok(runtime.block_on(self.run_async(platforms, entry_points)))
    }

    /// Build the full platform × entry point matrix
    pub async fn run_async(&self, platforms: &[Platform], entry_points: &[String]) -> BuildReport {
        let start = Instant::now();
        let gate = Arc::new(Semaphore::new(self.ceiling));
        let failures: Arc<Mutex<Vec<TaskFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();

        for platform in platforms {
            for entry_point in entry_points {
                let task = BuildTask {
                    platform: platform.clone(),
                    entry_point: entry_point.clone(),
                };
                let gate = Arc::clone(&gate);
                let runner = Arc::clone(&self.runner);
                let failures = Arc::clone(&failures);
                let progress = self.progress.clone();

                tasks.spawn(async move {
                    let outcome = run_gated(gate, runner, &task, &progress).await;
                    progress.inc(1);

                    if let Err(message) = outcome {
                        let failure = TaskFailure {
                            platform: task.platform,
                            entry_point: task.entry_point,
                            message,
                        };
                        failures
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner())
                            .push(failure);
                    }
                });
            }
        }

        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            // Task bodies never panic; runner panics surface as failures
            if joined.is_ok() {
                completed += 1;
            }
        }
        self.progress.finish_and_clear();

        let failures = std::mem::take(
            &mut *failures
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        BuildReport {
            completed,
            failures,
            duration: start.elapsed(),
        }
    }
}

/// Pending -> Running (permit held) -> Succeeded | Failed -> permit released
async fn run_gated<R: TaskRunner>(
    gate: Arc<Semaphore>,
    runner: Arc<R>,
    task: &BuildTask,
    progress: &ProgressBar,
) -> Result<(), String> {
    let permit = gate
        .acquire_owned()
        .await
        .map_err(|e| format!("build gate closed: {}", e))?;

    progress.suspend(|| println!("--> {:>15}: {}", task.platform.to_string(), task.entry_point));

    let blocking_task = task.clone();
    let outcome = tokio::task::spawn_blocking(move || runner.run(&blocking_task)).await;
    drop(permit);

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(join_error) => Err(format!("build task aborted: {}", join_error)),
    }
}
