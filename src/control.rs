//! Run lifecycle control.
//!
//! [`ExecControl`] is the per-strategy finite-state machine plus the
//! cooperative pause/stop machinery. The computation runs on the caller's
//! thread; `pause`/`resume`/`stop` are expected from another thread, so
//! the request flags are atomics and the pause wait is a condvar block —
//! never a poll loop. Strategies call [`ExecControl::checkpoint`] once per
//! loop boundary (iteration, generation, node expansion), which bounds the
//! worst-case pause/stop latency.

use crate::model::Termination;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Strategy lifecycle state.
///
/// `Initialized → Running → {Paused ⇄ Running} → {Completed | Stopped |
/// Error}`; the three last states are terminal for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Constructed and parameterized; no run active.
    Initialized,
    /// A run is executing.
    Running,
    /// A run is blocked waiting for `resume()` or `stop()`.
    Paused,
    /// The last run finished normally (including soft time-limit exit).
    Completed,
    /// The last run honored a `stop()` request.
    Stopped,
    /// The last run faulted.
    Error,
}

impl State {
    /// Whether this state ends a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Error)
    }
}

/// Transient progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Completion fraction, 0.0–1.0, non-decreasing within a run.
    pub percent: f64,
    /// Current phase label.
    pub phase: String,
    /// Free-text detail.
    pub message: String,
    /// Wall-clock time consumed so far.
    pub elapsed: Duration,
    /// Estimated remaining time, when the strategy can extrapolate one.
    pub remaining: Option<Duration>,
}

/// Progress notification callback.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// What a run loop should do after a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Keep going.
    Continue,
    /// Unwind and return the best result found so far, tagged `Stopped`.
    Stop,
}

/// FSM, control flags, and progress emission for one strategy instance.
pub struct ExecControl {
    state: Mutex<State>,
    cond: Condvar,
    stop_requested: AtomicBool,
    pause_requested: AtomicBool,
    callback: Mutex<Option<ProgressFn>>,
    last_percent: Mutex<f64>,
}

impl ExecControl {
    /// Creates a control block in the `Initialized` state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Initialized),
            cond: Condvar::new(),
            stop_requested: AtomicBool::new(false),
            pause_requested: AtomicBool::new(false),
            callback: Mutex::new(None),
            last_percent: Mutex::new(0.0),
        }
    }

    /// Current state.
    pub fn status(&self) -> State {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Marks the start of a run: resets request flags and progress, then
    /// transitions to `Running`. Instances are re-runnable; nothing else
    /// survives between runs.
    pub fn begin(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.pause_requested.store(false, Ordering::Release);
        *self.last_percent.lock().expect("progress lock poisoned") = 0.0;
        *self.state.lock().expect("state lock poisoned") = State::Running;
    }

    /// Marks the end of a run with the matching terminal state.
    pub fn finish(&self, termination: Termination) {
        let terminal = match termination {
            Termination::Completed | Termination::TimeLimitExceeded => State::Completed,
            Termination::Stopped => State::Stopped,
            Termination::Error => State::Error,
        };
        *self.state.lock().expect("state lock poisoned") = terminal;
    }

    /// Requests a pause. No-op unless the state is `Running`.
    pub fn pause(&self) {
        let mut state = self.state.lock().expect("state lock poisoned");
        if *state == State::Running {
            self.pause_requested.store(true, Ordering::Release);
            *state = State::Paused;
        }
    }

    /// Requests a resume. No-op unless the state is `Paused`.
    pub fn resume(&self) {
        let mut state = self.state.lock().expect("state lock poisoned");
        if *state == State::Paused {
            self.pause_requested.store(false, Ordering::Release);
            *state = State::Running;
            self.cond.notify_all();
        }
    }

    /// Requests a stop. Valid from any non-terminal state; wakes a paused
    /// run. Cooperative: the run returns at its next checkpoint.
    pub fn stop(&self) {
        let mut state = self.state.lock().expect("state lock poisoned");
        if !state.is_terminal() {
            self.stop_requested.store(true, Ordering::Release);
            *state = State::Stopped;
            self.cond.notify_all();
        }
    }

    /// Loop-boundary suspension point.
    ///
    /// Returns [`Signal::Stop`] when a stop was requested. When a pause
    /// was requested, blocks on the condvar until `resume()` or `stop()`.
    pub fn checkpoint(&self) -> Signal {
        if self.stop_requested.load(Ordering::Acquire) {
            return Signal::Stop;
        }
        if self.pause_requested.load(Ordering::Acquire) {
            let mut state = self.state.lock().expect("state lock poisoned");
            while self.pause_requested.load(Ordering::Acquire)
                && !self.stop_requested.load(Ordering::Acquire)
            {
                state = self.cond.wait(state).expect("state lock poisoned");
            }
            drop(state);
            if self.stop_requested.load(Ordering::Acquire) {
                return Signal::Stop;
            }
        }
        Signal::Continue
    }

    /// Installs (or replaces) the progress callback.
    pub fn set_callback(&self, callback: ProgressFn) {
        *self.callback.lock().expect("callback lock poisoned") = Some(callback);
    }

    /// Emits a progress notification.
    ///
    /// Percentages are clamped to be non-decreasing within the run, so
    /// callbacks observe monotone completion order.
    pub fn emit(&self, mut progress: Progress) {
        {
            let mut last = self.last_percent.lock().expect("progress lock poisoned");
            progress.percent = progress.percent.clamp(*last, 1.0);
            *last = progress.percent;
        }
        let callback = self.callback.lock().expect("callback lock poisoned");
        if let Some(cb) = callback.as_ref() {
            cb(&progress);
        }
    }
}

impl Default for ExecControl {
    fn default() -> Self {
        Self::new()
    }
}
