// SPDX-License-Identifier: GPL-3.0-only
//! Capture thread lifecycle
//!
//! Frames are acquired on a dedicated thread so that device reads never block
//! the thread that owns UI state. The controller owns the thread: stopping is
//! a flag flip, and the thread is joined when the controller goes away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Returned by the loop body to keep going or finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Stop,
}

/// Controller for a capture loop running on its own thread
///
/// ```ignore
/// let mut controller = CaptureLoopController::start("capture-video0", move || {
///     match input.next_frame() {
///         Ok(frame) => {
///             handle(frame);
///             LoopAction::Continue
///         }
///         Err(_) => LoopAction::Stop,
///     }
/// });
///
/// controller.request_stop(); // returns immediately
/// drop(controller);          // joins
/// ```
pub struct CaptureLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    iterations: Arc<AtomicU64>,
    name: String,
}

impl CaptureLoopController {
    /// Spawn the loop thread
    ///
    /// `loop_fn` runs repeatedly until it returns `LoopAction::Stop` or a stop
    /// is requested. The stop flag is checked between iterations only, so an
    /// iteration already in flight always completes.
    pub fn start<F>(name: &str, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let iterations = Arc::new(AtomicU64::new(0));
        let thread_stop = Arc::clone(&stop_signal);
        let thread_iterations = Arc::clone(&iterations);
        let thread_name = name.to_string();

        info!(name = %name, "Starting capture loop");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %thread_name, "Capture loop thread started");

                while !thread_stop.load(Ordering::SeqCst) {
                    let action = loop_fn();
                    thread_iterations.fetch_add(1, Ordering::Relaxed);
                    if action == LoopAction::Stop {
                        debug!(name = %thread_name, "Loop requested stop");
                        break;
                    }
                }

                info!(name = %thread_name, "Capture loop thread exiting");
            });

        let thread_handle = match thread_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to spawn capture loop thread");
                None
            }
        };

        Self {
            thread_handle,
            stop_signal,
            iterations,
            name: name.to_string(),
        }
    }

    /// Check if the loop thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Number of completed loop iterations
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Signal the loop to stop without waiting for it
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting capture loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Wait for the thread to finish
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for capture loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Capture loop thread panicked: {:?}", e);
            }
        }
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "CaptureLoopController dropped, stopping loop");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[test]
    fn test_loop_stops_itself() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = CaptureLoopController::start("test-loop", move || {
            let count = counter_clone.fetch_add(1, Ordering::SeqCst);
            if count >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        });

        controller.join();

        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert_eq!(controller.iterations(), 11);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_request_stop_is_non_blocking() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = CaptureLoopController::start("test-stop", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            LoopAction::Continue
        });

        thread::sleep(Duration::from_millis(50));
        controller.request_stop();
        controller.join();
        assert!(counter.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_drop_joins_thread() {
        let finished = Arc::new(AtomicBool::new(false));
        let finished_clone = Arc::clone(&finished);

        let controller = CaptureLoopController::start("test-drop", move || {
            thread::sleep(Duration::from_millis(5));
            finished_clone.store(true, Ordering::SeqCst);
            LoopAction::Continue
        });

        assert!(controller.is_running());
        thread::sleep(Duration::from_millis(30));
        drop(controller);
        assert!(finished.load(Ordering::SeqCst));
    }
}
