//! Simulated processing latency
//!
//! Scheduling wrappers that delay an analysis without touching the scoring
//! logic. A delayed analysis either runs to completion or does not run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::core::analyzer::{AnalysisInput, AnalysisResult, ContentAnalyzer};

/// Error when the background analysis thread dies
#[derive(Debug, thiserror::Error)]
pub enum LatencyError {
    #[error("Analysis worker thread panicked")]
    WorkerPanicked,
}

/// Sleep for `delay`, then analyze on the calling thread
pub fn analyze_after(analyzer: &ContentAnalyzer, input: &AnalysisInput, delay: Duration) -> AnalysisResult {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    analyzer.analyze_input(input)
}

/// An analysis scheduled on a background thread after a delay
pub struct DelayedAnalysis {
    handle: JoinHandle<Option<AnalysisResult>>,
    cancelled: Arc<AtomicBool>,
}

impl DelayedAnalysis {
    /// Schedule an analysis
    ///
    /// # Arguments
    ///
    /// * `analyzer` - Analyzer to run; shares its corpus with the caller
    /// * `input` - Email to analyze
    /// * `delay` - Time to wait before the analysis starts
    pub fn spawn(analyzer: ContentAnalyzer, input: AnalysisInput, delay: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();

        let handle = thread::spawn(move || {
            thread::sleep(delay);
            // Last point at which cancellation is honoured
            if cancelled_clone.load(Ordering::SeqCst) {
                debug!("Delayed analysis cancelled before start");
                return None;
            }
            Some(analyzer.analyze_input(&input))
        });

        Self { handle, cancelled }
    }

    /// Request cancellation. Has no effect once the analysis has started.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the analysis completes or is skipped
    ///
    /// # Returns
    ///
    /// `Some(result)` on completion, `None` if cancelled before it started
    pub fn wait(self) -> Result<Option<AnalysisResult>, LatencyError> {
        self.handle.join().map_err(|_| LatencyError::WorkerPanicked)
    }
}
