//! Phishing Analyzer - A heuristic email content analyzer
//!
//! This library scores an email's subject and body for phishing indicators
//! (urgency, financial bait, social-engineering keywords, suspicious URLs and
//! credential requests) and classifies it as safe, suspicious or phishing.

pub mod core;
pub mod utils;

// Re-export main analyzer types for convenience
pub use crate::core::analyzer::{AnalysisInput, AnalysisResult, ContentAnalyzer};
pub use crate::core::patterns::{load_corpus, CorpusConfig, CorpusError, PatternCorpus};
pub use crate::core::verdict::Verdict;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze a subject and body with the built-in corpus
///
/// This is a convenience function for simple use cases.
pub fn analyze(subject: &str, body: &str) -> AnalysisResult {
    ContentAnalyzer::default().analyze(subject, body)
}

/// Library configuration and utilities
pub mod config {
    use std::path::Path;
    use std::sync::Arc;

    use log::info;

    use crate::core::patterns::{load_corpus, CorpusConfig, CorpusError, PatternCorpus, DEFAULT_CORPUS};

    /// Create the default corpus configuration
    pub fn default_config() -> CorpusConfig {
        CorpusConfig::default()
    }

    /// Resolve the corpus to use: the file at `path` if given, otherwise the
    /// built-in corpus.
    pub fn resolve_corpus(path: Option<&Path>) -> Result<Arc<PatternCorpus>, CorpusError> {
        match path {
            Some(path) => Ok(Arc::new(load_corpus(path)?)),
            None => {
                info!("Using built-in corpus");
                Ok(Arc::clone(&DEFAULT_CORPUS))
            }
        }
    }
}

/// Batch analysis functionality used by the command-line front end
pub mod app {
    use std::time::Duration;

    use log::warn;
    use rayon::prelude::*;

    use crate::core::analyzer::{AnalysisInput, AnalysisResult, ContentAnalyzer};
    use crate::utils::latency::analyze_after;

    /// Options for a batch run
    #[derive(Debug, Clone, Default)]
    pub struct RunOptions {
        /// Number of worker threads (0 = available parallelism)
        pub workers: usize,
        /// Simulated latency applied before each analysis
        pub delay: Duration,
    }

    /// Resolve the worker count, treating 0 as "use all cores"
    pub fn worker_count(requested: usize) -> usize {
        if requested == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            requested
        }
    }

    /// Run the analyzer on multiple emails in parallel
    ///
    /// # Arguments
    ///
    /// * `inputs` - Source names paired with the emails to analyze
    /// * `analyzer` - Analyzer shared by all workers
    /// * `options` - Worker count and simulated latency
    /// * `on_done` - Called once after each email is analyzed
    ///
    /// # Returns
    ///
    /// Results in input order. Blank inputs are skipped.
    pub fn run_analyzer<F>(
        inputs: &[(String, AnalysisInput)],
        analyzer: &ContentAnalyzer,
        options: &RunOptions,
        on_done: F,
    ) -> anyhow::Result<Vec<(String, AnalysisResult)>>
    where
        F: Fn() + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count(options.workers))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))?;

        let results = pool.install(|| {
            inputs
                .par_iter()
                .filter_map(|(source, input)| {
                    let result = if input.is_blank() {
                        warn!("Skipping {}: subject and body are empty", source);
                        None
                    } else {
                        Some((source.clone(), analyze_after(analyzer, input, options.delay)))
                    };
                    on_done();
                    result
                })
                .collect()
        });

        Ok(results)
    }
}
