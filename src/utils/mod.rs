//! Utility modules for the phishing analyzer
//!
//! This module contains email file handling, output formatting, and the
//! simulated-latency scheduling wrapper.

pub mod file_utils;
pub mod latency;
pub mod output_formatter;
