//! Core module for content analysis
//!
//! This module contains the pattern corpus, the matching and scoring pass,
//! and verdict classification.

pub mod analyzer;
pub mod patterns;
pub mod verdict;
