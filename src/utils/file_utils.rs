//! Email file handling utilities
//!
//! This module reads email text from disk, splits it into subject and body,
//! and collects input files from directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use log::{error, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::core::analyzer::AnalysisInput;

lazy_static! {
    static ref HEADER_LINE: Regex = Regex::new(r"^([A-Za-z0-9-]+):(.*)$").unwrap();
}

/// An email read from disk
#[derive(Debug, Clone)]
pub struct EmailFile {
    pub path: PathBuf,
    pub input: AnalysisInput,
}

/// Limits applied when collecting input files
#[derive(Debug, Clone)]
pub struct FileLimits {
    /// Maximum file size in bytes
    pub max_size: u64,
    /// Maximum number of files collected from a directory
    pub max_files: usize,
}

impl FileLimits {
    /// Build limits from a size in megabytes, saturating on overflow
    pub fn from_megabytes(max_size_mb: u64, max_files: usize) -> Self {
        Self {
            max_size: max_size_mb.saturating_mul(1024 * 1024),
            max_files,
        }
    }
}

impl Default for FileLimits {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024,
            max_files: 1000,
        }
    }
}

/// Split raw email text into subject and body.
///
/// A leading block of `Name: value` header lines (folded continuation lines
/// allowed) ended by a blank line is treated as headers; the `Subject` header
/// becomes the subject and everything after the blank line is the body.
/// Text without such a block is all body.
pub fn parse_email(text: &str) -> AnalysisInput {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut subject: Option<String> = None;
    let mut in_subject = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed.is_empty() {
            // Need at least one header before the separator
            if offset == 0 {
                break;
            }
            let body = &text[offset + line.len()..];
            return AnalysisInput::new(subject.unwrap_or_default(), body);
        }

        if trimmed.starts_with([' ', '\t']) && offset > 0 {
            if in_subject {
                if let Some(s) = subject.as_mut() {
                    s.push(' ');
                    s.push_str(trimmed.trim());
                }
            }
        } else if let Some(caps) = HEADER_LINE.captures(trimmed) {
            in_subject = caps[1].eq_ignore_ascii_case("subject");
            if in_subject && subject.is_none() {
                subject = Some(caps[2].trim().to_string());
            }
        } else {
            break;
        }

        offset += line.len();
    }

    AnalysisInput::new("", text)
}

/// Read an email file from disk.
pub fn read_email_file(path: &Path) -> Result<EmailFile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(EmailFile {
        path: path.to_path_buf(),
        input: parse_email(&text),
    })
}

/// Read a bare email body from disk.
///
/// Unlike [`read_email_file`] no header block is split off. Invalid UTF-8 is
/// decoded lossily and files over the size limit are rejected.
pub fn read_body_file(path: &Path, limits: &FileLimits) -> Result<String> {
    let metadata = fs::metadata(path).with_context(|| format!("Failed to read body file {}", path.display()))?;
    if metadata.len() > limits.max_size {
        bail!(
            "Body file {} exceeds maximum file size ({:.2} MB)",
            path.display(),
            metadata.len() as f64 / 1024.0 / 1024.0
        );
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read body file {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Simple glob pattern matching
pub fn glob_match(text: &str, pattern: &str) -> bool {
    let escaped = regex::escape(pattern).replace(r"\*", ".*").replace(r"\?", ".");
    match Regex::new(&format!("^{}$", escaped)) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

fn within_size(path: &Path, limits: &FileLimits) -> bool {
    match path.metadata() {
        Ok(metadata) if metadata.len() <= limits.max_size => true,
        Ok(metadata) => {
            warn!(
                "Skipping {}: exceeds maximum file size ({:.2} MB)",
                path.display(),
                metadata.len() as f64 / 1024.0 / 1024.0
            );
            false
        }
        Err(e) => {
            error!("Error reading metadata for {}: {}", path.display(), e);
            false
        }
    }
}

/// Collect the email files to analyze
///
/// # Arguments
///
/// * `paths` - Individual files named on the command line
/// * `dir` - Optional directory to walk recursively
/// * `include` - Glob patterns a directory entry must match (empty = all)
/// * `exclude` - Glob patterns that drop a directory entry
/// * `limits` - Size and count limits
///
/// # Returns
///
/// Paths of readable files within the limits
pub fn collect_files(
    paths: &[PathBuf],
    dir: Option<&Path>,
    include: &[String],
    exclude: &[String],
    limits: &FileLimits,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            error!("File not found: {}", path.display());
        } else if !path.is_file() {
            warn!("Skipping {}: not a file", path.display());
        } else if within_size(path, limits) {
            files.push(path.clone());
        }
    }

    if let Some(dir) = dir {
        if !dir.is_dir() {
            error!("Directory not found: {}", dir.display());
            return files;
        }

        let mut collected = 0;
        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if collected >= limits.max_files {
                warn!("Reached maximum file limit ({})", limits.max_files);
                break;
            }

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = path.to_string_lossy();
            let included = include.is_empty() || include.iter().any(|p| glob_match(&name, p));
            let excluded = exclude.iter().any(|p| glob_match(&name, p));
            if included && !excluded && within_size(path, limits) {
                files.push(path.to_path_buf());
                collected += 1;
            }
        }
    }

    files
}
