//! Simple example demonstrating how to use the Phishing Analyzer library

use std::time::Duration;

use anyhow::Result;
use phishing_analyzer::utils::latency::DelayedAnalysis;
use phishing_analyzer::utils::output_formatter::format_result;
use phishing_analyzer::{analyze, AnalysisInput, ContentAnalyzer};

fn main() -> Result<()> {
    let subject = "Account frozen";
    let body = "Your paypal account is frozen, verify now and enter your password at http://192.168.1.1/login";

    println!("Analyzing: {}", subject);
    let result = analyze(subject, body);
    println!("{}", format_result(&result, false));

    // Same analysis behind a simulated processing delay
    let pending = DelayedAnalysis::spawn(
        ContentAnalyzer::default(),
        AnalysisInput::new("Meeting notes", "See you at 3pm tomorrow"),
        Duration::from_millis(500),
    );
    if let Some(result) = pending.wait()? {
        println!("{}", format_result(&result, false));
    }

    Ok(())
}
