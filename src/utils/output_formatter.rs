//! Output formatter for analysis results
//!
//! This module renders analysis results for the console and exports them as
//! JSON, HTML, and CSV reports.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::{Color, Colorize};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::core::analyzer::AnalysisResult;
use crate::core::verdict::{Verdict, MAX_SCORE};

/// Number of cells in the console score gauge
const GAUGE_WIDTH: usize = 20;

/// Display bundle for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictDisplay {
    pub label: &'static str,
    pub color: Color,
    pub description: &'static str,
}

impl VerdictDisplay {
    /// CSS color used by the HTML report
    pub fn css_color(&self) -> &'static str {
        match self.color {
            Color::Green => "#27ae60",
            Color::Yellow => "#f39c12",
            _ => "#c0392b",
        }
    }
}

/// Map a verdict to its label, tone color, and description
pub fn verdict_display(verdict: Verdict) -> VerdictDisplay {
    match verdict {
        Verdict::Safe => VerdictDisplay {
            label: "✅ Likely Safe",
            color: Color::Green,
            description: "No significant phishing indicators detected.",
        },
        Verdict::Suspicious => VerdictDisplay {
            label: "⚠️ Suspicious",
            color: Color::Yellow,
            description: "Some concerning elements detected. Exercise caution.",
        },
        Verdict::Phishing => VerdictDisplay {
            label: "❌ Likely Phishing",
            color: Color::Red,
            description: "High risk of phishing. Do not interact with this email.",
        },
    }
}

/// Render a score as a fixed-width gauge, e.g. `[######--------------] 30/100`
pub fn score_gauge(score: u32) -> String {
    let score = score.min(MAX_SCORE);
    let filled = (score as usize * GAUGE_WIDTH) / MAX_SCORE as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled),
        score,
        MAX_SCORE
    )
}

/// Format one analysis result for console output
///
/// # Arguments
///
/// * `result` - Result to render
/// * `use_markdown` - Whether to wrap the output in triple backticks
///
/// # Returns
///
/// Formatted string for console output
pub fn format_result(result: &AnalysisResult, use_markdown: bool) -> String {
    let display = verdict_display(result.verdict());
    let mut output = String::new();

    if use_markdown {
        output.push_str("```\n");
    }

    output.push_str(&format!("{}\n", display.label.color(display.color).bold()));
    output.push_str(&format!("{}\n", display.description));
    output.push_str(&format!("{} {}\n", "Risk Score:".cyan().bold(), score_gauge(result.score())));

    if !result.detected_threats().is_empty() {
        output.push_str(&format!("\n{}\n", "Detected Threats".red().bold()));
        for (i, threat) in result.detected_threats().iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, threat));
        }
    }

    if !result.suspicious_elements().is_empty() {
        output.push_str(&format!("\n{}\n", "Suspicious Elements".yellow().bold()));
        for (i, element) in result.suspicious_elements().iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, element));
        }
    }

    if result.finding_count() == 0 {
        output.push_str("\nNo findings detected.\n");
    }

    if use_markdown {
        output.push_str("```\n");
    }

    output
}

/// Per-verdict totals over a batch of results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub analyzed: usize,
    pub safe: usize,
    pub suspicious: usize,
    pub phishing: usize,
    pub average_score: f64,
}

impl Summary {
    pub fn from_results(all_results: &[(String, AnalysisResult)]) -> Self {
        let mut summary = Summary {
            analyzed: all_results.len(),
            ..Default::default()
        };

        let mut total_score = 0u64;
        for (_, result) in all_results {
            total_score += u64::from(result.score());
            match result.verdict() {
                Verdict::Safe => summary.safe += 1,
                Verdict::Suspicious => summary.suspicious += 1,
                Verdict::Phishing => summary.phishing += 1,
            }
        }

        if !all_results.is_empty() {
            summary.average_score = total_score as f64 / all_results.len() as f64;
        }
        summary
    }
}

/// Create a summary of verdicts for multiple emails
pub fn create_summary(all_results: &[(String, AnalysisResult)]) -> String {
    let summary = Summary::from_results(all_results);
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Analysis Summary".yellow().bold()));
    output.push_str(&format!("{} {}\n", "Emails analyzed:".green(), summary.analyzed));
    output.push_str(&format!("  {} {}\n", "Safe:".green(), summary.safe));
    output.push_str(&format!("  {} {}\n", "Suspicious:".yellow(), summary.suspicious));
    output.push_str(&format!("  {} {}\n", "Phishing:".red(), summary.phishing));
    output.push_str(&format!("{} {:.1}\n", "Average score:".green(), summary.average_score));

    output
}

/// Export results to a JSON file
///
/// Each entry carries the source name and the result fields
/// `verdict`, `score`, `detectedThreats` and `suspiciousElements`.
pub fn export_results_json(all_results: &[(String, AnalysisResult)], output_path: &Path) -> Result<()> {
    let entries: Vec<_> = all_results
        .iter()
        .map(|(source, result)| json!({ "source": source, "result": result }))
        .collect();

    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, &entries).context("Failed to write JSON data")?;

    Ok(())
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Phishing Analysis Report</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
        }
        h1 {
            color: #2c3e50;
            border-bottom: 2px solid #3498db;
            padding-bottom: 10px;
        }
        .timestamp {
            color: #7f8c8d;
            font-size: 0.9em;
            margin-bottom: 30px;
        }
        .summary {
            background-color: #e8f4f8;
            padding: 15px;
            border-radius: 5px;
            margin-bottom: 30px;
        }
        .email {
            background-color: #f8f9fa;
            border-radius: 5px;
            padding: 15px;
            margin-bottom: 20px;
            box-shadow: 0 2px 5px rgba(0,0,0,0.1);
        }
        .verdict {
            font-weight: bold;
            font-size: 1.2em;
        }
        .gauge {
            background-color: #ecf0f1;
            border-radius: 4px;
            height: 10px;
            width: 100%;
        }
        .gauge div {
            border-radius: 4px;
            height: 10px;
        }
        .findings li {
            padding: 5px 0;
            border-bottom: 1px solid #eee;
        }
    </style>
</head>
<body>
    <h1>Phishing Analysis Report</h1>
    <div class="timestamp">Generated on: {{timestamp}}</div>
    <div class="summary">
        <h2>Analysis Summary</h2>
        <p>Emails analyzed: {{summary.analyzed}}</p>
        <p>Safe: {{summary.safe}} &middot; Suspicious: {{summary.suspicious}} &middot; Phishing: {{summary.phishing}}</p>
    </div>
    {{#each emails}}
    <div class="email">
        <h2>{{source}}</h2>
        <div class="verdict" style="color: {{color}}">{{label}}</div>
        <p>{{description}}</p>
        <p>Risk Score: {{score}}/100</p>
        <div class="gauge"><div style="width: {{score}}%; background-color: {{color}}"></div></div>
        {{#if threats}}
        <h3>Detected Threats</h3>
        <ul class="findings">
            {{#each threats}}
            <li>{{this}}</li>
            {{/each}}
        </ul>
        {{/if}}
        {{#if suspicious}}
        <h3>Suspicious Elements</h3>
        <ul class="findings">
            {{#each suspicious}}
            <li>{{this}}</li>
            {{/each}}
        </ul>
        {{/if}}
    </div>
    {{/each}}
</body>
</html>
"#;

/// Create an HTML report from analysis results
///
/// # Arguments
///
/// * `all_results` - Results paired with their source names
/// * `output_path` - Path where the HTML file will be written
pub fn create_html_report(all_results: &[(String, AnalysisResult)], output_path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let emails: Vec<_> = all_results
        .iter()
        .map(|(source, result)| {
            let display = verdict_display(result.verdict());
            json!({
                "source": source,
                "label": display.label,
                "color": display.css_color(),
                "description": display.description,
                "score": result.score(),
                "threats": result.detected_threats(),
                "suspicious": result.suspicious_elements(),
            })
        })
        .collect();

    let template_data = json!({
        "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "summary": Summary::from_results(all_results),
        "emails": emails,
    });

    let html = handlebars
        .render("report", &template_data)
        .context("Failed to render HTML template")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;
    file.write_all(html.as_bytes()).context("Failed to write HTML data")?;

    Ok(())
}

/// Create a CSV report with one row per finding
///
/// Emails without findings get a single row with empty kind and finding.
pub fn create_csv_report(all_results: &[(String, AnalysisResult)], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["Source", "Verdict", "Score", "Kind", "Finding"])
        .context("Failed to write CSV header")?;

    for (source, result) in all_results {
        let verdict = result.verdict().as_str();
        let score = result.score().to_string();

        let rows = result
            .detected_threats()
            .iter()
            .map(|f| ("threat", f.as_str()))
            .chain(result.suspicious_elements().iter().map(|f| ("suspicious", f.as_str())));

        let mut wrote = false;
        for (kind, finding) in rows {
            writer
                .write_record([source.as_str(), verdict, score.as_str(), kind, finding])
                .context("Failed to write CSV record")?;
            wrote = true;
        }
        if !wrote {
            writer
                .write_record([source.as_str(), verdict, score.as_str(), "", ""])
                .context("Failed to write CSV record")?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}
