// End-of-run summary of a crawl

use crawlcheck_scanner::Params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub encountered: usize,
    pub visited: usize,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub method: String,
    pub path: String,
    pub params: Params,
    pub error: String,
    pub trace: Vec<String>,
}

impl CrawlReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text summary, as printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = heading("Results of Testing Crawler");
        out.push_str(&format!("Encountered {} endpoints.\n", self.encountered));
        out.push_str(&format!("Visited {} endpoints.\n", self.visited));

        if self.failures.is_empty() {
            return out;
        }

        out.push('\n');
        out.push_str(&heading(&format!(
            "Summary of {} error(s)",
            self.failures.len()
        )));
        for (i, failure) in self.failures.iter().enumerate() {
            out.push_str(&format!("{}. {} {}\n", i + 1, failure.method, failure.path));
            if !failure.params.is_empty() {
                out.push_str(&format!("   params: {:?}\n", failure.params));
            }
            out.push_str(&format!("   {}\n", failure.error));
        }

        out.push('\n');
        out.push_str(&heading("Full tracebacks"));
        for (i, failure) in self.failures.iter().enumerate() {
            out.push_str(&format!("{}. {} {}\n", i + 1, failure.method, failure.path));
            for (depth, line) in failure.trace.iter().enumerate() {
                let prefix = if depth == 0 { "" } else { "caused by: " };
                out.push_str(&format!("   {}{}\n", prefix, line));
            }
        }

        out
    }
}

fn heading(title: &str) -> String {
    format!("{}\n{}\n", title, "=".repeat(title.len()))
}
