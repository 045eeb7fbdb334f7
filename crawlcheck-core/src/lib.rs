pub mod config;
pub mod crawler;
pub mod error;
pub mod graph;
pub mod node;
pub mod report;
pub mod rules;

pub use config::{CrawlConfig, RuleConfig};
pub use crawler::{
    CapturedFailure, CrawlOptions, Crawler, ProgressCallback, ResponseCheck, ShouldProcessHandler,
};
pub use error::{CrawlError, error_trace};
pub use graph::{DirectedGraph, NodeIndex};
pub use node::{Node, NodeId};
pub use report::{CrawlReport, FailureSummary, ReportFormat};
pub use rules::{Action, Rule, RuleSet, SkipReason, presets};
