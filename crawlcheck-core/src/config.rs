// Crawl configuration files

use crate::crawler::CrawlOptions;
use crate::error::{CrawlError, Result};
use crate::node::{GET, HREF};
use crate::rules::{Action, Rule, presets};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    pub initial_paths: Vec<String>,
    /// Named rule sets, expanded ahead of `rules`
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default = "default_path_attrs")]
    pub path_attrs: Vec<String>,
    #[serde(default)]
    pub ignore_css_selectors: Vec<String>,
    #[serde(default)]
    pub ignore_form_fields: Vec<String>,
    #[serde(default)]
    pub max_requests: Option<usize>,
    #[serde(default = "default_true")]
    pub capture_exceptions: bool,
    #[serde(default = "default_true")]
    pub output_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub source: String,
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub action: Action,
}

fn default_path_attrs() -> Vec<String> {
    vec![HREF.to_string()]
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    GET.to_string()
}

impl RuleConfig {
    pub fn to_rule(&self) -> Result<Rule> {
        Rule::new(&self.source, &self.path, &self.method, self.action.clone())
    }
}

impl CrawlConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Presets first, in the order listed, then the explicit rules.
    pub fn build_rules(&self) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();
        for name in &self.presets {
            let preset =
                presets::by_name(name).ok_or_else(|| CrawlError::UnknownPreset(name.clone()))?;
            rules.extend(preset);
        }
        for rule in &self.rules {
            rules.push(rule.to_rule()?);
        }
        Ok(rules)
    }

    pub fn into_options(self) -> Result<CrawlOptions> {
        let rules = self.build_rules()?;
        Ok(CrawlOptions {
            initial_paths: self.initial_paths,
            rules,
            path_attrs: self.path_attrs,
            ignore_css_selectors: self.ignore_css_selectors,
            ignore_form_fields: self.ignore_form_fields,
            max_requests: self.max_requests,
            capture_exceptions: self.capture_exceptions,
            output_summary: self.output_summary,
            ..Default::default()
        })
    }
}
