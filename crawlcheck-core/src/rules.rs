//! Declarative rules deciding what gets requested, what gets mined for
//! further links, and which error statuses are acceptable.
//!
//! Every query scans the whole rule list and the **last** matching rule of
//! the relevant kind decides, so later rules override earlier ones.

use crate::error::{CrawlError, Result};
use crate::node::Node;
use crawlcheck_scanner::Params;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Schemes the crawler is willing to request.
pub const USABLE_SCHEMES: &[&str] = &["http", "https"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Don't request matching nodes.
    Ignore,
    /// Request matching nodes. With `only`, the response is checked but not
    /// searched for further links; `params` are added to every request.
    Request {
        #[serde(default)]
        only: bool,
        #[serde(default)]
        params: Params,
    },
    /// Treat these status codes as acceptable for matching nodes.
    Allow { status_codes: BTreeSet<u16> },
}

impl Action {
    pub fn request() -> Self {
        Action::Request {
            only: false,
            params: Params::new(),
        }
    }

    pub fn request_only() -> Self {
        Action::Request {
            only: true,
            params: Params::new(),
        }
    }

    pub fn request_with_params(params: Params) -> Self {
        Action::Request {
            only: false,
            params,
        }
    }

    pub fn allow<I: IntoIterator<Item = u16>>(status_codes: I) -> Self {
        Action::Allow {
            status_codes: status_codes.into_iter().collect(),
        }
    }

    fn is_gate(&self) -> bool {
        matches!(self, Action::Request { .. } | Action::Ignore)
    }

    fn is_request(&self) -> bool {
        matches!(self, Action::Request { .. })
    }

    fn is_allow(&self) -> bool {
        matches!(self, Action::Allow { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ignore => write!(f, "Ignore"),
            Action::Request { only: true, .. } => write!(f, "Request(only)"),
            Action::Request { .. } => write!(f, "Request"),
            Action::Allow { status_codes } => write!(f, "Allow({:?})", status_codes),
        }
    }
}

/// Compiles `pattern` so that it only matches at the start of the input;
/// whatever follows the match is not constrained.
pub fn prefix_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| CrawlError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct Rule {
    source_pattern: String,
    path_pattern: String,
    source_regex: Regex,
    path_regex: Regex,
    method: String,
    action: Action,
}

impl Rule {
    pub fn new(source_pattern: &str, path_pattern: &str, method: &str, action: Action) -> Result<Self> {
        Ok(Self {
            source_regex: prefix_regex(source_pattern)?,
            path_regex: prefix_regex(path_pattern)?,
            source_pattern: source_pattern.to_string(),
            path_pattern: path_pattern.to_string(),
            method: method.to_uppercase(),
            action,
        })
    }

    pub fn source_pattern(&self) -> &str {
        &self.source_pattern
    }

    pub fn path_pattern(&self) -> &str {
        &self.path_pattern
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Seeds (nodes without a source) pass the source check.
    pub fn matches(&self, node: &Node) -> bool {
        node.source
            .as_deref()
            .is_none_or(|source| self.source_regex.is_match(source))
            && self.method == node.method
            && self.path_regex.is_match(&node.path)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.source_pattern == other.source_pattern
            && self.path_pattern == other.path_pattern
            && self.method == other.method
            && self.action == other.action
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule({:?}, {:?}, {}, {})",
            self.source_pattern, self.path_pattern, self.method, self.action
        )
    }
}

/// Why a node was not requested.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnusableScheme(String),
    NoMatchingRule,
    IgnoredBy(Rule),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnusableScheme(scheme) => write!(f, "invalid scheme '{}'", scheme),
            SkipReason::NoMatchingRule => write!(f, "lack of matching rule"),
            SkipReason::IgnoredBy(rule) => write!(f, "{}", rule),
        }
    }
}

/// Lowercased scheme of an absolute reference, read syntactically
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`) so that URLs which
/// fail to parse are still classified. Relative references yield `None`.
pub fn url_scheme(path: &str) -> Option<String> {
    let (scheme, _) = path.split_once(':')?;
    let mut chars = scheme.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

/// An ordered rule list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The last rule whose action passes `kind` and which matches `node`.
    pub fn last_match(&self, node: &Node, kind: impl Fn(&Action) -> bool) -> Option<&Rule> {
        self.rules
            .iter()
            .filter(|rule| kind(&rule.action) && rule.matches(node))
            .last()
    }

    /// Returns the deciding `Request` rule, or why the node must be skipped.
    pub fn should_process(&self, node: &Node) -> std::result::Result<&Rule, SkipReason> {
        if let Some(scheme) = url_scheme(&node.path)
            && !USABLE_SCHEMES.contains(&scheme.as_str())
        {
            return Err(SkipReason::UnusableScheme(scheme));
        }

        match self.last_match(node, Action::is_gate) {
            None => Err(SkipReason::NoMatchingRule),
            Some(rule) if rule.action.is_request() => Ok(rule),
            Some(rule) => Err(SkipReason::IgnoredBy(rule.clone())),
        }
    }

    /// False when the deciding `Request` rule is marked `only`.
    pub fn should_extract(&self, node: &Node) -> bool {
        !matches!(
            self.last_match(node, Action::is_request).map(Rule::action),
            Some(Action::Request { only: true, .. })
        )
    }

    /// 2xx and 3xx are always fine; anything else needs an `Allow` rule
    /// naming the exact code.
    pub fn status_accepted(&self, node: &Node) -> bool {
        let Some(status_code) = node.status_code else {
            return false;
        };
        if (200..400).contains(&status_code) {
            return true;
        }

        self.rules.iter().any(|rule| {
            rule.action.is_allow()
                && rule.matches(node)
                && matches!(&rule.action, Action::Allow { status_codes } if status_codes.contains(&status_code))
        })
    }

    /// The node's params with those of every matching `Request` rule merged
    /// over them, in rule order.
    pub fn request_params(&self, node: &Node) -> Params {
        let mut params = node.params.clone();
        for rule in &self.rules {
            if let Action::Request { params: extra, .. } = &rule.action
                && rule.matches(node)
            {
                params.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        params
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ready-made rule sets for common crawl shapes.
pub mod presets {
    use super::{Action, Rule};
    use crate::node::{ANCHOR, AREA, FORM, GET, LINK, POST};

    pub const NAMES: &[&str] = &[
        "all_elements",
        "hyperlinks_only",
        "request_only_external",
        "submit_get_forms",
        "submit_post_forms",
        "permissive",
        "permissive_all_elements",
        "permissive_hyperlinks_only",
        "external_resource_links",
    ];

    fn fixed(source: &str, path: &str, method: &str, action: Action) -> Rule {
        Rule::new(source, path, method, action).expect("preset patterns are valid regexes")
    }

    /// Follow any element's link to a site-relative path.
    pub fn all_elements() -> Vec<Rule> {
        vec![fixed(".*", "/.*", GET, Action::request())]
    }

    /// Follow anchors and image-map areas to site-relative paths.
    pub fn hyperlinks_only() -> Vec<Rule> {
        vec![
            fixed(ANCHOR, "/.*", GET, Action::request()),
            fixed(AREA, "/.*", GET, Action::request()),
        ]
    }

    /// Check every hyperlink, including off-site ones, without mining the
    /// responses for further links.
    pub fn request_only_external() -> Vec<Rule> {
        vec![
            fixed(ANCHOR, ".*", GET, Action::request_only()),
            fixed(AREA, ".*", GET, Action::request_only()),
        ]
    }

    pub fn submit_get_forms() -> Vec<Rule> {
        vec![fixed(FORM, ".*", GET, Action::request())]
    }

    pub fn submit_post_forms() -> Vec<Rule> {
        vec![fixed(FORM, ".*", POST, Action::request())]
    }

    /// Accept every 4xx and 5xx status.
    pub fn permissive() -> Vec<Rule> {
        vec![
            fixed(".*", ".*", GET, Action::allow(400..600)),
            fixed(".*", ".*", POST, Action::allow(400..600)),
        ]
    }

    pub fn permissive_all_elements() -> Vec<Rule> {
        [all_elements(), permissive()].concat()
    }

    pub fn permissive_hyperlinks_only() -> Vec<Rule> {
        [hyperlinks_only(), permissive()].concat()
    }

    /// Request `<link>` targets such as stylesheets.
    pub fn external_resource_links() -> Vec<Rule> {
        vec![fixed(LINK, ".*", GET, Action::request())]
    }

    pub fn by_name(name: &str) -> Option<Vec<Rule>> {
        let rules = match name {
            "all_elements" => all_elements(),
            "hyperlinks_only" => hyperlinks_only(),
            "request_only_external" => request_only_external(),
            "submit_get_forms" => submit_get_forms(),
            "submit_post_forms" => submit_post_forms(),
            "permissive" => permissive(),
            "permissive_all_elements" => permissive_all_elements(),
            "permissive_hyperlinks_only" => permissive_hyperlinks_only(),
            "external_resource_links" => external_resource_links(),
            _ => return None,
        };
        Some(rules)
    }
}
