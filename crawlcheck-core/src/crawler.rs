use crate::error::{CrawlError, Result, error_trace};
use crate::graph::{DirectedGraph, NodeIndex};
use crate::node::{GET, HREF, Node, POST};
use crate::report::{CrawlReport, FailureSummary};
use crate::rules::{Rule, RuleSet};
use crawlcheck_scanner::{ClientAdapter, Response, WrappedClient};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Called after every processed node with the running request count.
pub type ProgressCallback = Arc<dyn Fn(usize, &Node) + Send + Sync>;

/// Extra gate consulted after the rules; returning false skips the node.
#[derive(Clone)]
pub struct ShouldProcessHandler {
    pub name: String,
    pub func: Arc<dyn Fn(&Node) -> bool + Send + Sync>,
}

impl ShouldProcessHandler {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for ShouldProcessHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShouldProcessHandler").field(&self.name).finish()
    }
}

/// Predicate over every accepted response; returning false records an
/// unexpected-response failure naming the check.
#[derive(Clone)]
pub struct ResponseCheck {
    pub name: String,
    pub func: Arc<dyn Fn(&Node, &Response) -> bool + Send + Sync>,
}

impl ResponseCheck {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Node, &Response) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for ResponseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResponseCheck").field(&self.name).finish()
    }
}

/// Options for configuring a crawl
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub initial_paths: Vec<String>,
    pub rules: Vec<Rule>,
    /// Element attributes treated as links
    pub path_attrs: Vec<String>,
    pub ignore_css_selectors: Vec<String>,
    /// Form fields left out of node identity
    pub ignore_form_fields: Vec<String>,
    pub max_requests: Option<usize>,
    pub capture_exceptions: bool,
    pub output_summary: bool,
    pub should_process_handlers: Vec<ShouldProcessHandler>,
    pub check_response_handlers: Vec<ResponseCheck>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            initial_paths: Vec::new(),
            rules: Vec::new(),
            path_attrs: vec![HREF.to_string()],
            ignore_css_selectors: Vec::new(),
            ignore_form_fields: Vec::new(),
            max_requests: None,
            capture_exceptions: true,
            output_summary: true,
            should_process_handlers: Vec::new(),
            check_response_handlers: Vec::new(),
        }
    }
}

/// A failure recorded in capture mode.
#[derive(Debug)]
pub struct CapturedFailure {
    pub node: Node,
    pub error: CrawlError,
    pub trace: Vec<String>,
}

/// Drives the traversal: one request at a time, in discovery order.
pub struct Crawler {
    client: WrappedClient,
    rules: RuleSet,
    options: CrawlOptions,
    graph: DirectedGraph,
    queue: VecDeque<NodeIndex>,
    failures: Vec<CapturedFailure>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    /// Fails when there is nothing to crawl, no rule to crawl by, or an
    /// ignore selector does not parse.
    pub fn new(adapter: ClientAdapter, options: CrawlOptions) -> Result<Self> {
        if options.initial_paths.is_empty() {
            return Err(CrawlError::NoInitialPaths);
        }
        if options.rules.is_empty() {
            return Err(CrawlError::NoRules);
        }

        let client = WrappedClient::new(adapter, &options.ignore_css_selectors)?;

        Ok(Self {
            client,
            rules: RuleSet::new(options.rules.clone()),
            options,
            graph: DirectedGraph::new(),
            queue: VecDeque::new(),
            failures: Vec::new(),
            progress_callback: None,
        })
    }

    pub fn with_should_process_handler(mut self, handler: ShouldProcessHandler) -> Self {
        self.options.should_process_handlers.push(handler);
        self
    }

    pub fn with_check_response_handler(mut self, check: ResponseCheck) -> Self {
        self.options.check_response_handlers.push(check);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// The traversal graph; after an aborted run this is the partial graph.
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    pub fn failures(&self) -> &[CapturedFailure] {
        &self.failures
    }

    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            encountered: self.graph.encountered_paths().len(),
            visited: self.graph.visited_paths().len(),
            failures: self
                .failures
                .iter()
                .map(|failure| FailureSummary {
                    method: failure.node.method.clone(),
                    path: failure.node.path.clone(),
                    params: failure.node.params.clone(),
                    error: failure.error.to_string(),
                    trace: failure.trace.clone(),
                })
                .collect(),
        }
    }

    /// Runs the crawl to completion.
    ///
    /// Returns the report of a clean run. In capture mode, recorded failures
    /// end the run with [`CrawlError::CapturedFailures`] once the queue is
    /// drained; the details stay available through [`Crawler::report`].
    pub async fn crawl(&mut self) -> Result<CrawlReport> {
        let span = info_span!(
            "crawl",
            client = self.client.kind(),
            seeds = self.options.initial_paths.len()
        );
        self.run().instrument(span).await
    }

    async fn run(&mut self) -> Result<CrawlReport> {
        self.graph = DirectedGraph::new();
        self.queue.clear();
        self.failures.clear();

        for path in &self.options.initial_paths {
            let (index, inserted) = self.graph.add_node(Node::new(path.as_str()));
            if inserted {
                self.queue.push_back(index);
            }
        }
        info!("Starting crawl from {} seed(s)", self.queue.len());

        let mut count = 0;
        while let Some(index) = self.queue.pop_front() {
            self.process_node(index).await?;
            count += 1;

            if let Some(callback) = &self.progress_callback {
                callback(count, &self.graph[index]);
            }

            if self.options.max_requests == Some(count) {
                warn!("Request budget of {} exhausted", count);
                return Err(CrawlError::TooManyRequests { count });
            }
        }

        let report = self.report();
        info!(
            "Crawl complete. Encountered {}, visited {}",
            report.encountered, report.visited
        );
        if self.options.output_summary {
            println!("{}", report.render());
        }

        if self.failures.is_empty() {
            Ok(report)
        } else {
            Err(CrawlError::CapturedFailures {
                count: self.failures.len(),
            })
        }
    }

    async fn process_node(&mut self, index: NodeIndex) -> Result<()> {
        if !self.should_process(&self.graph[index]) {
            return Ok(());
        }

        self.graph[index].requested = true;
        debug!("Requesting {}", self.graph[index]);

        let response = match self.fetch_and_check(index).await {
            Ok(response) => response,
            Err(err) if self.options.capture_exceptions && err.is_capturable() => {
                let node = self.graph[index].clone();
                warn!("Captured failure for {}: {}", node, err);
                self.failures.push(CapturedFailure {
                    trace: error_trace(&err),
                    node,
                    error: err,
                });
                return Ok(());
            }
            Err(err) => {
                let node = &self.graph[index];
                error!(
                    method = %node.method,
                    path = %node.path,
                    params = ?node.params,
                    "Crawl aborted: {}",
                    err
                );
                return Err(err);
            }
        };

        let node = self.graph[index].clone();
        if !self.client.is_valid_for_extraction(&response) || !self.rules.should_extract(&node) {
            debug!("Not extracting from {}", node);
            return Ok(());
        }

        let links = self
            .client
            .extract(&response, None, self.options.path_attrs.as_slice())
            .into_iter()
            .map(Node::from_candidate);
        let forms = self
            .client
            .extract_forms(&node.path, &response)
            .into_iter()
            .map(|candidate| {
                Node::from_candidate(candidate)
                    .with_ignored_form_fields(self.options.ignore_form_fields.iter().cloned())
            });
        let children: Vec<Node> = links.chain(forms).collect();

        for child in children {
            let (child_index, inserted) = self.graph.add_node(child);
            if inserted {
                debug!("Discovered {}", self.graph[child_index]);
                self.queue.push_back(child_index);
            }
            self.graph.add_edge(index, child_index);
        }

        Ok(())
    }

    fn should_process(&self, node: &Node) -> bool {
        if let Err(reason) = self.rules.should_process(node) {
            info!("Skipping {} due to {}", node, reason);
            return false;
        }

        if let Some(handler) = self
            .options
            .should_process_handlers
            .iter()
            .find(|handler| !(handler.func)(node))
        {
            info!("Skipping {} due to handler '{}'", node, handler.name);
            return false;
        }

        true
    }

    async fn fetch_and_check(&mut self, index: NodeIndex) -> Result<Response> {
        let node = &self.graph[index];
        let params = self.rules.request_params(node);
        let path = node.path.clone();

        let response = match node.method.as_str() {
            GET => self.client.get(&path, &params).await?,
            POST => self.client.post(&path, &params).await?,
            other => return Err(CrawlError::UnsupportedMethod(other.to_string())),
        };

        self.graph[index].status_code = Some(response.status_code);
        let node = &self.graph[index];

        if !self.rules.status_accepted(node) {
            return Err(CrawlError::HttpStatus {
                status_code: response.status_code,
            });
        }

        if let Some(check) = self
            .options
            .check_response_handlers
            .iter()
            .find(|check| !(check.func)(node, &response))
        {
            return Err(CrawlError::UnexpectedResponse {
                method: node.method.clone(),
                path: node.path.clone(),
                handler: check.name.clone(),
            });
        }

        Ok(response)
    }
}
