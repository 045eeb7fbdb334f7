use crate::Params;
use crate::error::{Result, ScanError};
use crate::response::{Response, acceptable_content_type};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Tag name recorded as the source of form candidates.
pub const FORM: &str = "form";

/// Method used when a form doesn't declare one.
pub const DEFAULT_FORM_METHOD: &str = "GET";

/// Something found in a page that could be requested next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub method: String,
    pub path: String,
    pub params: Params,
}

/// Finds link and form candidates in HTML responses, skipping anything
/// matched by one of the ignore selectors.
#[derive(Debug)]
pub struct Extractor {
    ignore: Vec<Selector>,
    any_element: Selector,
    forms: Selector,
    named_inputs: Selector,
}

impl Extractor {
    pub fn new<S: AsRef<str>>(ignore_css_selectors: &[S]) -> Result<Self> {
        let ignore = ignore_css_selectors
            .iter()
            .map(|s| compile_selector(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ignore,
            any_element: compile_selector("*")?,
            forms: compile_selector(FORM)?,
            named_inputs: compile_selector("input[name]")?,
        })
    }

    pub fn is_valid_for_extraction(&self, response: &Response) -> bool {
        response
            .content_type
            .as_deref()
            .is_some_and(acceptable_content_type)
    }

    /// Yields one candidate per present, non-empty attribute of every
    /// element not covered by an ignore selector. `element_names` narrows
    /// the search to the given tag names.
    pub fn extract<A: AsRef<str>>(
        &self,
        response: &Response,
        element_names: Option<&[&str]>,
        attr_names: &[A],
    ) -> Vec<Candidate> {
        let document = Html::parse_document(response.text());
        let mut candidates = Vec::new();

        for element in document.select(&self.any_element) {
            let name = element.value().name();
            if let Some(names) = element_names
                && !names.contains(&name)
            {
                continue;
            }
            if self.is_ignored(&element) {
                debug!("Ignoring <{}> matched by an ignore selector", name);
                continue;
            }

            for attr_name in attr_names {
                if let Some(value) = element.value().attr(attr_name.as_ref())
                    && !value.is_empty()
                {
                    candidates.push(Candidate {
                        source: name.to_string(),
                        method: "GET".to_string(),
                        path: strip_fragment(value).to_string(),
                        params: Params::new(),
                    });
                }
            }
        }

        candidates
    }

    /// Yields one candidate per form not covered by an ignore selector.
    /// Forms without an `action` submit back to `base_path`.
    pub fn extract_forms(&self, base_path: &str, response: &Response) -> Vec<Candidate> {
        let document = Html::parse_document(response.text());

        document
            .select(&self.forms)
            .filter(|form| {
                let ignored = self.is_ignored(form);
                if ignored {
                    debug!("Ignoring form matched by an ignore selector");
                }
                !ignored
            })
            .map(|form| {
                let params = form
                    .select(&self.named_inputs)
                    .filter_map(|input| {
                        let name = input.value().attr("name")?;
                        let value = input.value().attr("value").unwrap_or_default();
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect();

                Candidate {
                    source: FORM.to_string(),
                    method: form
                        .value()
                        .attr("method")
                        .unwrap_or(DEFAULT_FORM_METHOD)
                        .to_uppercase(),
                    path: form.value().attr("action").unwrap_or(base_path).to_string(),
                    params,
                }
            })
            .collect()
    }

    fn is_ignored(&self, element: &ElementRef) -> bool {
        self.ignore.iter().any(|selector| selector.matches(element))
    }
}

pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScanError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn strip_fragment(value: &str) -> &str {
    value.split_once('#').map_or(value, |(head, _)| head)
}
