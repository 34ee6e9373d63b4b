//! The per-method route table and the matching algorithm.
//!
//! Routes live in one ordered list per HTTP method. Matching walks that list
//! in registration order and takes the first route whose anchored regex
//! matches the whole request path — never the most specific one. Linear,
//! registration-order matching is the contract of this engine, not a
//! limitation: precedence is always explicit and predictable.

use crate::compiler::BoundCapture;
use crate::error::ConvertError;
use crate::handler::RouteHandler;
use crate::middleware::{DispatchOutcome, Next};
use crate::request::{Request, Response};
use http::Method;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered route: the original pattern, its compiled regex, the capture
/// groups with their converter snapshots, and the erased handler.
pub(crate) struct CompiledRoute {
    pattern: String,
    regex: Regex,
    captures: Vec<BoundCapture>,
    handler: Arc<dyn RouteHandler>,
}

impl CompiledRoute {
    pub(crate) fn new(
        pattern: String,
        regex: Regex,
        captures: Vec<BoundCapture>,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        Self { pattern, regex, captures, handler }
    }

    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Matches `path` against this route, returning the raw captured values
    /// in capture-group order.
    fn captured(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.captures
                .iter()
                .filter_map(|binding| caps.name(binding.param_name()).map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("pattern", &self.pattern)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// HTTP method → ordered routes. Insertion order is semantically significant.
#[derive(Debug, Default)]
pub(crate) struct RouteTable {
    routes: HashMap<Method, Vec<Arc<CompiledRoute>>>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Appends `route` to `method`'s list, creating the list if absent.
    pub(crate) fn add(&mut self, method: Method, route: Arc<CompiledRoute>) {
        self.routes.entry(method).or_default().push(route);
    }
}

/// The route table is the innermost layer of the middleware onion: it matches,
/// populates the request's parameter map, and invokes the bound handler.
///
/// When nothing matches it returns [`DispatchOutcome::Unmatched`] without
/// falling back to other methods and without writing any response.
impl Next for RouteTable {
    fn run(&self, req: &mut Request, resp: &mut Response) -> Result<DispatchOutcome, ConvertError> {
        let Some(routes) = self.routes.get(req.method()) else {
            return Ok(DispatchOutcome::Unmatched);
        };

        for route in routes {
            let Some(raw) = route.captured(req.path()) else {
                continue;
            };

            for (binding, value) in route.captures.iter().zip(&raw) {
                req.params_mut().insert(binding.param_name().to_string(), value.clone());
            }

            route.handler.handle(req, resp, &route.captures, &raw)?;
            return Ok(DispatchOutcome::Handled);
        }

        Ok(DispatchOutcome::Unmatched)
    }
}
