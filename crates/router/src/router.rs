//! The router façade: the only object the hosting HTTP server talks to.
//!
//! Configuration is a distinct phase from serving. [`RouterBuilder`] collects
//! converters, routes and middleware through a chaining API;
//! [`build`](RouterBuilder::build) validates everything, composes the
//! middleware chain once and returns an immutable [`Router`]. The built
//! router is `Send + Sync` and its [`dispatch`](Router::dispatch) entry point
//! is safe for unbounded concurrent invocation.

use crate::compiler::compile;
use crate::converter::{Converter, ConverterRegistry, PathValue};
use crate::error::{ConvertError, NoReverseMatch, RouterError};
use crate::handler::RouteHandler;
use crate::middleware::{DispatchOutcome, Middleware, Next, compose};
use crate::pattern::{capture_groups, parse_pattern};
use crate::request::{Request, Response};
use crate::reverse::{NamedRoute, ReverseMap};
use crate::route::{CompiledRoute, RouteTable};
use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

const ANY_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::CONNECT,
    Method::PATCH,
    Method::TRACE,
];

/// A handler bound to one or more HTTP methods, optionally named for reverse
/// resolution. Built by [`get`], [`on`], [`any`] and friends, consumed by
/// [`RouterBuilder::route`].
pub struct RouteEndpoint {
    methods: Vec<Method>,
    handler: Arc<dyn RouteHandler>,
    name: Option<String>,
}

impl RouteEndpoint {
    fn new(methods: Vec<Method>, handler: impl RouteHandler + 'static) -> Self {
        Self { methods, handler: Arc::new(handler), name: None }
    }

    /// Names this route so [`Router::reverse`] can resolve it. A later route
    /// registered under the same name replaces this one in the reverse map.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for RouteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEndpoint").field("methods", &self.methods).field("name", &self.name).finish_non_exhaustive()
    }
}

macro_rules! method_endpoint {
    ($method:ident, $upper_case_method:ident) => {
        pub fn $method<H: RouteHandler + 'static>(handler: H) -> RouteEndpoint {
            RouteEndpoint::new(vec![Method::$upper_case_method], handler)
        }
    };
}

method_endpoint!(get, GET);
method_endpoint!(post, POST);
method_endpoint!(put, PUT);
method_endpoint!(delete, DELETE);
method_endpoint!(head, HEAD);
method_endpoint!(options, OPTIONS);
method_endpoint!(connect, CONNECT);
method_endpoint!(patch, PATCH);
method_endpoint!(trace, TRACE);

/// Binds `handler` to a single explicit method.
pub fn on<H: RouteHandler + 'static>(method: Method, handler: H) -> RouteEndpoint {
    RouteEndpoint::new(vec![method], handler)
}

/// Binds the same handler under every standard method.
pub fn any<H: RouteHandler + 'static>(handler: H) -> RouteEndpoint {
    RouteEndpoint::new(ANY_METHODS.to_vec(), handler)
}

/// The setup phase. All registration happens here, on a single logical
/// thread; errors are recorded as they occur and surfaced by [`build`].
///
/// [`RouterBuilder::build`]: RouterBuilder::build
pub struct RouterBuilder {
    registry: ConverterRegistry,
    table: RouteTable,
    reverse_map: ReverseMap,
    middleware: Vec<Arc<dyn Middleware>>,
    errors: Vec<RouterError>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self {
            registry: ConverterRegistry::with_builtins(),
            table: RouteTable::new(),
            reverse_map: ReverseMap::new(),
            middleware: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Registers path converters, shadowing built-ins of the same name.
    ///
    /// Must be called before registering a route that references the names:
    /// routes snapshot their converters when registered, so a converter
    /// registered later neither fixes an earlier unknown-converter error nor
    /// changes an earlier route's behavior.
    pub fn converters(mut self, converters: impl IntoIterator<Item = Converter>) -> Self {
        for converter in converters {
            debug!(name = converter.name(), "registered path converter");
            self.registry.register(converter);
        }
        self
    }

    /// Registers `endpoint` under `pattern`.
    ///
    /// Routes registered first match first. A registration that fails —
    /// malformed pattern, unknown converter, handler arity mismatch — poisons
    /// the builder and [`build`](Self::build) reports it.
    pub fn route(mut self, pattern: impl Into<String>, endpoint: RouteEndpoint) -> Self {
        let pattern = pattern.into();
        if let Err(e) = self.register(&pattern, endpoint) {
            error!(pattern = %pattern, "route registration failed: {e}");
            self.errors.push(e);
        }
        self
    }

    fn register(&mut self, pattern: &str, endpoint: RouteEndpoint) -> Result<(), RouterError> {
        let tokens = parse_pattern(pattern)?;

        let captures = capture_groups(&tokens).len();
        let arity = endpoint.handler.arity();
        if captures != arity {
            return Err(RouterError::arity_mismatch(pattern, captures, arity));
        }

        let (regex, bindings) = compile(pattern, &tokens, &self.registry, true)?;

        if let Some(name) = endpoint.name {
            self.reverse_map.insert(name, NamedRoute::new(pattern.to_string(), &tokens, &bindings));
        }

        let route = Arc::new(CompiledRoute::new(pattern.to_string(), regex, bindings, endpoint.handler));
        for method in endpoint.methods {
            debug!(method = %method, pattern = %route.pattern(), "registered route");
            self.table.add(method, Arc::clone(&route));
        }
        Ok(())
    }

    /// Appends a middleware. The first middleware added is the outermost
    /// layer of the composed chain.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Freezes the configuration into an immutable [`Router`].
    ///
    /// Fails fast with the first registration error instead of serving a
    /// partially configured table; setup errors are never silently swallowed.
    pub fn build(self) -> Result<Router, RouterError> {
        let Self { registry: _, table, reverse_map, middleware, errors } = self;
        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }
        let chain = compose(middleware, Arc::new(table));
        Ok(Router { chain, reverse_map })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("middleware", &self.middleware.len())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// The serving phase: an immutable dispatcher plus the reverse map.
pub struct Router {
    chain: Arc<dyn Next>,
    reverse_map: ReverseMap,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The terminal request handler the hosting server calls once per
    /// request.
    ///
    /// Runs the middleware chain around route matching. On a match the
    /// request's parameter map is populated and the bound handler is invoked
    /// with its converted arguments. With no match this returns
    /// [`DispatchOutcome::Unmatched`] and writes nothing — producing a
    /// not-found response is the caller's responsibility, by contract. A
    /// conversion failure propagates as [`ConvertError`] and fails only the
    /// request that triggered it.
    pub fn dispatch(&self, req: &mut Request, resp: &mut Response) -> Result<DispatchOutcome, ConvertError> {
        self.chain.run(req, resp)
    }

    /// Resolves a named route back into a concrete path.
    pub fn reverse(&self, name: &str, args: &[PathValue]) -> Result<String, NoReverseMatch> {
        self.reverse_map.resolve(name, args)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}
