//! A typed URL routing engine for HTTP request dispatch.
//!
//! This crate compiles declarative path patterns such as
//! `/make/<string:model>/model/<int:make>/` into anchored regular
//! expressions, dispatches requests to the first matching handler in
//! registration order, converts captured path segments into strongly-typed
//! handler arguments, wraps dispatch in onion middleware, and resolves route
//! names back into concrete URLs.
//!
//! It contains no HTTP server: the hosting server adapts its requests into
//! [`Request`]/[`Response`] and calls [`Router::dispatch`] as its terminal
//! handler. Unmatched paths come back as [`DispatchOutcome::Unmatched`] and
//! the engine writes nothing — the server owns the not-found policy.
//!
//! # Features
//!
//! - Pattern grammar with typed capture groups: `<name>`, `<int:id>`,
//!   `<uuid:key>`, `<path:rest>`, …
//! - Converter registry with five built-ins and user overrides
//! - First-match-wins dispatch per HTTP method, in registration order
//! - Handler arity validated at registration, not at request time
//! - Middleware composed once at build time, first-registered outermost
//! - Reverse resolution from route name + typed arguments
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use micro_router::router::get;
//! use micro_router::{DispatchOutcome, Request, Response, Router, handler_fn};
//!
//! fn hello(_req: &mut Request, resp: &mut Response, name: String, age: i64) {
//!     resp.write(format!("hello {name}, age {age}"));
//! }
//!
//! let router = Router::builder()
//!     .route("/hello/<name>/<int:age>/", get(handler_fn(hello)).named("hello"))
//!     .build()?;
//!
//! let mut req = Request::new(Method::GET, "/hello/Sam/30/".parse()?);
//! let mut resp = Response::new();
//!
//! assert_eq!(router.dispatch(&mut req, &mut resp)?, DispatchOutcome::Handled);
//! assert_eq!(resp.body(), b"hello Sam, age 30");
//! assert_eq!(router.reverse("hello", &["Sam".into(), 30.into()])?, "/hello/Sam/30/");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compiler;
mod converter;
mod error;
mod handler;
mod middleware;
mod pattern;
mod request;
mod reverse;
mod route;

pub mod router;

pub use compiler::BoundCapture;
pub use converter::{Converter, ConverterRegistry, PathValue};
pub use error::{ConvertError, NoReverseMatch, RouterError};
pub use handler::{FnHandler, FromPathValue, HandlerFn, PathArgs, RouteHandler, handler_fn};
pub use middleware::{DispatchOutcome, Middleware, Next, middleware_fn};
pub use pattern::CaptureGroup;
pub use request::{Request, Response};
pub use router::{Router, RouterBuilder};
