//! Onion middleware around route dispatch.
//!
//! A [`Middleware`] receives the request, the response and a [`Next`]
//! continuation; it runs logic before and/or after calling `next.run(..)`.
//! The router composes the registered middleware once, inside
//! [`build`](crate::RouterBuilder::build): the first-registered middleware is
//! outermost, so it observes the request before everything else and the
//! response after everything else. The composed chain is immutable and reused
//! for every dispatch.

use crate::error::ConvertError;
use crate::request::{Request, Response};
use std::sync::Arc;

/// What came out of a dispatch.
///
/// `Unmatched` is a silent non-handling outcome: the engine generates no
/// fallback response, by contract. Terminating an unmatched request (e.g.
/// with a default 404) is the hosting server's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A route matched and its handler ran.
    Handled,
    /// No route for this method/path; request and response are untouched
    /// except for whatever middleware did.
    Unmatched,
}

/// The continuation a middleware calls to hand the request further in.
///
/// The innermost `Next` is the route table itself.
pub trait Next: Send + Sync {
    fn run(&self, req: &mut Request, resp: &mut Response) -> Result<DispatchOutcome, ConvertError>;
}

pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut Request, resp: &mut Response, next: &dyn Next) -> Result<DispatchOutcome, ConvertError>;
}

struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response, &dyn Next) -> Result<DispatchOutcome, ConvertError> + Send + Sync,
{
    fn handle(&self, req: &mut Request, resp: &mut Response, next: &dyn Next) -> Result<DispatchOutcome, ConvertError> {
        (self.0)(req, resp, next)
    }
}

/// Lifts a closure into a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> impl Middleware
where
    F: Fn(&mut Request, &mut Response, &dyn Next) -> Result<DispatchOutcome, ConvertError> + Send + Sync,
{
    FnMiddleware(f)
}

/// One layer of the composed chain: a middleware plus everything inside it.
struct Layer {
    middleware: Arc<dyn Middleware>,
    next: Arc<dyn Next>,
}

impl Next for Layer {
    fn run(&self, req: &mut Request, resp: &mut Response) -> Result<DispatchOutcome, ConvertError> {
        self.middleware.handle(req, resp, &*self.next)
    }
}

/// Wraps `terminal` in the registered middleware, first-registered outermost.
pub(crate) fn compose(middleware: Vec<Arc<dyn Middleware>>, terminal: Arc<dyn Next>) -> Arc<dyn Next> {
    middleware
        .into_iter()
        .rev()
        .fold(terminal, |next, middleware| Arc::new(Layer { middleware, next }) as Arc<dyn Next>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::Mutex;

    struct Terminal;

    impl Next for Terminal {
        fn run(&self, _req: &mut Request, resp: &mut Response) -> Result<DispatchOutcome, ConvertError> {
            resp.write("terminal;");
            Ok(DispatchOutcome::Handled)
        }
    }

    fn tagging(tag: &'static str, log: Arc<Mutex<Vec<String>>>) -> impl Middleware {
        middleware_fn(move |req: &mut Request, resp: &mut Response, next: &dyn Next| {
            log.lock().unwrap().push(format!("{tag}:before"));
            let outcome = next.run(req, resp)?;
            log.lock().unwrap().push(format!("{tag}:after"));
            Ok(outcome)
        })
    }

    #[test]
    fn first_registered_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = compose(
            vec![
                Arc::new(tagging("first", Arc::clone(&log))) as Arc<dyn Middleware>,
                Arc::new(tagging("second", Arc::clone(&log))),
            ],
            Arc::new(Terminal),
        );

        let mut req = Request::new(Method::GET, "/".parse().unwrap());
        let mut resp = Response::new();
        let outcome = chain.run(&mut req, &mut resp).unwrap();

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["first:before", "second:before", "second:after", "first:after"]
        );
    }

    #[test]
    fn empty_chain_is_just_the_terminal() {
        let chain = compose(Vec::new(), Arc::new(Terminal));

        let mut req = Request::new(Method::GET, "/".parse().unwrap());
        let mut resp = Response::new();
        chain.run(&mut req, &mut resp).unwrap();

        assert_eq!(resp.body(), b"terminal;");
    }

    #[test]
    fn middleware_can_short_circuit() {
        let gate = middleware_fn(|_req: &mut Request, resp: &mut Response, _next: &dyn Next| {
            resp.write("denied");
            Ok(DispatchOutcome::Handled)
        });
        let chain = compose(vec![Arc::new(gate) as Arc<dyn Middleware>], Arc::new(Terminal));

        let mut req = Request::new(Method::GET, "/".parse().unwrap());
        let mut resp = Response::new();
        chain.run(&mut req, &mut resp).unwrap();

        // the terminal never ran
        assert_eq!(resp.body(), b"denied");
    }
}
