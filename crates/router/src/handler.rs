//! Typed handler binding.
//!
//! A route handler is a plain function taking the request, the response and
//! one extra argument per capture group in its pattern:
//!
//! ```
//! use micro_router::{Request, Response};
//!
//! fn hello(_req: &mut Request, resp: &mut Response, name: String, age: i64) {
//!     resp.write(format!("hello {name}, {age}"));
//! }
//! ```
//!
//! [`handler_fn`] lifts such a function into a [`FnHandler`]; the argument
//! tuple's [`PathArgs::COUNT`] gives the extra-argument count so the router
//! can reject an arity mismatch at registration time, long before the first
//! request. At request time each captured string runs through its group's
//! converter and the resulting [`PathValue`] is narrowed to the declared
//! argument type.

use crate::compiler::BoundCapture;
use crate::converter::PathValue;
use crate::error::ConvertError;
use crate::request::{Request, Response};
use std::marker::PhantomData;
use uuid::Uuid;

/// Conversion from the engine's uniform [`PathValue`] into a concrete handler
/// argument type. A variant mismatch fails with
/// [`ConvertError::TypeMismatch`]; there is no structural coercion.
pub trait FromPathValue: Sized {
    fn from_path_value(value: PathValue) -> Result<Self, ConvertError>;
}

impl FromPathValue for i64 {
    fn from_path_value(value: PathValue) -> Result<Self, ConvertError> {
        value.as_int()
    }
}

impl FromPathValue for String {
    fn from_path_value(value: PathValue) -> Result<Self, ConvertError> {
        match value {
            PathValue::Str(s) => Ok(s),
            other => Err(ConvertError::type_mismatch("string", other.kind())),
        }
    }
}

impl FromPathValue for Uuid {
    fn from_path_value(value: PathValue) -> Result<Self, ConvertError> {
        value.as_uuid()
    }
}

impl FromPathValue for PathValue {
    fn from_path_value(value: PathValue) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

/// A handler's extra-argument tuple: knows its own length and how to extract
/// itself positionally from the captured path values.
pub trait PathArgs: Sized {
    /// Number of extra arguments; must equal the route's capture-group count.
    const COUNT: usize;

    fn extract(captures: &[BoundCapture], raw: &[String]) -> Result<Self, ConvertError>;
}

/// Represents a routing function over the request, the response and a typed
/// argument tuple.
pub trait HandlerFn<Args>: Send + Sync {
    fn invoke(&self, req: &mut Request, resp: &mut Response, args: Args);
}

macro_rules! count_params {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count_params!($($tail)*) };
}

/// impl `PathArgs` and `HandlerFn` for tuples from 0 to 8 parameters.
///
/// for example, for two parameters it expands to:
///
/// ```ignore
/// impl<A, B> PathArgs for (A, B) where A: FromPathValue, B: FromPathValue { .. }
/// impl<Func, A, B> HandlerFn<(A, B)> for Func
/// where
///     Func: Fn(&mut Request, &mut Response, A, B) + Send + Sync,
/// { .. }
/// ```
macro_rules! impl_typed_args ({ $($param:ident)* } => {
    impl<$($param,)*> PathArgs for ($($param,)*)
    where
        $($param: FromPathValue,)*
    {
        const COUNT: usize = count_params!($($param)*);

        #[allow(non_snake_case, unused_variables, unused_mut)]
        fn extract(captures: &[BoundCapture], raw: &[String]) -> Result<Self, ConvertError> {
            let mut pairs = captures.iter().zip(raw.iter());
            $(
                let $param = match pairs.next() {
                    Some((capture, value)) => $param::from_path_value(capture.converter().parse(value)?)?,
                    None => return Err(ConvertError::missing_capture(stringify!($param))),
                };
            )*
            Ok(($($param,)*))
        }
    }

    impl<Func, $($param,)*> HandlerFn<($($param,)*)> for Func
    where
        Func: Fn(&mut Request, &mut Response, $($param),*) + Send + Sync,
    {
        #[inline]
        #[allow(non_snake_case)]
        fn invoke(&self, req: &mut Request, resp: &mut Response, ($($param,)*): ($($param,)*)) {
            (self)(req, resp, $($param,)*)
        }
    }
});

impl_typed_args! {}
impl_typed_args! { A }
impl_typed_args! { A B }
impl_typed_args! { A B C }
impl_typed_args! { A B C D }
impl_typed_args! { A B C D E }
impl_typed_args! { A B C D E F }
impl_typed_args! { A B C D E F G }
impl_typed_args! { A B C D E F G H }

/// The erased handler stored in the route table.
pub trait RouteHandler: Send + Sync {
    /// Extra-argument count, checked against the capture-group count when the
    /// route is registered.
    fn arity(&self) -> usize;

    fn handle(
        &self,
        req: &mut Request,
        resp: &mut Response,
        captures: &[BoundCapture],
        raw: &[String],
    ) -> Result<(), ConvertError>;
}

/// a `HandlerFn` holder which binds the function to its argument tuple
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: HandlerFn<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

impl<F, Args> std::fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: HandlerFn<Args>,
    Args: PathArgs,
{
    FnHandler::new(f)
}

impl<F, Args> RouteHandler for FnHandler<F, Args>
where
    F: HandlerFn<Args>,
    Args: PathArgs,
{
    fn arity(&self) -> usize {
        Args::COUNT
    }

    fn handle(
        &self,
        req: &mut Request,
        resp: &mut Response,
        captures: &[BoundCapture],
        raw: &[String],
    ) -> Result<(), ConvertError> {
        let args = Args::extract(captures, raw)?;
        self.f.invoke(req, resp, args);
        Ok(())
    }
}
