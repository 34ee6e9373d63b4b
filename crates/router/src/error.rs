use thiserror::Error;

/// Setup-time errors, raised while registering routes or converters.
///
/// Every variant is fatal to the registration that produced it: the builder
/// records the error and [`build`](crate::RouterBuilder::build) fails with the
/// first one instead of starting with a partially configured router.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    PatternSyntax { pattern: String, reason: String },

    #[error("pattern {pattern:?} references unknown converter {name:?}")]
    UnknownConverter { pattern: String, name: String },

    #[error("route {pattern:?} captures {captures} value(s) but the handler takes {arity} extra argument(s)")]
    ArityMismatch { pattern: String, captures: usize, arity: usize },

    #[error("pattern {pattern:?} does not compile to a valid regex: {source}")]
    RegexCompile {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

impl RouterError {
    pub fn pattern_syntax<S: ToString>(pattern: &str, reason: S) -> Self {
        Self::PatternSyntax { pattern: pattern.to_string(), reason: reason.to_string() }
    }

    pub fn unknown_converter(pattern: &str, name: &str) -> Self {
        Self::UnknownConverter { pattern: pattern.to_string(), name: name.to_string() }
    }

    pub fn arity_mismatch(pattern: &str, captures: usize, arity: usize) -> Self {
        Self::ArityMismatch { pattern: pattern.to_string(), captures, arity }
    }

    pub fn regex_compile(pattern: &str, source: regex::Error) -> Self {
        Self::RegexCompile { pattern: pattern.to_string(), source: Box::new(source) }
    }
}

/// Request-time conversion errors.
///
/// A failure here means a captured string passed a converter's regex fragment
/// but its `parse` function rejected it (e.g. integer overflow), or a handler
/// asked a [`PathValue`](crate::PathValue) for the wrong variant. The router
/// never swallows these: they propagate out of
/// [`dispatch`](crate::Router::dispatch) to the calling server.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot parse {value:?} as an integer: {source}")]
    InvalidInt {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("cannot parse {value:?} as a uuid: {source}")]
    InvalidUuid {
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("expected a {expected} value, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error("capture {name:?} is missing from the matched path")]
    MissingCapture { name: String },
}

impl ConvertError {
    pub fn invalid_int(value: &str, source: std::num::ParseIntError) -> Self {
        Self::InvalidInt { value: value.to_string(), source }
    }

    pub fn invalid_uuid(value: &str, source: uuid::Error) -> Self {
        Self::InvalidUuid { value: value.to_string(), source }
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn missing_capture<S: ToString>(name: S) -> Self {
        Self::MissingCapture { name: name.to_string() }
    }
}

/// The single error kind callers of [`reverse`](crate::Router::reverse) handle.
///
/// Formatting failures are caught and wrapped here rather than leaking the
/// underlying [`ConvertError`] as the error type, so link generation has one
/// recoverable failure mode.
#[derive(Error, Debug)]
pub enum NoReverseMatch {
    #[error("no route registered under name {name:?}")]
    UnknownName { name: String },

    #[error("route {name:?} takes {expected} argument(s), {found} supplied")]
    ArgumentCount { name: String, expected: usize, found: usize },

    #[error("argument {index} of route {name:?} cannot be formatted")]
    Format {
        name: String,
        index: usize,
        #[source]
        source: ConvertError,
    },
}

impl NoReverseMatch {
    pub fn unknown_name(name: &str) -> Self {
        Self::UnknownName { name: name.to_string() }
    }

    pub fn argument_count(name: &str, expected: usize, found: usize) -> Self {
        Self::ArgumentCount { name: name.to_string(), expected, found }
    }

    pub fn format(name: &str, index: usize, source: ConvertError) -> Self {
        Self::Format { name: name.to_string(), index, source }
    }
}
