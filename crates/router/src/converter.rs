//! Path converters: the bidirectional bridge between raw path segments and
//! typed handler arguments.
//!
//! A [`Converter`] bundles a regex fragment constraining the strings it
//! accepts with a `parse` function (segment → [`PathValue`]) and a `format`
//! function ([`PathValue`] → segment, used by reverse resolution). The
//! [`ConverterRegistry`] maps converter names to converters; the built-ins
//! (`int`, `string`, `slug`, `uuid`, `path`) are always present and can be
//! shadowed by user registrations.

use crate::error::ConvertError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A typed value parsed from a path segment.
///
/// This is the uniform container moving arbitrary converter output through
/// the dispatch pipeline. Handlers narrow it back to a concrete type through
/// the accessors (or [`FromPathValue`](crate::handler::FromPathValue)); a
/// wrong-variant access fails with [`ConvertError::TypeMismatch`] instead of
/// coercing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue {
    Int(i64),
    Str(String),
    Uuid(Uuid),
}

impl PathValue {
    /// The variant name, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            PathValue::Int(_) => "int",
            PathValue::Str(_) => "string",
            PathValue::Uuid(_) => "uuid",
        }
    }

    pub fn as_int(&self) -> Result<i64, ConvertError> {
        match self {
            PathValue::Int(value) => Ok(*value),
            other => Err(ConvertError::type_mismatch("int", other.kind())),
        }
    }

    pub fn as_str(&self) -> Result<&str, ConvertError> {
        match self {
            PathValue::Str(value) => Ok(value),
            other => Err(ConvertError::type_mismatch("string", other.kind())),
        }
    }

    pub fn as_uuid(&self) -> Result<Uuid, ConvertError> {
        match self {
            PathValue::Uuid(value) => Ok(*value),
            other => Err(ConvertError::type_mismatch("uuid", other.kind())),
        }
    }
}

impl From<i64> for PathValue {
    fn from(value: i64) -> Self {
        PathValue::Int(value)
    }
}

impl From<&str> for PathValue {
    fn from(value: &str) -> Self {
        PathValue::Str(value.to_string())
    }
}

impl From<String> for PathValue {
    fn from(value: String) -> Self {
        PathValue::Str(value)
    }
}

impl From<Uuid> for PathValue {
    fn from(value: Uuid) -> Self {
        PathValue::Uuid(value)
    }
}

type ParseFn = dyn Fn(&str) -> Result<PathValue, ConvertError> + Send + Sync;
type FormatFn = dyn Fn(&PathValue) -> Result<String, ConvertError> + Send + Sync;

/// A named, stateless pair of parse/format functions plus the regex fragment
/// constraining the strings `parse` will ever see.
pub struct Converter {
    name: String,
    regex_fragment: String,
    parse: Box<ParseFn>,
    format: Box<FormatFn>,
}

impl Converter {
    pub fn new<P, F>(name: impl Into<String>, regex_fragment: impl Into<String>, parse: P, format: F) -> Self
    where
        P: Fn(&str) -> Result<PathValue, ConvertError> + Send + Sync + 'static,
        F: Fn(&PathValue) -> Result<String, ConvertError> + Send + Sync + 'static,
    {
        Self { name: name.into(), regex_fragment: regex_fragment.into(), parse: Box::new(parse), format: Box::new(format) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regex_fragment(&self) -> &str {
        &self.regex_fragment
    }

    pub fn parse(&self, raw: &str) -> Result<PathValue, ConvertError> {
        (self.parse)(raw)
    }

    pub fn format(&self, value: &PathValue) -> Result<String, ConvertError> {
        (self.format)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("name", &self.name).field("regex_fragment", &self.regex_fragment).finish()
    }
}

/// Name → converter map, pre-populated with the built-ins.
///
/// Registration is last-wins: registering under an existing name shadows it
/// for routes registered afterwards. Routes snapshot their converters at
/// registration time, so earlier routes keep the fragment and parse/format
/// behavior they were compiled with.
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<Converter>>,
}

impl ConverterRegistry {
    /// Creates a registry containing only the five built-in converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self { converters: HashMap::new() };
        registry.register(int_converter());
        registry.register(string_converter());
        registry.register(slug_converter());
        registry.register(uuid_converter());
        registry.register(path_converter());
        registry
    }

    /// Inserts a converter under its own name, replacing any previous entry.
    pub fn register(&mut self, converter: Converter) {
        self.converters.insert(converter.name().to_string(), Arc::new(converter));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Converter>> {
        self.converters.get(name)
    }
}

/// `int`: non-negative decimal integers, parsed as `i64`.
///
/// The fragment rejects signs and non-digits, so the only way `parse` can
/// fail is overflow past `i64::MAX`.
fn int_converter() -> Converter {
    Converter::new(
        "int",
        "[0-9]+",
        |raw| raw.parse::<i64>().map(PathValue::Int).map_err(|e| ConvertError::invalid_int(raw, e)),
        |value| value.as_int().map(|i| i.to_string()),
    )
}

/// `string`: any run of characters up to the next path separator.
fn string_converter() -> Converter {
    Converter::new(
        "string",
        "[^/]+",
        |raw| Ok(PathValue::Str(raw.to_string())),
        |value| value.as_str().map(str::to_string),
    )
}

/// `slug`: letters, digits, hyphens and underscores.
fn slug_converter() -> Converter {
    Converter::new(
        "slug",
        "[-a-zA-Z0-9_]+",
        |raw| Ok(PathValue::Str(raw.to_string())),
        |value| value.as_str().map(str::to_string),
    )
}

/// `uuid`: canonical lowercase hyphenated form, e.g.
/// `075194d3-6885-417e-a8a8-6c931e272f00`.
fn uuid_converter() -> Converter {
    Converter::new(
        "uuid",
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        |raw| Uuid::parse_str(raw).map(PathValue::Uuid).map_err(|e| ConvertError::invalid_uuid(raw, e)),
        |value| value.as_uuid().map(|u| u.as_hyphenated().to_string()),
    )
}

/// `path`: catch-all, matches across path separators.
fn path_converter() -> Converter {
    Converter::new(
        "path",
        ".+",
        |raw| Ok(PathValue::Str(raw.to_string())),
        |value| value.as_str().map(str::to_string),
    )
}
