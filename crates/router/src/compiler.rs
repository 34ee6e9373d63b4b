//! Compiles a parsed pattern into an anchored regex with named groups.
//!
//! The compiler walks the token stream directly instead of substituting text
//! back into the original pattern string: literals are regex-escaped, each
//! capture becomes `(?P<name>fragment)` with the fragment looked up in the
//! converter registry. The expression is built in single-line mode (`(?s)`)
//! so the `path` converter's `.+` fragment can span path separators.

use crate::converter::{Converter, ConverterRegistry};
use crate::error::RouterError;
use crate::pattern::{CaptureGroup, PatternToken};
use regex::Regex;
use std::sync::Arc;

/// A capture group bound to the converter it resolved to at compile time.
///
/// The `Arc<Converter>` is a snapshot: re-registering a converter under the
/// same name later changes neither this route's regex fragment nor its
/// parse/format behavior.
#[derive(Debug, Clone)]
pub struct BoundCapture {
    group: CaptureGroup,
    converter: Arc<Converter>,
}

impl BoundCapture {
    pub fn group(&self) -> &CaptureGroup {
        &self.group
    }

    pub fn param_name(&self) -> &str {
        self.group.param_name()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

/// Compiles `tokens` into an anchored regex, resolving each capture group
/// against `registry`.
///
/// The expression always starts with `^`; `$` is appended when `anchor_end`
/// is set, which it always is for leaf routes — every registered route is a
/// full-path endpoint, never a prefix.
pub(crate) fn compile(
    pattern: &str,
    tokens: &[PatternToken],
    registry: &ConverterRegistry,
    anchor_end: bool,
) -> Result<(Regex, Vec<BoundCapture>), RouterError> {
    let mut expression = String::from("(?s)^");
    let mut captures = Vec::new();

    for token in tokens {
        match token {
            PatternToken::Literal(literal) => expression.push_str(&regex::escape(literal)),
            PatternToken::Capture(group) => {
                let converter = registry
                    .get(group.converter_name())
                    .ok_or_else(|| RouterError::unknown_converter(pattern, group.converter_name()))?;
                expression.push_str("(?P<");
                expression.push_str(group.param_name());
                expression.push('>');
                expression.push_str(converter.regex_fragment());
                expression.push(')');
                captures.push(BoundCapture { group: group.clone(), converter: Arc::clone(converter) });
            }
        }
    }

    if anchor_end {
        expression.push('$');
    }

    let regex = Regex::new(&expression).map_err(|e| RouterError::regex_compile(pattern, e))?;
    Ok((regex, captures))
}
