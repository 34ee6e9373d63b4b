//! Reverse URL resolution: route name + typed arguments → concrete path.
//!
//! Each named route keeps its original pattern as a token stream with the
//! converter snapshots taken at registration. Resolution walks the tokens
//! left to right, formats one argument per capture group through its bound
//! converter, percent-encodes the result and splices it in. Every failure
//! mode — unknown name, wrong argument count, formatting error — is
//! normalized into [`NoReverseMatch`] so link generation has a single error
//! kind to handle.

use crate::compiler::BoundCapture;
use crate::converter::PathValue;
use crate::error::NoReverseMatch;
use crate::pattern::PatternToken;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::collections::HashMap;

/// Characters percent-encoded in formatted path values.
///
/// `/` is deliberately absent: values produced by the `path` converter keep
/// their separators, so a reversed URL matches the same route and extracts
/// the same value back.
const PATH_UNSAFE: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}').add(b'%');

/// A reverse template token: literal text or a capture with its converter.
#[derive(Debug, Clone)]
enum ReverseToken {
    Literal(String),
    Capture(BoundCapture),
}

/// A named route's reverse template.
#[derive(Debug, Clone)]
pub(crate) struct NamedRoute {
    pattern: String,
    tokens: Vec<ReverseToken>,
}

impl NamedRoute {
    /// Builds the template by pairing the pattern's token stream with the
    /// converter bindings produced when the route was compiled.
    pub(crate) fn new(pattern: String, tokens: &[PatternToken], bindings: &[BoundCapture]) -> Self {
        let mut remaining = bindings.iter();
        let tokens = tokens
            .iter()
            .map(|token| match token {
                PatternToken::Literal(literal) => ReverseToken::Literal(literal.clone()),
                // one binding per capture, in left-to-right order
                PatternToken::Capture(_) => match remaining.next() {
                    Some(binding) => ReverseToken::Capture(binding.clone()),
                    None => ReverseToken::Literal(String::new()),
                },
            })
            .collect();
        Self { pattern, tokens }
    }

    fn capture_count(&self) -> usize {
        self.tokens.iter().filter(|token| matches!(token, ReverseToken::Capture(_))).count()
    }

    fn resolve(&self, name: &str, args: &[PathValue]) -> Result<String, NoReverseMatch> {
        let expected = self.capture_count();
        if args.len() != expected {
            return Err(NoReverseMatch::argument_count(name, expected, args.len()));
        }

        let mut path = String::with_capacity(self.pattern.len());
        let mut next_arg = 0;
        for token in &self.tokens {
            match token {
                ReverseToken::Literal(literal) => path.push_str(literal),
                ReverseToken::Capture(binding) => {
                    let index = next_arg;
                    next_arg += 1;
                    let formatted = binding
                        .converter()
                        .format(&args[index])
                        .map_err(|e| NoReverseMatch::format(name, index, e))?;
                    path.extend(utf8_percent_encode(&formatted, PATH_UNSAFE));
                }
            }
        }
        Ok(path)
    }
}

/// Route name → reverse template. At most one entry per name; a later
/// registration under the same name replaces the earlier one.
#[derive(Debug, Default)]
pub(crate) struct ReverseMap {
    routes: HashMap<String, NamedRoute>,
}

impl ReverseMap {
    pub(crate) fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    pub(crate) fn insert(&mut self, name: String, route: NamedRoute) {
        self.routes.insert(name, route);
    }

    pub(crate) fn resolve(&self, name: &str, args: &[PathValue]) -> Result<String, NoReverseMatch> {
        let route = self.routes.get(name).ok_or_else(|| NoReverseMatch::unknown_name(name))?;
        route.resolve(name, args)
    }
}
