//! The path pattern grammar.
//!
//! A pattern is a sequence of literal runs interleaved with capture groups:
//!
//! ```text
//! /make/<string:model>/model/<int:make>/
//! ```
//!
//! Literal runs draw from letters, digits and `-._~/`. A capture group is
//! `<name>` or `<converter:name>`; omitting the converter means `string`.
//! Parsing happens once, at registration time, and malformed patterns fail
//! that registration with [`RouterError::PatternSyntax`].

use crate::error::RouterError;

/// The converter name a bare `<name>` group resolves to.
pub(crate) const DEFAULT_CONVERTER: &str = "string";

/// One `<converter:name>` placeholder in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureGroup {
    converter_name: String,
    param_name: String,
    raw_text: String,
}

impl CaptureGroup {
    pub fn converter_name(&self) -> &str {
        &self.converter_name
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    /// The exact substring of the pattern this group came from, including the
    /// angle brackets.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// A parsed pattern: alternating literal and capture tokens, in order of
/// occurrence. Both the regex compiler and the reverse resolver consume this
/// token stream, so a capture is substituted exactly once on either path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternToken {
    Literal(String),
    Capture(CaptureGroup),
}

fn is_literal_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '/')
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses a pattern string into its token stream.
pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<PatternToken>, RouterError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => {
                let end = rest
                    .find('>')
                    .ok_or_else(|| RouterError::pattern_syntax(pattern, "unbalanced '<': capture group never closed"))?;
                let raw_text = &rest[..=end];
                let body = &rest[1..end];

                if literal.is_empty() && matches!(tokens.last(), Some(PatternToken::Capture(_))) {
                    return Err(RouterError::pattern_syntax(pattern, "adjacent capture groups with no literal between them"));
                }
                if !literal.is_empty() {
                    tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
                }

                tokens.push(PatternToken::Capture(parse_group(pattern, body, raw_text)?));
                rest = &rest[end + 1..];
            }
            '>' => {
                return Err(RouterError::pattern_syntax(pattern, "unbalanced '>': no open capture group"));
            }
            c if is_literal_char(c) => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
            c => {
                return Err(RouterError::pattern_syntax(pattern, format!("character {c:?} is not allowed outside a capture group")));
            }
        }
    }

    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(literal));
    }
    Ok(tokens)
}

fn parse_group(pattern: &str, body: &str, raw_text: &str) -> Result<CaptureGroup, RouterError> {
    let (converter_name, param_name) = match body.split_once(':') {
        Some((converter, param)) => (converter, param),
        None => (DEFAULT_CONVERTER, body),
    };

    if !is_identifier(converter_name) {
        return Err(RouterError::pattern_syntax(pattern, format!("invalid converter name {converter_name:?} in {raw_text:?}")));
    }
    if !is_identifier(param_name) {
        return Err(RouterError::pattern_syntax(pattern, format!("invalid parameter name {param_name:?} in {raw_text:?}")));
    }

    Ok(CaptureGroup {
        converter_name: converter_name.to_string(),
        param_name: param_name.to_string(),
        raw_text: raw_text.to_string(),
    })
}

/// The capture groups of a token stream, in left-to-right order.
pub(crate) fn capture_groups(tokens: &[PatternToken]) -> Vec<&CaptureGroup> {
    tokens
        .iter()
        .filter_map(|token| match token {
            PatternToken::Capture(group) => Some(group),
            PatternToken::Literal(_) => None,
        })
        .collect()
}
