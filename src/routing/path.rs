//! Path templates and request path normalization.
//!
//! # Responsibilities
//! - Parse route templates (`/user/{id}/edit`) into literal and placeholder segments
//! - Reject malformed templates at construction time
//! - Normalize request paths into decoded segments for matching
//!
//! # Design Decisions
//! - A placeholder always occupies a whole segment
//! - Empty segments are ignored, so trailing and doubled slashes are not significant
//! - Request segments are percent-decoded once, before any comparison

use std::fmt;

use crate::routing::error::RouterError;

/// One segment of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Must equal the request segment.
    Literal(String),
    /// Binds the request segment under this name.
    Placeholder(String),
}

/// A validated route path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse and validate a template.
    pub fn parse(path: &str) -> Result<Self, RouterError> {
        if !path.starts_with('/') {
            return Err(RouterError::invalid_path(path, "must start with '/'"));
        }

        let mut segments: Vec<Segment> = Vec::new();
        for part in path.split('/').filter(|s| !s.is_empty()) {
            let segment = parse_segment(path, part)?;
            if let Segment::Placeholder(name) = &segment {
                let duplicate = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Placeholder(existing) if existing == name));
                if duplicate {
                    return Err(RouterError::invalid_path(
                        path,
                        format!("placeholder '{{{}}}' is used twice", name),
                    ));
                }
            }
            segments.push(segment);
        }

        let raw = render(&segments);
        Ok(Self { raw, segments })
    }

    /// The normalized template string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Number of literal segments; higher means more specific.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// True when the template has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.literal_count() == self.segments.len()
    }

    /// Match request segments against this template.
    ///
    /// Returns the placeholder values in template order. A dynamic template
    /// accepts more request segments than it declares; the caller takes the
    /// surplus from `segments[self.segments().len()..]`.
    pub fn match_segments<'a>(&self, segments: &'a [String], dynamic: bool) -> Option<Vec<&'a str>> {
        let arity_ok = if dynamic {
            segments.len() >= self.segments.len()
        } else {
            segments.len() == self.segments.len()
        };
        if !arity_ok {
            return None;
        }

        let mut values = Vec::new();
        for (template, actual) in self.segments.iter().zip(segments) {
            match template {
                Segment::Literal(literal) => {
                    if literal != actual {
                        return None;
                    }
                }
                Segment::Placeholder(_) => values.push(actual.as_str()),
            }
        }
        Some(values)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(path: &str, part: &str) -> Result<Segment, RouterError> {
    if !part.contains('{') && !part.contains('}') {
        // request segments are compared decoded
        if part.contains('%') {
            return Err(RouterError::invalid_path(
                path,
                format!("segment '{}' must not be percent-encoded", part),
            ));
        }
        return Ok(Segment::Literal(part.to_string()));
    }

    let name = part
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| {
            RouterError::invalid_path(path, format!("segment '{}' has unbalanced braces", part))
        })?;

    if name.is_empty() {
        return Err(RouterError::invalid_path(path, "empty placeholder name"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RouterError::invalid_path(
            path,
            format!("invalid placeholder name '{}'", name),
        ));
    }

    Ok(Segment::Placeholder(name.to_string()))
}

fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            Segment::Literal(literal) => out.push_str(literal),
            Segment::Placeholder(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
    }
    out
}

/// Normalize a literal path: leading slash, no empty segments, no trailing slash.
pub fn normalize_path(path: &str) -> String {
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

/// A request path prepared for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    normalized: String,
}

impl RequestPath {
    /// Strip the query string and the base URL prefix, then decode each segment.
    ///
    /// The base is only stripped on a segment boundary: `/app` is removed from
    /// `/app/x` but not from `/application/x`.
    pub fn parse(path: &str, base_url: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        let base = base_url.trim_end_matches('/');
        let path = match path.strip_prefix(base) {
            Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
            _ => path,
        };

        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();
        let normalized = format!("/{}", segments.join("/"));

        Self {
            segments,
            normalized,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The decoded path, e.g. `/user/7`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

/// Percent-decode a path segment; undecodable input is kept verbatim.
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Percent-encode a value for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
