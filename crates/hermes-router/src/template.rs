//! Path templates.
//!
//! A template is an ordered list of segments, each either a literal or a
//! named parameter. Parameters are written `:name`; the brace form `{name}`
//! is accepted as well. Templates compose, so a group mounted at
//! `/v1/books/:bookId` and an endpoint at `/chats/:chatId` resolve to the
//! full template `/v1/books/:bookId/chats/:chatId`.

use crate::error::RouteError;
use std::fmt;
use std::str::FromStr;

/// One segment of a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// Captures one path segment under this name.
    Param(String),
}

impl Segment {
    fn parse(raw: &str, template: &str) -> Result<Self, RouteError> {
        let name = raw
            .strip_prefix(':')
            .or_else(|| raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')));

        match name {
            Some("") => Err(RouteError::invalid(template, "empty parameter name")),
            Some(name) if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                Err(RouteError::invalid(
                    template,
                    format!("invalid parameter name '{name}'"),
                ))
            }
            Some(name) => Ok(Self::Param(name.to_string())),
            None if raw.contains(['{', '}']) => Err(RouteError::invalid(
                template,
                format!("unbalanced braces in segment '{raw}'"),
            )),
            None => Ok(Self::Literal(raw.to_string())),
        }
    }
}

/// A parsed path template.
///
/// Parameter names are unique within a template; that holds for joined
/// templates too.
///
/// # Example
///
/// ```rust
/// use hermes_router::PathTemplate;
///
/// let base: PathTemplate = "/v1/books/:bookId".parse().unwrap();
/// let full = base.join(&"/chats/:chatId".parse().unwrap()).unwrap();
///
/// assert_eq!(full.to_string(), "/v1/books/:bookId/chats/:chatId");
/// assert_eq!(full.param_names().collect::<Vec<_>>(), ["bookId", "chatId"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// The root template `/`.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a template. Empty segments are ignored, so `/a//b/` equals `/a/b`.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| Segment::parse(s, template))
            .collect::<Result<Vec<_>, _>>()?;

        let parsed = Self { segments };
        parsed.check_unique_params()?;
        Ok(parsed)
    }

    /// Appends `other` to this template.
    pub fn join(&self, other: &PathTemplate) -> Result<Self, RouteError> {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        let joined = Self { segments };
        joined.check_unique_params()?;
        Ok(joined)
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the parameter names in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns the number of parameter segments.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_names().count()
    }

    /// Returns `true` for the root template.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn check_unique_params(&self) -> Result<(), RouteError> {
        let names: Vec<&str> = self.param_names().collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(RouteError::DuplicateParam {
                    template: self.to_string(),
                    name: (*name).to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{lit}")?,
                Segment::Param(name) => write!(f, "/:{name}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for PathTemplate {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
