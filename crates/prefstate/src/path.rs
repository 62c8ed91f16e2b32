use crate::error::{ConvergeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of an [`EntryPath`]: a dictionary key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// The location of one entry inside a document: an ordered, non-empty
/// sequence of [`Segment`]s, resolved from the root dictionary down.
///
/// The textual form is colon-separated, PlistBuddy-style:
/// `AppleFirstWeekday:gregorian`, `NSToolbar:items:2`. A component made of
/// digits only parses as an array index; a dictionary key that happens to be
/// numeric (or that contains a colon) must be built programmatically via
/// [`Segment::Key`] and [`EntryPath::from_segments`].
///
/// ```
/// use prefstate::v1::{EntryPath, Segment};
///
/// let path = EntryPath::parse("NSToolbar:items:2").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         Segment::Key("NSToolbar".into()),
///         Segment::Key("items".into()),
///         Segment::Index(2),
///     ]
/// );
/// assert_eq!(path.to_string(), "NSToolbar:items:2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPath {
    segments: Vec<Segment>,
}

impl EntryPath {
    /// Parse a colon-separated entry path. Empty input or an empty
    /// component fails with [`ConvergeError::EmptyPath`].
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ConvergeError::EmptyPath);
        }
        let mut segments = Vec::new();
        for part in s.split(':') {
            if part.is_empty() {
                return Err(ConvergeError::EmptyPath);
            }
            match part.parse::<usize>() {
                Ok(i) => segments.push(Segment::Index(i)),
                Err(_) => segments.push(Segment::Key(part.to_string())),
            }
        }
        Ok(Self { segments })
    }

    /// Build a path from explicit segments. Fails with
    /// [`ConvergeError::EmptyPath`] if the list is empty.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(ConvergeError::EmptyPath);
        }
        Ok(Self { segments })
    }

    /// A single-key path.
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(name.into())],
        }
    }

    /// Append a key segment.
    pub fn with_key(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(name.into()));
        self
    }

    /// Append an index segment.
    pub fn with_index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Textual form of the first `n` segments — used to point at the
    /// offending node in error messages.
    pub fn prefix(&self, n: usize) -> String {
        self.segments[..n.min(self.segments.len())]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix(self.segments.len()))
    }
}

impl FromStr for EntryPath {
    type Err = ConvergeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_key() {
        let path = EntryPath::parse("AppleFirstWeekday").unwrap();
        assert_eq!(path.segments(), &[Segment::Key("AppleFirstWeekday".into())]);
    }

    #[test]
    fn test_parse_nested_keys() {
        let path = EntryPath::parse("AppleFirstWeekday:gregorian").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[1], Segment::Key("gregorian".into()));
    }

    #[test]
    fn test_parse_digit_component_is_index() {
        let path = EntryPath::parse("items:0").unwrap();
        assert_eq!(path.segments()[1], Segment::Index(0));
    }

    #[test]
    fn test_parse_mixed_alnum_is_key() {
        let path = EntryPath::parse("2fast").unwrap();
        assert_eq!(path.segments(), &[Segment::Key("2fast".into())]);
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(matches!(
            EntryPath::parse(""),
            Err(ConvergeError::EmptyPath)
        ));
    }

    #[test]
    fn test_parse_empty_component_fails() {
        assert!(matches!(
            EntryPath::parse("a::b"),
            Err(ConvergeError::EmptyPath)
        ));
        assert!(matches!(
            EntryPath::parse("a:"),
            Err(ConvergeError::EmptyPath)
        ));
    }

    #[test]
    fn test_from_segments_empty_fails() {
        assert!(matches!(
            EntryPath::from_segments(vec![]),
            Err(ConvergeError::EmptyPath)
        ));
    }

    #[test]
    fn test_builder() {
        let path = EntryPath::key("a").with_key("b").with_index(3);
        assert_eq!(path.to_string(), "a:b:3");
    }

    #[test]
    fn test_numeric_dict_key_via_segments() {
        let path =
            EntryPath::from_segments(vec![Segment::Key("0".into()), Segment::Key("x".into())])
                .unwrap();
        // Display re-joins, so the text form is ambiguous — re-parsing
        // yields an Index. Programmatic construction is authoritative.
        assert_eq!(path.segments()[0], Segment::Key("0".into()));
        assert_eq!(path.to_string(), "0:x");
    }

    #[test]
    fn test_display_roundtrip() {
        let path = EntryPath::parse("a:b:2:c").unwrap();
        assert_eq!(path.to_string(), "a:b:2:c");
        assert_eq!(EntryPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_prefix() {
        let path = EntryPath::parse("a:b:c").unwrap();
        assert_eq!(path.prefix(0), "");
        assert_eq!(path.prefix(1), "a");
        assert_eq!(path.prefix(2), "a:b");
        assert_eq!(path.prefix(10), "a:b:c");
    }

    #[test]
    fn test_from_str() {
        let path: EntryPath = "a:b".parse().unwrap();
        assert_eq!(path.len(), 2);
    }
}
