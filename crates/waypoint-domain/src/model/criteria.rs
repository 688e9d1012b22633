//! Criteria - Opaque query token
//!
//! The pipeline never interprets Criteria. Controller, Service and
//! Repository forward it unchanged; only an `UpstreamFetcher` gives it
//! meaning.

/// A search request as the caller typed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// Free text
    Text(String),
    /// Ordered key/value bag
    Fields(Vec<(String, String)>),
}

impl Criteria {
    /// Free-text criteria
    pub fn text(text: impl Into<String>) -> Self {
        Criteria::Text(text.into())
    }

    /// Empty key/value bag
    pub fn fields() -> Self {
        Criteria::Fields(Vec::new())
    }

    /// Builder: append a key/value pair (turns free text into a bag)
    pub fn with_field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut pairs = match self {
            Criteria::Fields(pairs) => pairs,
            Criteria::Text(text) if text.is_empty() => Vec::new(),
            Criteria::Text(text) => vec![("text".to_string(), text)],
        };
        pairs.push((key.into(), value.into()));
        Criteria::Fields(pairs)
    }

    /// The free text, if this is a text query
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Criteria::Text(text) => Some(text),
            Criteria::Fields(_) => None,
        }
    }

    /// The key/value pairs, empty for a text query
    pub fn pairs(&self) -> &[(String, String)] {
        match self {
            Criteria::Text(_) => &[],
            Criteria::Fields(pairs) => pairs,
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria::Text(String::new())
    }
}

impl From<&str> for Criteria {
    fn from(value: &str) -> Self {
        Criteria::text(value)
    }
}

impl core::fmt::Display for Criteria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Criteria::Text(text) => write!(f, "{:?}", text),
            Criteria::Fields(pairs) => {
                let rendered: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}
