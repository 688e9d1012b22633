//! Record - The entity fetched from upstream
//!
//! Record is an Entity (has identity). Its identity never changes once
//! created; the other fields are read-only as far as retrieval is concerned.
//! Mutation belongs to write paths that live outside this workspace.

/// Unique identifier for a Record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Record - A place, a person, a document
///
/// Only the fields the retrieval pipeline forwards are modelled:
/// descriptive text plus an ordered list of auxiliary references
/// (image paths, attachment keys).
#[derive(Debug, Clone)]
pub struct Record {
    /// Unique identifier (Entity identity)
    id: RecordId,
    /// Display name
    name: String,
    /// Free-text description
    description: String,
    /// Optional free-text location
    location: Option<String>,
    /// Ordered auxiliary references
    images: Vec<String>,
}

impl Record {
    /// Create a new Record
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            location: None,
            images: Vec::new(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: append an auxiliary reference
    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.images.push(path.into());
        self
    }

    /// Builder: append several auxiliary references, keeping their order
    pub fn with_images(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.images.extend(paths.into_iter().map(Into::into));
        self
    }

    // ========== Getters ==========

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        // Entity equality: same ID = same entity
        self.id == other.id
    }
}

impl Eq for Record {}
