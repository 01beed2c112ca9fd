//! Ordered `key value` header lines followed by a free-text body.
//!
//! ```text
//! commit 0155eb4229851634a0f03eb265b69f5a2d56f341
//! file src/example.txt:12
//!
//! Too many levels of indentation here.
//! ```

use indexmap::IndexMap;
use tracing::debug;

const LINE_SEPARATOR: char = '\n';
const ITEM_SEPARATOR: char = ' ';

/// Header properties plus body text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBlob {
    properties: IndexMap<String, String>,
    /// Free text following the first blank line.
    pub message: String,
}

impl PropertyBlob {
    /// Creates an empty blob.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses blob text.
    ///
    /// Header lines without a separator are skipped. Everything after the
    /// first blank line is kept verbatim as the message.
    pub fn parse(content: &str) -> Self {
        let (header, message) = if let Some(body) = content.strip_prefix(LINE_SEPARATOR) {
            ("", body)
        } else if let Some(pos) = content.find("\n\n") {
            (&content[..pos], &content[pos + 2..])
        } else {
            (content, "")
        };

        let mut properties = IndexMap::new();
        for line in header.lines() {
            match line.split_once(ITEM_SEPARATOR) {
                Some((name, value)) => {
                    properties.insert(name.to_string(), value.to_string());
                }
                None => debug!(line, "skipping property line without value"),
            }
        }

        Self {
            properties,
            message: message.to_string(),
        }
    }

    /// Sets a property, keeping the position of an existing key.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.properties.insert(name.to_string(), value.into());
    }

    /// Looks up a property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Iterates properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the blob text.
    pub fn serialize(&self) -> String {
        let mut content = String::new();
        for (name, value) in &self.properties {
            content.push_str(name);
            content.push(ITEM_SEPARATOR);
            content.push_str(value);
            content.push(LINE_SEPARATOR);
        }
        if !self.message.is_empty() {
            content.push(LINE_SEPARATOR);
            content.push_str(&self.message);
        }
        content
    }
}
