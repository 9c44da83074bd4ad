//! Common types used throughout the client
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Ordered list of header name/value pairs
pub type HeaderList = Vec<(String, String)>;

// ============================================================================
// User Agent
// ============================================================================

/// A `name/version` product token for the User-Agent header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpAgent {
    /// Product name
    pub name: String,
    /// Product version
    pub version: String,
}

impl HttpAgent {
    /// Create a new agent
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Agent identifying this library
    pub fn library() -> Self {
        Self::new(crate::NAME, crate::VERSION)
    }

    /// Whether both name and version are non-empty
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.version.trim().is_empty()
    }
}

impl fmt::Display for HttpAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

// ============================================================================
// Automapper Filter
// ============================================================================

/// Filter for automatically generated beatmaps in feed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomapFilter {
    /// Include automapped beatmaps
    #[default]
    Include,
    /// Exclude automapped beatmaps
    Exclude,
    /// Only automapped beatmaps
    Only,
}

impl AutomapFilter {
    /// Value sent as the `automapper` query parameter, if any
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            AutomapFilter::Include => Some("1"),
            AutomapFilter::Exclude => None,
            AutomapFilter::Only => Some("-1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_agent_display() {
        let agent = HttpAgent::new("MyApp", "1.2.3");
        assert_eq!(agent.to_string(), "MyApp/1.2.3");
        assert!(agent.is_valid());
    }

    #[test]
    fn test_http_agent_invalid() {
        assert!(!HttpAgent::new("", "1.0").is_valid());
        assert!(!HttpAgent::new("App", "  ").is_valid());
    }

    #[test]
    fn test_library_agent() {
        let agent = HttpAgent::library();
        assert_eq!(agent.name, "beatsaver-client");
        assert_eq!(agent.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_automap_filter_query_value() {
        assert_eq!(AutomapFilter::Include.query_value(), Some("1"));
        assert_eq!(AutomapFilter::Exclude.query_value(), None);
        assert_eq!(AutomapFilter::Only.query_value(), Some("-1"));
        assert_eq!(AutomapFilter::default(), AutomapFilter::Include);
    }
}
