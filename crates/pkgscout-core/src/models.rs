use serde::{Deserialize, Serialize};

/// A package as returned by the registry search
///
/// Only lives for the duration of a search session; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Empty when the registry has no description
    pub description: String,
    /// Package page on npmjs.com, when the registry reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_url: Option<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            npm_url: None,
        }
    }

    /// Description for display, with a placeholder for blank ones
    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            "No description"
        } else {
            &self.description
        }
    }

    /// Where to send the browser for this package
    pub fn page_url(&self) -> String {
        self.npm_url
            .clone()
            .unwrap_or_else(|| format!("https://www.npmjs.com/package/{}", self.name))
    }
}

/// A saved package with the user's reason for keeping it
///
/// Field names are the on-disk JSON shape: `{"name": .., "reason": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
    pub reason: String,
}

impl Favorite {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_json_shape() {
        let fav = Favorite::new("lodash", "utility functions");
        let json = serde_json::to_string(&fav).unwrap();
        assert_eq!(json, r#"{"name":"lodash","reason":"utility functions"}"#);
    }

    #[test]
    fn test_display_description_placeholder() {
        let mut pkg = Package::new("left-pad", "1.3.0");
        assert_eq!(pkg.display_description(), "No description");

        pkg.description = "String left pad".to_string();
        assert_eq!(pkg.display_description(), "String left pad");
    }

    #[test]
    fn test_page_url_fallback() {
        let pkg = Package::new("@types/node", "22.0.0");
        assert_eq!(pkg.page_url(), "https://www.npmjs.com/package/@types/node");
    }
}
