//! Catalog data models.

use serde::{Deserialize, Serialize};

/// Link value used when a sponsor URL is missing or unsafe
pub const PLACEHOLDER_URL: &str = "#";

/// One playable number and its display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Board number (1..N, unique within a catalog)
    pub number: u32,

    /// Traditional meaning read out with the number
    pub label: String,

    /// Meaning in the local dialect, if the catalog has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect_label: Option<String>,
}

impl Entry {
    /// Create an entry without a dialect label
    pub fn new(number: u32, label: impl Into<String>) -> Self {
        Self {
            number,
            label: label.into(),
            dialect_label: None,
        }
    }

    /// Attach a dialect label
    pub fn with_dialect(mut self, dialect_label: impl Into<String>) -> Self {
        self.dialect_label = Some(dialect_label.into());
        self
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.number, self.label)
    }
}

/// Sponsor shown alongside drawn numbers
///
/// Field names on the wire match the sponsor feed so that sponsors embedded in
/// persisted history records decode with the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    /// Logo image reference
    #[serde(rename = "logo")]
    pub logo_ref: String,

    /// Sanitized link target: an http(s) URL or `"#"`
    #[serde(rename = "url")]
    pub target_url: String,

    /// Optional display name
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Shown in the static showcase only, never rotated on draws
    #[serde(rename = "onlyShowcase", default)]
    pub showcase_only: bool,
}

impl Sponsor {
    /// Create a rotating sponsor
    pub fn new(logo_ref: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            logo_ref: logo_ref.into(),
            target_url: target_url.into(),
            display_name: None,
            showcase_only: false,
        }
    }

    /// Attach a display name
    pub fn with_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Mark the sponsor as showcase-only
    pub fn showcase(mut self) -> Self {
        self.showcase_only = true;
        self
    }

    /// Whether the sponsor links somewhere real
    pub fn has_link(&self) -> bool {
        self.target_url != PLACEHOLDER_URL
    }

    /// Whether the sponsor takes part in draw-time rotation
    pub fn is_rotation_eligible(&self) -> bool {
        !self.showcase_only && self.has_link()
    }

    /// Name to show, falling back to the logo reference
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.logo_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsor_eligibility() {
        let sponsor = Sponsor::new("bar.png", "https://bar.example");
        assert!(sponsor.is_rotation_eligible());
        assert!(!sponsor.clone().showcase().is_rotation_eligible());
        assert!(!Sponsor::new("bar.png", PLACEHOLDER_URL).is_rotation_eligible());
    }

    #[test]
    fn test_sponsor_wire_names() {
        let sponsor = Sponsor::new("bar.png", "https://bar.example").with_name("Bar Sport");
        let json = serde_json::to_value(&sponsor).unwrap();

        assert_eq!(json["logo"], "bar.png");
        assert_eq!(json["url"], "https://bar.example");
        assert_eq!(json["name"], "Bar Sport");
        assert_eq!(json["onlyShowcase"], false);
    }

    #[test]
    fn test_sponsor_label_fallback() {
        assert_eq!(Sponsor::new("bar.png", "#").label(), "bar.png");
        assert_eq!(
            Sponsor::new("bar.png", "#").with_name("Bar").label(),
            "Bar"
        );
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry::new(90, "La paura").with_dialect("'A paura");
        assert_eq!(entry.to_string(), "90 - La paura");
        assert_eq!(entry.dialect_label.as_deref(), Some("'A paura"));
    }
}
