//! Configuration Management
//!
//! Label definitions, the canonical wanted label set and run options

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical label policy as `(name, color, description)`
const WANTED_LABELS: &[(&str, &str, &str)] = &[
    (
        "backwards-incompatible",
        "eb6420",
        "This change will lead to a major version bump for the next release",
    ),
    ("bug", "0e8a16", "Something isn't working"),
    (
        "documentation",
        "006b75",
        "Improvements or additions to documentation",
    ),
    (
        "duplicate",
        "cccccc",
        "This issue or pull request already exists",
    ),
    ("enhancement", "0052cc", "New feature or request"),
    ("good first issue", "7057ff", "Good for newcomers"),
    ("help wanted", "159818", "Extra attention is needed"),
    ("invalid", "e4e669", "This doesn't seem right"),
    ("modulesync", "fbca04", "PR related to modulesync"),
    ("question", "cc317c", "Further information is requested"),
    ("security", "b60205", "Related to a security issue"),
    ("skip-changelog", "343e4c", "Excluded from CHANGELOG"),
    ("wontfix", "ffffff", "This will not be worked on"),
];

/// Label
///
/// A GitHub label as managed by these tools. `name` is the identity key
/// within a repository; `color` is kept normalized (lowercase, no `#`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// Label name
    pub name: String,

    /// Label color (6-digit hex code, normalized without #)
    pub color: String,

    /// Label description (empty when unset)
    #[serde(default)]
    pub description: String,
}

impl Label {
    /// Create a new label, validating and normalizing the color
    ///
    /// # Arguments
    /// - `name`: Label name
    /// - `color`: Label color (6-digit hex code, `#` prefix optional)
    /// - `description`: Label description
    ///
    /// # Errors
    /// Returns an error if the name is empty or the color format is invalid
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let label = Self {
            name: name.into(),
            color: color.into(),
            description: description.into(),
        };

        label.validate()?;
        Ok(label.normalized())
    }

    /// Validate label
    ///
    /// # Errors
    /// - If the name is empty
    /// - If the color format is invalid
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::label_validation("Label name cannot be empty"));
        }

        let normalized_color = Self::normalize_color(&self.color);
        if !is_valid_hex_color(&normalized_color) {
            return Err(Error::InvalidLabelColor(self.color.clone()));
        }

        Ok(())
    }

    /// Normalize color (remove # and convert to lowercase)
    pub fn normalize_color(color: &str) -> String {
        color.trim_start_matches('#').to_lowercase()
    }

    /// Return this label with its color normalized
    pub fn normalized(mut self) -> Self {
        self.color = Self::normalize_color(&self.color);
        self
    }

    /// Whether `other` carries the same color and description
    ///
    /// Names are not compared; callers match labels by name first.
    pub fn is_correct(&self, other: &Label) -> bool {
        Self::normalize_color(&self.color) == Self::normalize_color(&other.color)
            && self.description == other.description
    }
}

/// Options for a label reconciliation run
///
/// Reports are always produced; these flags only gate mutating calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelsOptions {
    /// Create missing labels and update incorrect ones
    pub fix_labels: bool,

    /// Delete labels that are not in the wanted set
    pub delete_labels: bool,
}

/// Canonical wanted label set
///
/// Returns the 13 labels every managed repository should carry, in policy order
pub fn wanted_labels() -> Vec<Label> {
    WANTED_LABELS
        .iter()
        .map(|(name, color, description)| Label {
            name: (*name).to_string(),
            color: (*color).to_string(),
            description: (*description).to_string(),
        })
        .collect()
}

/// Parse repository string into owner and name
///
/// # Arguments
/// - `repo`: Repository string in "owner/repo" format
///
/// # Errors
/// Returns an error if the format is invalid
pub fn parse_repository(repo: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(Error::InvalidRepositoryFormat(repo.to_string()));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Resolve the GitHub access token
///
/// An explicit argument wins over the `GITHUB_TOKEN` environment variable.
///
/// # Errors
/// Returns an error if neither source provides a token
pub fn resolve_access_token(arg_token: Option<String>) -> Result<String> {
    arg_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| {
            Error::config_validation(
                "GitHub access token is required. Set via --access-token or the GITHUB_TOKEN env var",
            )
        })
}

/// Load label definitions from JSON file
///
/// # Errors
/// If file reading, parsing or validation fails
pub fn load_labels_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let content = std::fs::read_to_string(path)?;
    let labels: Vec<Label> = serde_json::from_str(&content)?;
    finalize_labels(labels)
}

/// Load label definitions from YAML file
///
/// # Errors
/// If file reading, parsing or validation fails
pub fn load_labels_from_yaml<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let content = std::fs::read_to_string(path)?;
    let labels: Vec<Label> = serde_yaml::from_str(&content)?;
    finalize_labels(labels)
}

/// Load label definitions from a file, detecting format by extension
///
/// # Arguments
/// - `path`: Path to the label file (.json, .yaml, or .yml)
///
/// # Errors
/// If file reading, parsing, or validation fails, or if the extension is unsupported
pub fn load_labels_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Label file not found: {}", path.display()),
        )
        .into());
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_labels_from_json(path),
        Some("yaml") | Some("yml") => load_labels_from_yaml(path),
        _ => Err(Error::config_validation(
            "Label file must be .json, .yaml, or .yml",
        )),
    }
}

/// Validate, normalize and reject duplicate names
fn finalize_labels(labels: Vec<Label>) -> Result<Vec<Label>> {
    let mut seen = HashSet::new();

    labels
        .into_iter()
        .map(|label| {
            label.validate()?;
            if !seen.insert(label.name.clone()) {
                return Err(Error::label_validation(format!(
                    "Duplicate label name: {}",
                    label.name
                )));
            }
            Ok(label.normalized())
        })
        .collect()
}

/// Validate hex color code
///
/// # Arguments
/// - `color`: Color code (6-digit hex without #)
fn is_valid_hex_color(color: &str) -> bool {
    if color.len() != 6 {
        return false;
    }

    color.chars().all(|c| c.is_ascii_hexdigit())
}
