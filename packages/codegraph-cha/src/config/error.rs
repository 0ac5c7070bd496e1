//! Configuration error types

use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Range validation error
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// Unknown field in YAML
    #[error("Unknown field '{field}' in section '{section}'. {suggestion}")]
    UnknownField {
        field: String,
        section: String,
        suggestion: String,
    },

    /// Missing version field in YAML
    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    /// Unsupported version
    #[error("Unsupported configuration version {found}. Supported versions: {}", supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u64, supported: Vec<u64> },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a range error with a hint
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    /// Create an unknown field error with suggestion
    pub fn unknown_field_with_suggestion(
        field: impl Into<String>,
        section: impl Into<String>,
        valid_fields: &[&str],
    ) -> Self {
        let field = field.into();
        let suggestion = find_closest_match(&field, valid_fields);

        Self::UnknownField {
            field,
            section: section.into(),
            suggestion,
        }
    }
}

/// Find closest match using simple edit distance
fn find_closest_match(target: &str, candidates: &[&str]) -> String {
    match candidates
        .iter()
        .min_by_key(|candidate| levenshtein_distance(target, candidate))
    {
        Some(closest) => format!("Did you mean '{}'?", closest),
        None => "No valid fields available".to_string(),
    }
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, c1) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in b.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
