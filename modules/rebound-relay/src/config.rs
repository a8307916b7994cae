use std::env;

use rebound::{JsonDecoder, SubjectMapper};
use tracing::info;

/// Relay configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    // Subject mapping
    pub subject_prefix: String,
    pub subject_id_segment: Option<usize>,

    // Decoding
    pub strict_json: bool,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    /// Panics with a clear message if a value does not parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            subject_prefix: lookup("REBOUND_SUBJECT_PREFIX").unwrap_or_default(),
            subject_id_segment: lookup("REBOUND_SUBJECT_ID_SEGMENT")
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    v.trim()
                        .parse()
                        .expect("REBOUND_SUBJECT_ID_SEGMENT must be a non-negative number")
                }),
            strict_json: lookup("REBOUND_STRICT_JSON")
                .map(|v| parse_bool("REBOUND_STRICT_JSON", &v))
                .unwrap_or(false),
        }
    }

    pub fn subject_mapper(&self) -> SubjectMapper {
        let mapper = SubjectMapper::new(self.subject_prefix.clone());
        match self.subject_id_segment {
            Some(index) => mapper.with_id_segment(index),
            None => mapper,
        }
    }

    pub fn decoder(&self) -> JsonDecoder {
        if self.strict_json {
            JsonDecoder::strict()
        } else {
            JsonDecoder::new()
        }
    }

    pub fn log_summary(&self) {
        info!(
            subject_prefix = %self.subject_prefix,
            subject_id_segment = ?self.subject_id_segment,
            strict_json = self.strict_json,
            "Relay configuration loaded"
        );
    }
}

fn parse_bool(key: &str, value: &str) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" | "" => false,
        other => panic!("{key} must be true or false (got: {other:?})"),
    }
}
