//! Model types
//!
//! Defines model metadata structures as reported by the server.

use serde::{Deserialize, Serialize};

/// A model known to the server, as returned by the listing endpoint.
///
/// This is an immutable snapshot; the server owns the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique model name, e.g. "llama3.2:latest"
    pub name: String,
    /// String-encoded size in bytes
    #[serde(default)]
    pub size: String,
    /// Content digest of the model blob
    #[serde(default)]
    pub digest: String,
    /// Server-formatted last-modified timestamp
    #[serde(default)]
    pub modified_at: String,
    /// Format and quantization details
    #[serde(default)]
    pub details: ModelDetails,
}

/// Format, family, and quantization details for a model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    /// On-disk format, e.g. "gguf"
    #[serde(default)]
    pub format: String,
    /// Primary model family, e.g. "llama"
    #[serde(default)]
    pub family: String,
    /// All families the model belongs to
    #[serde(default)]
    pub families: Vec<String>,
    /// Parameter count label, e.g. "3.2B"
    #[serde(default)]
    pub parameter_size: String,
    /// Quantization label, e.g. "Q4_K_M"
    #[serde(default)]
    pub quantization_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_parses_full_record() {
        let json = r#"{
            "name": "llama3.2:latest",
            "size": "2019393189",
            "digest": "a80c4f17acd5",
            "modified_at": "2024-11-20T10:22:37.561463Z",
            "details": {
                "format": "gguf",
                "family": "llama",
                "families": ["llama"],
                "parameter_size": "3.2B",
                "quantization_level": "Q4_K_M"
            }
        }"#;
        let model: ModelDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(model.name, "llama3.2:latest");
        assert_eq!(model.details.quantization_level, "Q4_K_M");
        assert_eq!(model.details.families, vec!["llama"]);
    }

    #[test]
    fn test_descriptor_tolerates_missing_details() {
        let model: ModelDescriptor = serde_json::from_str(r#"{"name": "phi3"}"#).unwrap();
        assert_eq!(model.name, "phi3");
        assert!(model.details.family.is_empty());
        assert!(model.details.families.is_empty());
    }
}
