//! Tool Protocol Abstraction Layer
//!
//! Every DeepL tool answers with the same envelope: a boolean `success`, an
//! `error` string when the call failed, and a flat set of operation specific
//! fields. This module defines that envelope ([`ToolResult`]), the metadata
//! used to advertise tools to a calling agent, and the [`ToolProtocol`] trait
//! that routes a tool name plus JSON parameters to an implementation.
//!
//! # Architecture
//!
//! ```text
//! Agent host → HTTP adapter → ToolProtocol (trait) → DeepLProtocol → handlers
//! ```
//!
//! # Example
//!
//! ```rust
//! use deepl_mcp::tool_protocol::{ToolParameter, ToolParameterType, ToolResult};
//! use serde_json::json;
//!
//! let param = ToolParameter::new("text", ToolParameterType::String)
//!     .with_description("Text to translate")
//!     .required();
//! assert!(param.required);
//!
//! let result = ToolResult::failure("File not found: a.docx").with_field("input_file", json!("a.docx"));
//! let wire = serde_json::to_value(&result).unwrap();
//! assert_eq!(wire["success"], json!(false));
//! assert_eq!(wire["input_file"], json!("a.docx"));
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// The uniform response envelope returned by every tool.
///
/// Serialises flat: `{"success": true, "translated_text": "...", ...}` or
/// `{"success": false, "error": "...", "original_text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool execution was successful
    pub success: bool,
    /// Error message, present only when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Operation specific fields (results on success, echoed inputs on failure)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ToolResult {
    /// Successful envelope. `output` must be a JSON object; any other value is
    /// stored under an `output` key.
    pub fn success(output: Value) -> Self {
        let fields = match output {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("output".to_string(), other);
                map
            }
        };
        Self {
            success: true,
            error: None,
            fields,
        }
    }

    /// Failed envelope carrying the error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            fields: Map::new(),
        }
    }

    /// Attach or replace a field on the envelope.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Borrow a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Render the envelope as a single JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("success".to_string(), Value::Bool(self.success));
        if let Some(error) = &self.error {
            map.insert("error".to_string(), Value::String(error.clone()));
        }
        Value::Object(map)
    }
}

/// Defines the type of a tool parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Defines a parameter for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    /// For array types, specifies the type of items
    pub items: Option<Box<ToolParameterType>>,
    /// Allowed values for enumerated string parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl ToolParameter {
    /// Define a new tool parameter with the provided name and type.
    pub fn new(name: impl Into<String>, param_type: ToolParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            required: false,
            default: None,
            items: None,
            allowed_values: Vec::new(),
        }
    }

    /// Add a human readable description that will surface in generated schemas.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Provide a default value that will be used when the caller omits the parameter.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// For array parameters, declare the type of the contained items.
    pub fn with_items(mut self, item_type: ToolParameterType) -> Self {
        self.items = Some(Box::new(item_type));
        self
    }

    /// Restrict a string parameter to a fixed set of values.
    pub fn with_allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

/// Metadata about a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
    /// Additional metadata specific to the protocol
    pub protocol_metadata: HashMap<String, Value>,
}

impl ToolMetadata {
    /// Create metadata with the supplied identifier and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            protocol_metadata: HashMap::new(),
        }
    }

    /// Append a parameter definition to the tool metadata.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add protocol specific metadata.
    pub fn with_protocol_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.protocol_metadata.insert(key.into(), value);
        self
    }
}

/// Trait for implementing tool execution protocols
#[async_trait]
pub trait ToolProtocol: Send + Sync {
    /// Execute a tool with the given parameters
    async fn execute(
        &self,
        tool_name: &str,
        parameters: Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>>;

    /// Get metadata about available tools
    async fn list_tools(&self) -> Result<Vec<ToolMetadata>, Box<dyn Error + Send + Sync>>;

    /// Get metadata about a specific tool
    async fn get_tool_metadata(
        &self,
        tool_name: &str,
    ) -> Result<ToolMetadata, Box<dyn Error + Send + Sync>>;

    /// Protocol identifier
    fn protocol_name(&self) -> &str;
}

/// Error types for tool operations
#[derive(Debug, Clone)]
pub enum ToolError {
    /// Requested tool is not registered in the current protocol.
    NotFound(String),
    /// Tool execution completed with an application level failure.
    ExecutionFailed(String),
    /// The provided JSON parameters failed validation or deserialization.
    InvalidParameters(String),
    /// A lower level protocol/transport error occurred.
    ProtocolError(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool not found: {}", name),
            ToolError::ExecutionFailed(msg) => write!(f, "Tool execution failed: {}", msg),
            ToolError::InvalidParameters(msg) => write!(f, "Invalid parameters: {}", msg),
            ToolError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
        }
    }
}

impl Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_parameter_builder() {
        let param = ToolParameter::new("formality", ToolParameterType::String)
            .with_description("Formality level")
            .with_allowed_values(&["default", "more", "less"])
            .with_default(json!("default"));

        assert_eq!(param.name, "formality");
        assert_eq!(param.param_type, ToolParameterType::String);
        assert!(!param.required);
        assert_eq!(param.allowed_values.len(), 3);
        assert_eq!(param.default, Some(json!("default")));
    }

    #[test]
    fn test_success_envelope_serializes_flat() {
        let result = ToolResult::success(json!({"translated_text": "Hallo"}));
        let wire = serde_json::to_value(&result).unwrap();

        assert_eq!(wire["success"], json!(true));
        assert_eq!(wire["translated_text"], json!("Hallo"));
        assert!(wire.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope_carries_error_and_echo() {
        let result =
            ToolResult::failure("boom").with_field("original_text", json!("Hello"));
        let wire = result.to_json();

        assert_eq!(wire["success"], json!(false));
        assert_eq!(wire["error"], json!("boom"));
        assert_eq!(wire["original_text"], json!("Hello"));
    }

    #[test]
    fn test_non_object_output_is_wrapped() {
        let result = ToolResult::success(json!([1, 2, 3]));
        assert_eq!(result.get("output"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_envelope_round_trips_through_serde() {
        let wire = json!({"success": false, "error": "nope", "input_file": "x.pdf"});
        let parsed: ToolResult = serde_json::from_value(wire).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("nope"));
        assert_eq!(parsed.get("input_file"), Some(&json!("x.pdf")));
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::NotFound("translate".into());
        assert_eq!(err.to_string(), "Tool not found: translate");
    }
}
