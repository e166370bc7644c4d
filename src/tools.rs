//! Tool declarations the model can be offered in a request.

use serde::{Deserialize, Serialize};

/// A tool made available to the model for a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<CodeExecution>,
}

/// The code execution tool. Carries no configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeExecution {}

/// A function the model may call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
}

/// JSON-schema-shaped parameter description for a function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    #[serde(rename = "type")]
    pub type_: String,
    pub properties: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
}

/// Request-level configuration for function calling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calling_config: Option<FunctionCallingConfig>,
}

/// How the model should decide whether to call functions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
    pub mode: FunctionCallingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_function_names: Option<Vec<String>>,
}

/// Modes for function calling behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionCallingMode {
    Auto,
    Any,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_declaration_roundtrip() {
        let function = FunctionDeclaration {
            name: "get_weather".to_string(),
            description: "Get the current weather in a given location".to_string(),
            parameters: FunctionParameters {
                type_: "object".to_string(),
                properties: json!({
                    "location": {
                        "type": "string",
                        "description": "The city and state, e.g. San Francisco, CA"
                    }
                }),
                required: vec!["location".to_string()],
            },
        };

        let value = serde_json::to_value(&function).unwrap();
        assert_eq!(value["parameters"]["type"], "object");
        let parsed: FunctionDeclaration = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, function);
    }

    #[test]
    fn test_function_calling_mode_wire_strings() {
        assert_eq!(
            serde_json::to_value(FunctionCallingMode::Auto).unwrap(),
            json!("AUTO")
        );
        assert_eq!(
            serde_json::to_value(FunctionCallingMode::None).unwrap(),
            json!("NONE")
        );
    }

    #[test]
    fn test_tool_config_camel_case() {
        let config = ToolConfig {
            function_calling_config: Some(FunctionCallingConfig {
                mode: FunctionCallingMode::Any,
                allowed_function_names: Some(vec!["get_weather".to_string()]),
            }),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "functionCallingConfig": {
                    "mode": "ANY",
                    "allowedFunctionNames": ["get_weather"]
                }
            })
        );
    }
}
