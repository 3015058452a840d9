//! Outbound request construction. Pure: nothing here performs I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::encoder::{strip_data_url_prefix, PDF_MIME_TYPE};
use crate::extraction::prompts::{
    BASIC_ANALYSIS_PROMPT, CREDENTIAL_CHECK_PROMPT, DETAILED_ANALYSIS_PROMPT,
};

/// How much the extraction service is asked to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    Basic,
    #[default]
    Detailed,
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDepth::Basic => "basic",
            AnalysisDepth::Detailed => "detailed",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            AnalysisDepth::Basic => BASIC_ANALYSIS_PROMPT,
            AnalysisDepth::Detailed => DETAILED_ANALYSIS_PROMPT,
        }
    }
}

impl fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AnalysisDepth::Basic),
            "detailed" => Ok(AnalysisDepth::Detailed),
            other => Err(format!("unknown analysis depth '{other}' (expected basic or detailed)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Best-effort output constraint. The service may ignore it, so the parser
/// stays defensive regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl AnalysisRequest {
    /// The instruction prompt, if the request carries one.
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
    }
}

/// Builds the analysis request for an already-encoded PDF.
pub fn build_request(encoded_file: &str, depth: AnalysisDepth) -> AnalysisRequest {
    AnalysisRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::Text {
                    text: depth.prompt().to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: PDF_MIME_TYPE.to_string(),
                        data: strip_data_url_prefix(encoded_file).to_string(),
                    },
                },
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(depth),
        }),
    }
}

/// Text-only request for verifying the access key.
pub fn credential_check_request() -> AnalysisRequest {
    AnalysisRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part::Text {
                text: CREDENTIAL_CHECK_PROMPT.to_string(),
            }],
        }],
        generation_config: None,
    }
}

/// Output schema mirroring `ResumeAnalysis` for the given depth.
pub fn response_schema(depth: AnalysisDepth) -> Value {
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    let mut properties = json!({
        "contactInfo": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "email": { "type": "STRING" },
                "phone": { "type": "STRING" },
                "linkedin": { "type": "STRING" },
                "location": { "type": "STRING" },
                "website": { "type": "STRING" }
            }
        },
        "summary": { "type": "STRING" },
        "workExperience": {
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "company": { "type": "STRING" },
                    "duration": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "achievements": string_list
                }
            }
        },
        "education": {
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "degree": { "type": "STRING" },
                    "institution": { "type": "STRING" },
                    "year": { "type": "STRING" },
                    "gpa": { "type": "STRING" },
                    "honors": { "type": "STRING" }
                }
            }
        },
        "projects": {
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "technologies": string_list,
                    "url": { "type": "STRING" }
                }
            }
        }
    });

    let extra = match depth {
        AnalysisDepth::Basic => json!({
            "skills": string_list,
            "certifications": string_list
        }),
        AnalysisDepth::Detailed => json!({
            "skills": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "category": { "type": "STRING" },
                        "proficiency": { "type": "NUMBER" }
                    }
                }
            },
            "certifications": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "issuer": { "type": "STRING" },
                        "year": { "type": "STRING" }
                    }
                }
            },
            "languages": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "language": { "type": "STRING" },
                        "proficiency": { "type": "STRING" }
                    }
                }
            },
            "recommendations": string_list,
            "keywords": string_list,
            "atsScore": { "type": "NUMBER" }
        }),
    };

    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        props.extend(extra);
    }

    json!({ "type": "OBJECT", "properties": properties })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_keys(depth: AnalysisDepth) -> Vec<String> {
        let mut keys: Vec<String> = response_schema(depth)["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_request_wire_shape() {
        let req = build_request("data:application/pdf;base64,QUJD", AnalysisDepth::Basic);
        let json = serde_json::to_value(&req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert!(parts[0]["text"].as_str().unwrap().contains("ONLY valid JSON"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_basic_schema_keys() {
        assert_eq!(
            schema_keys(AnalysisDepth::Basic),
            vec![
                "certifications",
                "contactInfo",
                "education",
                "projects",
                "skills",
                "summary",
                "workExperience"
            ]
        );
    }

    #[test]
    fn test_detailed_schema_adds_keys() {
        let keys = schema_keys(AnalysisDepth::Detailed);
        for key in ["languages", "recommendations", "keywords", "atsScore"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
        let schema = response_schema(AnalysisDepth::Detailed);
        assert_eq!(schema["properties"]["skills"]["items"]["type"], "OBJECT");
    }

    #[test]
    fn test_depth_parsing() {
        assert_eq!("Basic".parse::<AnalysisDepth>(), Ok(AnalysisDepth::Basic));
        assert_eq!(" detailed ".parse::<AnalysisDepth>(), Ok(AnalysisDepth::Detailed));
        assert!("deep".parse::<AnalysisDepth>().is_err());
    }

    #[test]
    fn test_credential_check_has_no_schema() {
        let req = credential_check_request();
        assert!(req.generation_config.is_none());
        assert!(req.prompt().unwrap().contains("API test successful"));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("generationConfig").is_none());
    }
}
