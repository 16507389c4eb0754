// src/analysis/gemini.rs
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capture::source::ImagePayload;
use crate::config::ScanConfig;

use super::classifier::WasteClassifier;
use super::error::{ClassifyError, ClassifyResult};
use super::types::WasteClassification;

/// Instruction sent with every image. The ten numbered fields mirror the
/// response schema below.
const ANALYSIS_PROMPT: &str = "\
Act as a world-class environmental scientist and waste management expert. \
Analyze this image to provide a professional-grade waste classification with extreme precision.

Required JSON output fields:
1. itemName: Scientific or specific commercial name of the item.
2. category: General waste stream (Organic, Recyclable, Hazardous, E-waste, Metal, Glass, or Residual).
3. materialComposition: A brief scientific summary of the primary materials.
4. detailedMaterials: Array of strings showing estimated percentage breakdown (e.g., \"PET Plastic 92%\", \"Polypropylene Cap 5%\", \"Paper Label 3%\").
5. disposalInstructions: Professional, step-by-step guide on how to prepare and dispose of the item.
6. recyclability: Technical rating (e.g., \"High - Widely Recycled\", \"Moderate\", or \"None\").
7. environmentalImpact: Description of the ecological footprint if improperly disposed of.
8. ecoTips: Specific 3Rs (Reduce, Reuse, Recycle) advice tailored specifically to this object.
9. upcyclingIdeas: 3 innovative \"best-out-of-waste\" project ideas.
10. dustbinColor: Standard global sorting color (Green, Blue, Yellow, Red, or Black).";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Schema declaration sent to the service. `dustbinColor` is the only
/// enum-constrained field; the required list matches what we refuse to
/// display without.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "itemName": { "type": "STRING" },
            "category": { "type": "STRING" },
            "materialComposition": { "type": "STRING" },
            "detailedMaterials": { "type": "ARRAY", "items": { "type": "STRING" } },
            "disposalInstructions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "recyclability": { "type": "STRING" },
            "environmentalImpact": { "type": "STRING" },
            "ecoTips": { "type": "ARRAY", "items": { "type": "STRING" } },
            "upcyclingIdeas": { "type": "ARRAY", "items": { "type": "STRING" } },
            "dustbinColor": { "type": "STRING", "enum": ["Green", "Blue", "Yellow", "Red", "Black"] }
        },
        "required": [
            "itemName", "category", "detailedMaterials",
            "dustbinColor", "environmentalImpact", "disposalInstructions"
        ]
    })
}

fn build_request(payload: &ImagePayload) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    text: Some(ANALYSIS_PROMPT.to_string()),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: payload.mime_type.clone(),
                        data: payload.data.clone(),
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Pull the generated text out of the response envelope. A candidate-less
/// body (safety block, no answer) counts as empty.
fn extract_text(response: &GenerateResponse) -> ClassifyResult<String> {
    let text: String = response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }
    Ok(text)
}

/// An empty HTTP body is "the model said nothing", not a format problem.
fn decode_envelope(body: &str) -> ClassifyResult<GenerateResponse> {
    if body.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }
    serde_json::from_str(body).map_err(|e| ClassifyError::InvalidFormat(e.to_string()))
}

fn parse_classification(text: &str) -> ClassifyResult<WasteClassification> {
    let classification: WasteClassification =
        serde_json::from_str(text).map_err(|e| ClassifyError::InvalidFormat(e.to_string()))?;
    classification.validate()?;
    Ok(classification)
}

/// Implementation for the hosted Gemini generateContent endpoint
pub struct GeminiClassifier {
    config: ScanConfig,
    client: Client,
}

impl GeminiClassifier {
    pub fn new(config: ScanConfig) -> ClassifyResult<Self> {
        config.require_api_key()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        info!(
            "Initialized Gemini classifier: model {} at {}",
            config.model, config.endpoint
        );

        Ok(Self { config, client })
    }
}

impl WasteClassifier for GeminiClassifier {
    fn classify(&self, payload: &ImagePayload) -> ClassifyResult<WasteClassification> {
        let api_key = self.config.require_api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        info!(
            "Sending classification request to model {} ({} bytes of base64 {})",
            self.config.model,
            payload.data.len(),
            payload.mime_type
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&build_request(payload))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!("Gemini returned {}: {}", status, body);
            return Err(ClassifyError::ServiceStatus { status, body });
        }

        let envelope = decode_envelope(&response.text()?)?;
        let text = extract_text(&envelope)?;
        parse_classification(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::DustbinColor;

    fn payload() -> ImagePayload {
        ImagePayload::from_jpeg_bytes(b"fakejpegbytes").unwrap()
    }

    #[test]
    fn request_carries_prompt_image_and_schema() {
        let request = serde_json::to_value(build_request(&payload())).unwrap();

        let parts = &request["contents"][0]["parts"];
        assert!(parts[0]["text"]
            .as_str()
            .unwrap()
            .contains("waste management expert"));
        assert!(parts[0]["text"].as_str().unwrap().contains("dustbinColor"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert!(!parts[1]["inlineData"]["data"].as_str().unwrap().is_empty());

        let schema = &request["generationConfig"]["responseSchema"];
        assert_eq!(
            request["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let colors: Vec<&str> = schema["properties"]["dustbinColor"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(colors, ["Green", "Blue", "Yellow", "Red", "Black"]);
        assert_eq!(schema["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn empty_body_is_empty_response() {
        assert!(matches!(
            decode_envelope(""),
            Err(ClassifyError::EmptyResponse)
        ));
        assert!(matches!(
            decode_envelope("   \n"),
            Err(ClassifyError::EmptyResponse)
        ));
    }

    #[test]
    fn non_json_body_is_format_error() {
        assert!(matches!(
            decode_envelope("<html>502 Bad Gateway</html>"),
            Err(ClassifyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn candidate_less_body_is_empty_response() {
        let envelope: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            extract_text(&envelope),
            Err(ClassifyError::EmptyResponse)
        ));
    }

    #[test]
    fn blank_text_is_empty_response() {
        let envelope: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(&envelope),
            Err(ClassifyError::EmptyResponse)
        ));
    }

    #[test]
    fn text_parts_are_concatenated() {
        let envelope: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&envelope).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn invalid_json_is_format_error() {
        assert!(matches!(
            parse_classification("not json at all"),
            Err(ClassifyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn missing_required_field_is_format_error() {
        // No dustbinColor
        let text = r#"{
            "itemName": "PET Bottle",
            "category": "Recyclable",
            "detailedMaterials": ["PET Plastic 95%"],
            "disposalInstructions": ["Rinse"],
            "environmentalImpact": "Long-lived litter"
        }"#;
        assert!(matches!(
            parse_classification(text),
            Err(ClassifyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn conformant_text_parses_to_classification() {
        let text = r#"{
            "itemName": "PET Bottle",
            "category": "Recyclable",
            "detailedMaterials": ["PET Plastic 95%"],
            "disposalInstructions": ["Rinse", "Remove cap", "Place in recycling bin"],
            "environmentalImpact": "Persists for centuries",
            "dustbinColor": "Blue"
        }"#;
        let c = parse_classification(text).unwrap();
        assert_eq!(c.dustbin_color, DustbinColor::Blue);
        assert_eq!(c.disposal_instructions.len(), 3);
    }

    #[test]
    fn classifier_requires_api_key() {
        let result = GeminiClassifier::new(ScanConfig::default());
        assert!(matches!(result, Err(ClassifyError::MissingApiKey)));
    }
}
