//! Crop-image damage analysis.
//!
//! [`CropAnalyzer::analyze`] never fails. Without an API key it answers with a
//! randomized mock; when the vision service errors or replies with something
//! that is not a [`CropAnalysis`], it answers with [`CropAnalysis::fallback`].
//! Screens rely on always getting a well-formed result.

use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const PROMPT: &str = "You are an agricultural damage assessor. Inspect the crop in this photo and \
reply with only a JSON object with the keys isDamaged (boolean), damagePercentage (0-100), \
damageType (string), severity (one of low, moderate, high, severe), recommendations (array of \
strings) and confidence (0-100).";

const DAMAGE_TYPES: &[&str] = &[
    "Pest Infestation",
    "Fungal Disease",
    "Drought Stress",
    "Flood Damage",
    "Nutrient Deficiency",
    "Typhoon Damage",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Severe,
}

impl Severity {
    /// Severity band for a damage percentage.
    pub fn from_percentage(pct: u8) -> Self {
        match pct {
            0..=24 => Severity::Low,
            25..=49 => Severity::Moderate,
            50..=74 => Severity::High,
            _ => Severity::Severe,
        }
    }
}

/// Assessment of one crop photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropAnalysis {
    pub is_damaged: bool,
    pub damage_percentage: u8,
    pub damage_type: String,
    pub severity: Severity,
    pub recommendations: Vec<String>,
    pub confidence: u8,
}

impl CropAnalysis {
    /// Returned when the vision service cannot be used.
    pub fn fallback() -> Self {
        CropAnalysis {
            is_damaged: false,
            damage_percentage: 0,
            damage_type: "Unknown".to_string(),
            severity: Severity::Low,
            recommendations: vec![
                "Unable to analyze image. Please try again with a clearer photo.".to_string(),
            ],
            confidence: 0,
        }
    }

    /// Plausible random assessment for demos without an API key.
    pub fn mock() -> Self {
        let mut rng = rand::rng();
        let is_damaged = rng.random_bool(0.7);
        if !is_damaged {
            return CropAnalysis {
                is_damaged,
                damage_percentage: rng.random_range(0..=5),
                damage_type: "None".to_string(),
                severity: Severity::Low,
                recommendations: vec![
                    "Crop appears healthy. Continue regular monitoring.".to_string(),
                    "Maintain current irrigation and fertilization schedule.".to_string(),
                ],
                confidence: rng.random_range(80..=98),
            };
        }

        let damage_percentage = rng.random_range(10..=90);
        let damage_type = DAMAGE_TYPES[rng.random_range(0..DAMAGE_TYPES.len())];
        let severity = Severity::from_percentage(damage_percentage);
        let mut recommendations = vec![
            format!(
                "Document the {} with photos for the insurance claim.",
                damage_type.to_lowercase()
            ),
            "Schedule a field inspection with the agricultural technician.".to_string(),
        ];
        if matches!(severity, Severity::High | Severity::Severe) {
            let urgent = "Consider filing a crop damage report immediately.";
            recommendations.push(urgent.to_string());
        }
        CropAnalysis {
            is_damaged,
            damage_percentage,
            damage_type: damage_type.to_string(),
            severity,
            recommendations,
            confidence: rng.random_range(65..=95),
        }
    }
}

/// Image to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Base64 { data: String, mime: String },
    Url(String),
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime: impl Into<String>) -> Self {
        ImagePayload::Base64 {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime: mime.into(),
        }
    }

    /// Value for the `image_url` field: the URL itself or a `data:` URL.
    pub fn as_url(&self) -> String {
        match self {
            ImagePayload::Base64 { data, mime } => format!("data:{mime};base64,{data}"),
            ImagePayload::Url(url) => url.clone(),
        }
    }
}

/// Vision service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CropAnalyzer {
    http: reqwest::Client,
    config: AnalyzerConfig,
}

impl CropAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        CropAnalyzer {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_mock(&self) -> bool {
        !matches!(self.config.api_key.as_deref(), Some(key) if !key.is_empty())
    }

    pub async fn analyze(&self, image: &ImagePayload) -> CropAnalysis {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            log::info!("no analyzer key configured, returning a mock analysis");
            return CropAnalysis::mock();
        };
        match self.request(api_key, image).await {
            Ok(analysis) => analysis,
            Err(err) => {
                log::warn!("crop analysis failed, using fallback: {err}");
                CropAnalysis::fallback()
            }
        }
    }

    async fn request(&self, api_key: &str, image: &ImagePayload) -> Result<CropAnalysis> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 500,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": PROMPT },
                    { "type": "image_url", "image_url": { "url": image.as_url() } }
                ]
            }]
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::http(response.status().as_u16()));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Upstream("empty completion".to_string()))?;
        parse_analysis(&content)
    }
}

/// Reads the JSON object out of a model reply, tolerating code fences and
/// surrounding prose.
pub fn parse_analysis(content: &str) -> Result<CropAnalysis> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => return Err(ClientError::Upstream("no JSON object in reply".into())),
    };
    serde_json::from_str(json).map_err(|e| ClientError::Decode(e.to_string()))
}
