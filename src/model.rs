use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_UPLOADER: &str = "ocr-batch";

/// One OCR output record as emitted by the upstream extraction stage. Every
/// key is optional; only well-formed JSON is required.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrRecord {
    pub file: Option<String>,
    pub file_path: Option<String>,
    pub fields: Option<Value>,
    pub text: Option<String>,
    pub confidence: Option<f64>,
    pub uploader: Option<String>,
    pub claimant: Option<ClaimantDetails>,
}

impl OcrRecord {
    pub fn uploaded_by(&self) -> &str {
        self.uploader.as_deref().unwrap_or(DEFAULT_UPLOADER)
    }
}

/// Claimant details extracted from the scanned form. A claimant row is only
/// ever written when `geometry` is present and non-null.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimantDetails {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub claimant_type: Option<String>,
    pub tribe: Option<String>,
    pub village: Option<String>,
    pub area_ha: Option<f64>,
    pub geometry: Option<Value>,
    pub properties: Option<Value>,
}

impl ClaimantDetails {
    /// The raw geometry value, with JSON `null` treated as absent.
    pub fn geometry(&self) -> Option<&Value> {
        self.geometry.as_ref().filter(|value| !value.is_null())
    }

    pub fn properties_or_empty(&self) -> Value {
        self.properties
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}
