//! Analysis request validation.
//!
//! Validation order:
//! 1. Body is a JSON object with both `image` and `analysis_type`
//! 2. `analysis_type` is a known discriminator
//! 3. `bin_category`, when present, names a known slot
//! 4. `image` decodes as base64
//!
//! Nothing here touches an upstream client.

use crate::error::ApiError;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use binsight_core::BinSlot;
use serde_json::{Map, Value};

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const MISSING_FIELDS: &str = "Missing image or analysis_type in payload.";

/// Which analysis the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    Segregation,
    Fullness,
}

impl AnalysisType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "segregation" => Some(AnalysisType::Segregation),
            "fullness" => Some(AnalysisType::Fullness),
            _ => None,
        }
    }
}

/// A validated analysis request.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub analysis: AnalysisType,
    pub image: Vec<u8>,
    pub slot: BinSlot,
}

impl AnalyzeRequest {
    /// Validate a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
        };
        let (Some(image), Some(kind)) = (present(&fields, "image"), present(&fields, "analysis_type"))
        else {
            return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
        };

        let analysis = match kind {
            Value::String(s) => AnalysisType::parse(s),
            _ => None,
        }
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid analysis type: {}.", display(kind))))?;

        let slot = match present(&fields, "bin_category") {
            None => BinSlot::default(),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid bin_category: {s}.")))?,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("Invalid bin_category: {other}.")));
            }
        };

        let Value::String(encoded) = image else {
            return Err(ApiError::BadRequest("Image must be a base64 string.".to_string()));
        };
        let image = decode_image(encoded)?;

        Ok(Self {
            analysis,
            image,
            slot,
        })
    }
}

/// A field counts as present when it exists and is not null or "".
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a base64 image, tolerating a `data:` URL prefix and whitespace.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image payload: {e}.")))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use binsight_core::Category;

    fn parse(body: &str) -> Result<AnalyzeRequest, ApiError> {
        AnalyzeRequest::from_body(body.as_bytes())
    }

    fn bad_request_message(result: Result<AnalyzeRequest, ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(message)) => message,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn accepts_segregation_request() {
        let request = parse(r#"{"image": "aGVsbG8=", "analysis_type": "segregation"}"#).unwrap();
        assert_eq!(request.analysis, AnalysisType::Segregation);
        assert_eq!(request.image, b"hello");
        assert_eq!(request.slot, BinSlot::Check);
    }

    #[test]
    fn accepts_bin_category_for_fullness() {
        let request = parse(
            r#"{"image": "aGVsbG8", "analysis_type": "fullness", "bin_category": "plastic"}"#,
        )
        .unwrap();
        assert_eq!(request.analysis, AnalysisType::Fullness);
        assert_eq!(request.slot, BinSlot::Sorted(Category::Plastic));
    }

    #[test]
    fn missing_fields_are_rejected() {
        for body in [
            "",
            "not json",
            "[]",
            r#"{"analysis_type": "fullness"}"#,
            r#"{"image": "aGVsbG8="}"#,
            r#"{"image": "", "analysis_type": "fullness"}"#,
            r#"{"image": null, "analysis_type": "fullness"}"#,
        ] {
            assert_eq!(bad_request_message(parse(body)), MISSING_FIELDS, "body: {body}");
        }
    }

    #[test]
    fn unknown_analysis_type_is_named() {
        let message = bad_request_message(parse(r#"{"image": "aGVsbG8=", "analysis_type": "unknown"}"#));
        assert_eq!(message, "Invalid analysis type: unknown.");
    }

    #[test]
    fn unknown_bin_category_is_rejected() {
        let message = bad_request_message(parse(
            r#"{"image": "aGVsbG8=", "analysis_type": "fullness", "bin_category": "compost"}"#,
        ));
        assert!(message.contains("compost"));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let message = bad_request_message(parse(r#"{"image": "***", "analysis_type": "fullness"}"#));
        assert!(message.starts_with("Invalid base64"));
    }

    #[test]
    fn data_url_and_whitespace_are_tolerated() {
        assert_eq!(decode_image("data:image/png;base64,aGVs\nbG8=").unwrap(), b"hello");
    }
}
