// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON shapes of the model's `:predict` method for outpainting.
//
// Request:  one instance with the matte as a RAW reference image and the mask
//           as a user-provided MASK reference image, plus edit parameters.
// Response: `predictions[0].bytesBase64Encoded` holds the filled image.

use outcrop_core::error::{OutcropError, Result};
use outcrop_core::types::FillParams;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub instances: Vec<Instance>,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    pub reference_type: ReferenceType,
    pub reference_id: u32,
    pub reference_image: EncodedImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image_config: Option<MaskImageConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceType {
    #[serde(rename = "REFERENCE_TYPE_RAW")]
    Raw,
    #[serde(rename = "REFERENCE_TYPE_MASK")]
    Mask,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub bytes_base64_encoded: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskImageConfig {
    pub mask_mode: MaskMode,
    pub dilation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaskMode {
    /// White pixels of the supplied mask are regenerated, black are kept.
    #[serde(rename = "MASK_MODE_USER_PROVIDED")]
    UserProvided,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub edit_config: EditConfig,
    pub edit_mode: EditMode,
    pub sample_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditConfig {
    pub base_steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditMode {
    #[serde(rename = "EDIT_MODE_OUTPAINT")]
    Outpaint,
}

impl PredictRequest {
    /// Single-sample outpaint request with an empty prompt.
    pub fn outpaint(matte_base64: String, mask_base64: String, params: &FillParams) -> Self {
        let matte = ReferenceImage {
            reference_type: ReferenceType::Raw,
            reference_id: 1,
            reference_image: EncodedImage {
                bytes_base64_encoded: matte_base64,
            },
            mask_image_config: None,
        };
        let mask = ReferenceImage {
            reference_type: ReferenceType::Mask,
            reference_id: 2,
            reference_image: EncodedImage {
                bytes_base64_encoded: mask_base64,
            },
            mask_image_config: Some(MaskImageConfig {
                mask_mode: MaskMode::UserProvided,
                dilation: params.dilation,
            }),
        };

        Self {
            instances: vec![Instance {
                prompt: String::new(),
                reference_images: vec![matte, mask],
            }],
            parameters: Parameters {
                edit_config: EditConfig {
                    base_steps: params.base_steps,
                },
                edit_mode: EditMode::Outpaint,
                sample_count: 1,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
}

impl PredictResponse {
    /// Base64 payload of the first prediction, if present and non-empty.
    pub fn into_first_image(self) -> Option<String> {
        self.predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .filter(|b64| !b64.is_empty())
    }
}

/// Pull the output image out of a raw response body.
///
/// A body that isn't JSON, or that lacks the output field, is logged in full
/// and reported as `MissingOutput`.
pub fn parse_output(body: &str) -> Result<String> {
    let image = serde_json::from_str::<PredictResponse>(body)
        .ok()
        .and_then(PredictResponse::into_first_image);

    image.ok_or_else(|| {
        error!(response = %body, "fill response has no predictions[0].bytesBase64Encoded");
        OutcropError::MissingOutput {
            payload: body.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outpaint_request_shape() {
        let params = FillParams {
            dilation: 0.03,
            base_steps: 50,
        };
        let request = PredictRequest::outpaint("TUFUVEU=".into(), "TUFTSw==".into(), &params);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "instances": [{
                    "prompt": "",
                    "referenceImages": [
                        {
                            "referenceType": "REFERENCE_TYPE_RAW",
                            "referenceId": 1,
                            "referenceImage": { "bytesBase64Encoded": "TUFUVEU=" }
                        },
                        {
                            "referenceType": "REFERENCE_TYPE_MASK",
                            "referenceId": 2,
                            "referenceImage": { "bytesBase64Encoded": "TUFTSw==" },
                            "maskImageConfig": {
                                "maskMode": "MASK_MODE_USER_PROVIDED",
                                "dilation": 0.03
                            }
                        }
                    ]
                }],
                "parameters": {
                    "editConfig": { "baseSteps": 50 },
                    "editMode": "EDIT_MODE_OUTPAINT",
                    "sampleCount": 1
                }
            })
        );
    }

    #[test]
    fn first_prediction_is_returned() {
        let body = r#"{"predictions":[{"bytesBase64Encoded":"QUJD","mimeType":"image/png"},{"bytesBase64Encoded":"REVG"}]}"#;
        assert_eq!(parse_output(body).unwrap(), "QUJD");
    }

    #[test]
    fn missing_output_keeps_payload() {
        for body in [
            r#"{}"#,
            r#"{"predictions":[]}"#,
            r#"{"predictions":[{"mimeType":"image/png"}]}"#,
            r#"{"predictions":[{"bytesBase64Encoded":""}]}"#,
            "<html>bad gateway</html>",
        ] {
            match parse_output(body) {
                Err(OutcropError::MissingOutput { payload }) => assert_eq!(payload, body),
                other => panic!("expected MissingOutput for {body}, got {other:?}"),
            }
        }
    }
}
