//! Batch image detection results.

use serde::{Deserialize, Serialize};

use crate::prediction::CanonicalPrediction;

/// Outcome for one file in a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CanonicalPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn succeeded(
        filename: impl Into<String>,
        result: CanonicalPrediction,
        image_base64: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            success: true,
            result: Some(result),
            image_base64,
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            success: false,
            result: None,
            image_base64: None,
            error: Some(error.into()),
        }
    }
}

/// Summary over a batch. Percentages count successful items only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub successful_predictions: usize,
    pub failed_predictions: usize,
    pub fake_images: usize,
    pub fake_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Verdict;

    #[test]
    fn test_failed_item_omits_result_fields() {
        let json = serde_json::to_value(BatchItemResult::failed("a.png", "File is not an image")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "File is not an image");
        assert!(json.get("result").is_none());
        assert!(json.get("image_base64").is_none());
    }

    #[test]
    fn test_succeeded_item() {
        let prediction = CanonicalPrediction {
            label: Verdict::Real,
            is_fake: false,
            confidence: 1.0,
            raw_prediction: 0,
        };
        let item = BatchItemResult::succeeded("b.jpg", prediction, None);
        assert!(item.success);
        assert!(item.error.is_none());
        assert_eq!(item.result.unwrap().raw_prediction, 0);
    }
}
