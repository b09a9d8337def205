use serde::{Deserialize, Serialize};

/// Attribute probabilities reported for one detected face.
///
/// Each attribute is optional: detectors leave it out when classification
/// is disabled or the face is too small to judge. Values are expected in
/// `[0, 1]`; negative (or NaN) values mean "unavailable".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedFace {
    #[serde(alias = "smilingProbability")]
    pub smiling: Option<f32>,
    #[serde(alias = "leftEyeOpen", alias = "leftEyeOpenProbability")]
    pub left_eye_open: Option<f32>,
    #[serde(alias = "rightEyeOpen", alias = "rightEyeOpenProbability")]
    pub right_eye_open: Option<f32>,
}

impl DetectedFace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_smiling(mut self, probability: f32) -> Self {
        self.smiling = Some(probability);
        self
    }

    pub fn with_eyes_open(mut self, left: f32, right: f32) -> Self {
        self.left_eye_open = Some(left);
        self.right_eye_open = Some(right);
        self
    }

    /// Smile probability if present and usable.
    pub fn smiling_probability(&self) -> Option<f32> {
        usable(self.smiling)
    }

    pub fn left_eye_open_probability(&self) -> Option<f32> {
        usable(self.left_eye_open)
    }

    pub fn right_eye_open_probability(&self) -> Option<f32> {
        usable(self.right_eye_open)
    }
}

fn usable(probability: Option<f32>) -> Option<f32> {
    probability.filter(|p| *p >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_probability_is_unavailable() {
        let face = DetectedFace::new().with_smiling(-1.0);
        assert_eq!(face.smiling_probability(), None);
    }

    #[test]
    fn test_nan_probability_is_unavailable() {
        let face = DetectedFace::new().with_eyes_open(f32::NAN, 0.2);
        assert_eq!(face.left_eye_open_probability(), None);
        assert_eq!(face.right_eye_open_probability(), Some(0.2));
    }

    #[test]
    fn test_zero_is_usable() {
        let face = DetectedFace::new().with_smiling(0.0);
        assert_eq!(face.smiling_probability(), Some(0.0));
    }

    #[test]
    fn test_deserialize_snake_and_camel_case() {
        let snake: DetectedFace =
            serde_json::from_str(r#"{"smiling":0.8,"left_eye_open":0.2}"#).unwrap();
        let camel: DetectedFace =
            serde_json::from_str(r#"{"leftEyeOpen":0.2,"rightEyeOpen":0.1}"#).unwrap();

        assert_eq!(snake.smiling, Some(0.8));
        assert_eq!(snake.left_eye_open, Some(0.2));
        assert_eq!(snake.right_eye_open, None);
        assert_eq!(camel.left_eye_open, Some(0.2));
        assert_eq!(camel.right_eye_open, Some(0.1));
        assert_eq!(camel.smiling, None);
    }
}
