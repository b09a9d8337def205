use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    Fast,
    Accurate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkMode {
    None,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    None,
    All,
}

/// Detector tuning, fixed when the detector is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub performance_mode: PerformanceMode,
    pub landmark_mode: LandmarkMode,
    /// Without classification no attribute probabilities are reported.
    pub classification_mode: ClassificationMode,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            performance_mode: PerformanceMode::Accurate,
            landmark_mode: LandmarkMode::All,
            classification_mode: ClassificationMode::All,
        }
    }
}

impl DetectorOptions {
    pub fn classifies(&self) -> bool {
        self.classification_mode == ClassificationMode::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_accurate_with_everything_enabled() {
        let options = DetectorOptions::default();
        assert_eq!(options.performance_mode, PerformanceMode::Accurate);
        assert_eq!(options.landmark_mode, LandmarkMode::All);
        assert!(options.classifies());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: DetectorOptions =
            serde_json::from_str(r#"{"classification_mode":"none"}"#).unwrap();
        assert!(!options.classifies());
        assert_eq!(options.performance_mode, PerformanceMode::Accurate);
    }
}
