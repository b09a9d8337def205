//! Coarse emotion from face attribute probabilities.
//!
//! Rules are checked in order and the first match wins:
//! 1. smile probability strictly above 0.5 → happy
//! 2. both eye-open probabilities below 0.5 → sleepy
//! 3. otherwise neutral
//!
//! Unavailable attributes never satisfy a rule.

use std::fmt;

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::constants::{HAPPY_SMILE_THRESHOLD, SLEEPY_EYE_OPEN_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmotionLabel {
    /// Carries the smile probability that triggered it.
    Happy(f32),
    /// Carries the left eye-open probability.
    Sleepy(f32),
    Neutral,
}

impl EmotionLabel {
    pub fn name(&self) -> &'static str {
        match self {
            EmotionLabel::Happy(_) => "Happy",
            EmotionLabel::Sleepy(_) => "Sleepy",
            EmotionLabel::Neutral => "Neutral",
        }
    }

    pub fn probability(&self) -> Option<f32> {
        match self {
            EmotionLabel::Happy(p) | EmotionLabel::Sleepy(p) => Some(*p),
            EmotionLabel::Neutral => None,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.probability() {
            Some(p) => write!(f, "{} {p:.2}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

pub fn classify(face: &DetectedFace) -> EmotionLabel {
    if let Some(smiling) = face.smiling_probability() {
        if smiling > HAPPY_SMILE_THRESHOLD {
            return EmotionLabel::Happy(smiling);
        }
    }

    if let (Some(left), Some(right)) = (
        face.left_eye_open_probability(),
        face.right_eye_open_probability(),
    ) {
        if left < SLEEPY_EYE_OPEN_THRESHOLD && right < SLEEPY_EYE_OPEN_THRESHOLD {
            return EmotionLabel::Sleepy(left);
        }
    }

    EmotionLabel::Neutral
}
