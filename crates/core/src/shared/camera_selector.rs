use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which physical camera a session streams from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSelector {
    #[default]
    Front,
    Back,
}

impl CameraSelector {
    pub fn toggled(self) -> Self {
        match self {
            CameraSelector::Front => CameraSelector::Back,
            CameraSelector::Back => CameraSelector::Front,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CameraSelector::Front => "front",
            CameraSelector::Back => "back",
        }
    }
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(CameraSelector::Front),
            "back" | "rear" => Ok(CameraSelector::Back),
            other => Err(format!("unknown camera '{other}' (expected front or back)")),
        }
    }
}
