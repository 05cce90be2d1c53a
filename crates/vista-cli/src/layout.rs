//! Page geometry given on the command line

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;
use vista_core::{LandmarkLayout, LandmarkRect};

#[derive(Error, Debug, PartialEq)]
pub enum LandmarkArgError {
    #[error("Expected id=top,height, got {0:?}")]
    Malformed(String),
    #[error("Invalid number {0:?}")]
    Number(String),
    #[error("Landmark height must not be negative, got {0}")]
    NegativeHeight(f64),
}

/// `--landmark section-two=900,1200`
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkArg {
    pub id: String,
    pub rect: LandmarkRect,
}

impl FromStr for LandmarkArg {
    type Err = LandmarkArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LandmarkArgError::Malformed(s.to_string());
        let (id, geometry) = s.split_once('=').ok_or_else(malformed)?;
        let (top, height) = geometry.split_once(',').ok_or_else(malformed)?;
        if id.trim().is_empty() {
            return Err(malformed());
        }

        let number = |text: &str| {
            text.trim()
                .parse::<f64>()
                .map_err(|_| LandmarkArgError::Number(text.to_string()))
        };
        let rect = LandmarkRect {
            top: number(top)?,
            height: number(height)?,
        };
        if rect.height < 0.0 {
            return Err(LandmarkArgError::NegativeHeight(rect.height));
        }

        Ok(Self {
            id: id.trim().to_string(),
            rect,
        })
    }
}

/// A page described entirely by its arguments
#[derive(Debug, Clone, Default)]
pub struct ArgLayout {
    viewport_height: f64,
    landmarks: HashMap<String, LandmarkRect>,
}

impl ArgLayout {
    pub fn new(viewport_height: f64, landmarks: &[LandmarkArg]) -> Self {
        Self {
            viewport_height,
            landmarks: landmarks
                .iter()
                .map(|arg| (arg.id.clone(), arg.rect))
                .collect(),
        }
    }
}

impl LandmarkLayout for ArgLayout {
    fn landmark(&self, landmark: &str) -> Option<LandmarkRect> {
        self.landmarks.get(landmark).copied()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}
