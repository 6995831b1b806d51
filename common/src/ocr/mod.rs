// Screenshot text recognition and timer extraction

pub mod extractor;
pub mod lines;
pub mod provider;

pub use extractor::{TimerCandidate, TimerExtractor};
pub use lines::{assemble_lines, Line, LINE_TOLERANCE};
pub use provider::{OcrProvider, VisionOcrProvider};

use serde::{Deserialize, Serialize};

/// Default phrase that opens the region of in-progress upgrades
pub const DEFAULT_START_MARKER: &str = "upgrading";
/// Default phrase that closes the region of in-progress upgrades
pub const DEFAULT_END_MARKER: &str = "suggested";

/// A polygon corner in provider coordinates.
///
/// The Vision API omits zero coordinates, hence the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Four-vertex bounding polygon ordered top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// One recognized text fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "description")]
    pub text: String,
    #[serde(rename = "boundingPoly", default)]
    pub bounds: BoundingPoly,
}

impl Token {
    /// Axis-aligned token from its left/top corner and size
    pub fn from_rect(text: impl Into<String>, left: f64, top: f64, width: f64, height: f64) -> Self {
        let (right, bottom) = (left + width, top + height);
        Self {
            text: text.into(),
            bounds: BoundingPoly {
                vertices: vec![
                    Vertex { x: left, y: top },
                    Vertex { x: right, y: top },
                    Vertex { x: right, y: bottom },
                    Vertex { x: left, y: bottom },
                ],
            },
        }
    }

    /// Representative vertical position: mean of the vertex y-coordinates
    pub fn center_y(&self) -> f64 {
        let vertices = &self.bounds.vertices;
        if vertices.is_empty() {
            return 0.0;
        }
        vertices.iter().map(|v| v.y).sum::<f64>() / vertices.len() as f64
    }

    pub fn left_x(&self) -> f64 {
        self.fold_vertices(|v| v.x, f64::min)
    }

    pub fn top(&self) -> f64 {
        self.fold_vertices(|v| v.y, f64::min)
    }

    pub fn bottom(&self) -> f64 {
        self.fold_vertices(|v| v.y, f64::max)
    }

    fn fold_vertices(&self, coord: impl Fn(&Vertex) -> f64, pick: fn(f64, f64) -> f64) -> f64 {
        self.bounds
            .vertices
            .iter()
            .map(coord)
            .reduce(pick)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_geometry() {
        let token = Token::from_rect("Barracks", 10.0, 100.0, 80.0, 20.0);
        assert_eq!(token.left_x(), 10.0);
        assert_eq!(token.top(), 100.0);
        assert_eq!(token.bottom(), 120.0);
        assert_eq!(token.center_y(), 110.0);
    }

    #[test]
    fn test_token_deserializes_vision_annotation() {
        let json = serde_json::json!({
            "description": "2d",
            "boundingPoly": {
                "vertices": [{"x": 300, "y": 10}, {"x": 320}, {"x": 320, "y": 30}, {"y": 30}]
            }
        });
        let token: Token = serde_json::from_value(json).unwrap();
        assert_eq!(token.text, "2d");
        assert_eq!(token.left_x(), 0.0);
        assert_eq!(token.top(), 0.0);
        assert_eq!(token.center_y(), 17.5);
    }
}
