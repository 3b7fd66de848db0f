use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in plot pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Box anchored at the origin with the given size.
    pub fn from_size(width: f64, height: f64) -> Self {
        Aabb2 {
            min: [0.0, 0.0],
            max: [width, height],
        }
    }

    pub fn width(&self) -> f64 {
        (self.max[0] - self.min[0]).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max[1] - self.min[1]).max(0.0)
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

/// Space reserved around the plot area, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 50.0,
            left: 80.0,
        }
    }
}

impl Margins {
    /// Inner plot area of a `width` x `height` surface, relative to the
    /// inner origin (the top-left corner after the margins).
    ///
    /// Degenerate surfaces collapse to an empty box rather than inverting.
    pub fn inner(&self, width: f64, height: f64) -> Aabb2 {
        let w = (width - self.left - self.right).max(0.0);
        let h = (height - self.top - self.bottom).max(0.0);
        Aabb2::from_size(w, h)
    }
}
