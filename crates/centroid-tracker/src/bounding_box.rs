use ndarray::*;
use serde::Serialize;

/// BoundingBox represents the bounding box of the detection.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoundingBox {
    /// Left of the bounding box (i.e. min-x)
    x: f32,
    /// Top of the bounding box (i.e. min-y)
    y: f32,
    /// Width of the bounding box
    width: f32,
    /// Height of the bounding box
    height: f32,
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl BoundingBox {
    /// Returns a new BoundingBox
    ///
    /// # Parameters
    ///
    /// * `x`: Bounding box left.
    /// * `y`: Bounding box top.
    /// * `width`: Bounding box width.
    /// * `height`: Bounding box height.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x of the bounding box
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Returns the y of the bounding box
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Returns the width of the bounding box
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the height of the bounding box
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the centre of the bounding box, floored to whole pixels.
    pub fn centroid(&self) -> Centroid {
        Centroid::new(
            (self.x + self.width / 2.0).floor() as i32,
            (self.y + self.height / 2.0).floor() as i32,
        )
    }
}

/// Centroid is the whole pixel centre point of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Centroid {
    x: i32,
    y: i32,
}

impl Centroid {
    pub fn new(x: i32, y: i32) -> Centroid {
        Centroid { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Returns the centroid as an `(x, y)` array for distance computation.
    pub fn to_xy(&self) -> Array1<f32> {
        arr1::<f32>(&[self.x as f32, self.y as f32])
    }
}
