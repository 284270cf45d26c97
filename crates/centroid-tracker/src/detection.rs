use crate::*;

/// Detection represents a single classified bounding box observed in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The frame index the detection was observed in.
    frame: u32,
    /// Class label, resolved against the ClassTable.
    class_name: String,
    /// Bounding box in top, left, width, height format.
    bbox: BoundingBox,
    /// Detection confidence score. Carried through, never used for matching.
    confidence: f32,
    /// Cached centre of `bbox`.
    centroid: Centroid,
    /// The track identifier, set once by the matcher.
    track_id: Option<usize>,
}

impl Detection {
    /// Returns a new Detection
    ///
    /// # Parameters
    ///
    /// * `frame`: The frame index.
    /// * `class_name`: The class label.
    /// * `bbox`: A bounding box object.
    /// * `confidence`: Detection confidence score.
    pub fn new<S: Into<String>>(
        frame: u32,
        class_name: S,
        bbox: BoundingBox,
        confidence: f32,
    ) -> Detection {
        Detection {
            frame,
            class_name: class_name.into(),
            centroid: bbox.centroid(),
            bbox,
            confidence,
            track_id: None,
        }
    }

    /// Returns the frame index of the detection
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Returns the class name of the detection
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns a BoundingBox of the detection co-ordinates
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the confidence of the detection
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns the centroid of the detection
    pub fn centroid(&self) -> Centroid {
        self.centroid
    }

    /// Returns the assigned track identifier, if the detection has been tracked
    pub fn track_id(&self) -> Option<usize> {
        self.track_id
    }

    /// Tags the detection. A detection is only ever tagged once.
    pub(crate) fn assign(&mut self, track_id: usize) {
        debug_assert!(self.track_id.is_none(), "detection tagged twice");
        self.track_id.get_or_insert(track_id);
    }
}
