use crate::*;

/// A single persistent identity: the last known centroid of an object of one class.
///
/// A track is never deleted by matching. Once no detection of its class arrives within the class
/// forget window it simply stops being a match candidate.
#[derive(Debug, Clone)]
pub struct Track {
    /// A unique track identifier.
    track_id: usize,
    /// The class of the detection that created the track.
    class_name: String,
    /// The centroid of the latest matched detection.
    last_centroid: Centroid,
    /// The frame of the latest matched detection.
    last_seen_frame: u32,
    /// Total number of detections assigned to this track.
    hits: usize,
}

impl Track {
    /// Returns a new Track
    ///
    /// # Parameters
    ///
    /// * `track_id`: A unique track identifier.
    /// * `detection`: The detection this track originates from.
    pub fn new(track_id: usize, detection: &Detection) -> Track {
        Track {
            track_id,
            class_name: detection.class_name().to_string(),
            last_centroid: detection.centroid(),
            last_seen_frame: detection.frame(),
            hits: 1,
        }
    }

    /// Return the identifier of the track
    pub fn track_id(&self) -> usize {
        self.track_id
    }

    /// Return the class name of the track
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Return the centroid of the latest update
    pub fn last_centroid(&self) -> Centroid {
        self.last_centroid
    }

    /// Return the frame of the latest update
    pub fn last_seen_frame(&self) -> u32 {
        self.last_seen_frame
    }

    /// Return the number of detections assigned to the track
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of frames between the latest update and `frame`.
    pub fn frames_since_seen(&self, frame: u32) -> u32 {
        frame.saturating_sub(self.last_seen_frame)
    }

    /// Move the track to a newly matched centroid.
    pub(crate) fn update(&mut self, centroid: Centroid, frame: u32) {
        self.last_centroid = centroid;
        self.last_seen_frame = frame;
        self.hits += 1;
    }
}
