use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::*;
use indexmap::IndexMap;
use serde::Deserialize;

/// Detections keyed by frame index, iterated in ascending frame order.
pub type Frames = BTreeMap<u32, Vec<Detection>>;

/// One frame of the detections file: three parallel arrays.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "bounding boxes")]
    bounding_boxes: Option<Vec<Vec<f32>>>,
    #[serde(rename = "detected classes")]
    detected_classes: Option<Vec<String>>,
    #[serde(rename = "detection scores")]
    detection_scores: Option<Vec<f32>>,
}

impl RawFrame {
    fn into_detections(self, key: &str, frame: u32) -> Result<Vec<Detection>> {
        let bounding_boxes = self
            .bounding_boxes
            .ok_or_else(|| TrackingError::malformed(key, "missing `bounding boxes`"))?;
        let detected_classes = self
            .detected_classes
            .ok_or_else(|| TrackingError::malformed(key, "missing `detected classes`"))?;
        let detection_scores = self
            .detection_scores
            .ok_or_else(|| TrackingError::malformed(key, "missing `detection scores`"))?;

        if bounding_boxes.len() != detected_classes.len()
            || bounding_boxes.len() != detection_scores.len()
        {
            return Err(TrackingError::malformed(
                key,
                format!(
                    "{} bounding boxes, {} detected classes and {} detection scores",
                    bounding_boxes.len(),
                    detected_classes.len(),
                    detection_scores.len()
                ),
            ));
        }

        bounding_boxes
            .into_iter()
            .zip(detected_classes)
            .zip(detection_scores)
            .enumerate()
            .map(|(idx, ((bbox, class_name), score))| {
                let [x, y, width, height] = <[f32; 4]>::try_from(bbox).map_err(|bbox| {
                    TrackingError::malformed(
                        key,
                        format!("bounding box {idx} has {} values, expected 4", bbox.len()),
                    )
                })?;
                if [x, y, width, height]
                    .iter()
                    .any(|value| !value.is_finite() || *value < 0.0)
                {
                    return Err(TrackingError::malformed(
                        key,
                        format!("bounding box {idx} must be non-negative"),
                    ));
                }
                Ok(Detection::new(
                    frame,
                    class_name,
                    BoundingBox::new(x, y, width, height),
                    score,
                ))
            })
            .collect()
    }
}

/// Load detections from a JSON object keyed by frame index.
///
/// Each frame holds three equal length arrays: `"bounding boxes"` as `[x, y, width, height]`,
/// `"detected classes"` and `"detection scores"`. Frame keys are parsed as integers and need not
/// be contiguous or sorted.
pub fn load_detections<R: Read>(reader: R) -> Result<Frames> {
    let raw: IndexMap<String, serde_json::Value> = serde_json::from_reader(reader)?;

    let mut frames = Frames::new();
    for (key, value) in raw {
        let frame = key
            .trim()
            .parse::<u32>()
            .map_err(|err| TrackingError::malformed(&key, format!("invalid frame index: {err}")))?;
        let raw_frame = RawFrame::deserialize(value)
            .map_err(|err| TrackingError::malformed(&key, err.to_string()))?;
        let detections = raw_frame.into_detections(&key, frame)?;
        if frames.insert(frame, detections).is_some() {
            return Err(TrackingError::malformed(&key, "duplicate frame index"));
        }
    }

    tracing::debug!(
        frames = frames.len(),
        detections = frames.values().map(Vec::len).sum::<usize>(),
        "loaded detections"
    );
    Ok(frames)
}

/// Load detections from a JSON file.
pub fn load_detections_from_path<P: AsRef<Path>>(path: P) -> Result<Frames> {
    let file = File::open(path)?;
    load_detections(BufReader::new(file))
}
