use std::collections::BTreeMap;
use std::io::Write;

use crate::*;
use serde::Serialize;

/// A tracked detection ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedRecord {
    pub frame: u32,
    pub id: usize,
    pub class: String,
    /// `[x, y, width, height]`
    pub bbox: [f32; 4],
    /// `[x, y]`
    pub centroid: [i32; 2],
    pub color: Color,
    pub score: f32,
}

impl TaggedRecord {
    /// Build a record from a tracked detection, looking up its display color.
    pub fn new(detection: &Detection, classes: &ClassTable) -> Result<Self> {
        let id = detection.track_id().ok_or(TrackingError::Untracked {
            frame: detection.frame(),
        })?;
        let parameters = classes.get(detection.frame(), detection.class_name())?;
        let bbox = detection.bbox();
        let centroid = detection.centroid();

        Ok(TaggedRecord {
            frame: detection.frame(),
            id,
            class: detection.class_name().to_string(),
            bbox: [bbox.x(), bbox.y(), bbox.width(), bbox.height()],
            centroid: [centroid.x(), centroid.y()],
            color: parameters.display_color(),
            score: detection.confidence(),
        })
    }
}

/// Convert tracked frames into records keyed by frame index.
pub fn tagged_records(
    frames: &Frames,
    classes: &ClassTable,
) -> Result<BTreeMap<u32, Vec<TaggedRecord>>> {
    frames
        .iter()
        .map(|(frame, detections)| {
            let records = detections
                .iter()
                .map(|detection| TaggedRecord::new(detection, classes))
                .collect::<Result<Vec<_>>>()?;
            Ok((*frame, records))
        })
        .collect()
}

/// Write records as a JSON object keyed by frame index.
pub fn write_json<W: Write>(writer: W, records: &BTreeMap<u32, Vec<TaggedRecord>>) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Write tracked frames in MOT challenge format.
///
/// `<frame>,<id>,<bb_left>,<bb_top>,<bb_width>,<bb_height>,<conf>,<x>,<y>,<z>`
pub fn write_mot<W: Write>(mut writer: W, frames: &Frames) -> Result<()> {
    for (frame, detections) in frames {
        for detection in detections {
            let id = detection
                .track_id()
                .ok_or(TrackingError::Untracked { frame: *frame })?;
            let bbox = detection.bbox();
            writeln!(
                writer,
                "{frame},{id},{:.3},{:.3},{:.3},{:.3},{:.3},-1,-1,-1",
                bbox.x(),
                bbox.y(),
                bbox.width(),
                bbox.height(),
                detection.confidence(),
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::*;
    use anyhow::Result;

    fn tracked() -> Result<(Tracker, Frames)> {
        let mut frames = Frames::new();
        frames.insert(
            1,
            vec![
                Detection::new(1, "car", BoundingBox::new(10.0, 10.0, 20.0, 20.0), 0.9),
                Detection::new(1, "person", BoundingBox::new(200.0, 50.0, 10.0, 30.0), 0.6),
            ],
        );
        frames.insert(
            2,
            vec![Detection::new(2, "car", BoundingBox::new(15.0, 15.0, 20.0, 20.0), 0.8)],
        );

        let mut tracker = Tracker::default();
        let tagged = tracker.run(frames)?;
        Ok((tracker, tagged))
    }

    #[test]
    fn records() -> Result<()> {
        let (tracker, tagged) = tracked()?;

        let records = tagged_records(&tagged, tracker.classes())?;

        assert_eq!(records[&1].len(), 2);
        assert_eq!(
            records[&2][0],
            TaggedRecord {
                frame: 2,
                id: 0,
                class: "car".to_string(),
                bbox: [15.0, 15.0, 20.0, 20.0],
                centroid: [25, 25],
                color: [0, 0, 255],
                score: 0.8,
            }
        );
        assert_eq!(records[&1][1].id, 1);
        assert_eq!(records[&1][1].centroid, [205, 65]);
        Ok(())
    }

    #[test]
    fn untracked_record() {
        let detection = Detection::new(3, "car", BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1.0);
        assert!(matches!(
            TaggedRecord::new(&detection, &ClassTable::default()),
            Err(TrackingError::Untracked { frame: 3 })
        ));
    }

    #[test]
    fn json() -> Result<()> {
        let (tracker, tagged) = tracked()?;
        let records = tagged_records(&tagged, tracker.classes())?;

        let mut buffer = Vec::new();
        write_json(&mut buffer, &records)?;
        let value: serde_json::Value = serde_json::from_slice(&buffer)?;

        assert_eq!(value["1"][1]["class"], "person");
        assert_eq!(value["2"][0]["id"], 0);
        assert_eq!(value["2"][0]["centroid"][0], 25);
        Ok(())
    }

    #[test]
    fn mot() -> Result<()> {
        let (_, tagged) = tracked()?;

        let mut buffer = Vec::new();
        write_mot(&mut buffer, &tagged)?;
        let text = String::from_utf8(buffer)?;

        itertools::assert_equal(
            text.lines(),
            [
                "1,0,10.000,10.000,20.000,20.000,0.900,-1,-1,-1",
                "1,1,200.000,50.000,10.000,30.000,0.600,-1,-1,-1",
                "2,0,15.000,15.000,20.000,20.000,0.800,-1,-1,-1",
            ],
        );
        Ok(())
    }
}
