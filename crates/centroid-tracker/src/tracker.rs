use std::num::NonZeroU32;

use crate::*;

/// This is the multi-target tracker. It feeds frames, in strictly increasing order, through the
/// centroid matcher and owns the resulting track store.
///
/// # Examples
///
/// ```
/// use centroid_tracker::{BoundingBox, Detection, Tracker};
///
/// // instantiate tracker with the default class table
/// let mut tracker = Tracker::default();
///
/// let first = Detection::new(1, "car", BoundingBox::new(10.0, 10.0, 20.0, 20.0), 0.9);
/// let tagged = tracker.update(1, vec![first]).unwrap();
/// assert_eq!(tagged[0].track_id(), Some(0));
///
/// // the car moved a few pixels so it keeps its identity
/// let second = Detection::new(2, "car", BoundingBox::new(15.0, 15.0, 20.0, 20.0), 0.8);
/// let tagged = tracker.update(2, vec![second]).unwrap();
/// assert_eq!(tagged[0].track_id(), Some(0));
///
/// for track in tracker.tracks() {
///     println!(
///         "{} {} {:?} {}",
///         track.track_id(),
///         track.class_name(),
///         track.last_centroid(),
///         track.last_seen_frame(),
///     );
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Tracker {
    /// Per-class distance thresholds and forget windows.
    classes: ClassTable,
    /// The tracks. Only mutated between frames.
    store: TrackStore,
    /// The last frame successfully processed.
    last_frame: Option<u32>,
    /// Compact the store every n frames.
    compact_every: Option<NonZeroU32>,
    /// Frames processed since the last compaction.
    frames_since_compaction: u32,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(ClassTable::default())
    }
}

impl Tracker {
    /// Returns a new Tracker
    ///
    /// # Arguments
    ///
    /// * `classes`: The class parameter table used for every frame.
    pub fn new(classes: ClassTable) -> Tracker {
        Tracker {
            classes,
            store: TrackStore::new(),
            last_frame: None,
            compact_every: None,
            frames_since_compaction: 0,
        }
    }

    /// Compact the track store automatically every `frames` frames. Disabled by default.
    pub fn with_compact_every(&mut self, frames: Option<NonZeroU32>) -> &mut Self {
        self.compact_every = frames;
        self
    }

    /// Return the class table
    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Return the track store
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Return the tracks in id order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.store.tracks()
    }

    /// Return the last frame processed
    pub fn last_frame(&self) -> Option<u32> {
        self.last_frame
    }

    /// Tag the detections of one frame.
    ///
    /// The first frame processed seeds a track for every detection. On failure the tracker is left
    /// exactly as it was before the call.
    ///
    /// # Parameters
    ///
    /// * `frame`: The frame index. Must be greater than 0 and than any frame processed before.
    /// * `detections`: The detections observed in `frame`, in input order.
    pub fn update(&mut self, frame: u32, detections: Vec<Detection>) -> Result<Vec<Detection>> {
        let previous = self.last_frame.unwrap_or(0);
        if frame <= previous {
            return Err(TrackingError::NonMonotonicFrame { previous, frame });
        }

        if let Some(detection) = detections
            .iter()
            .find(|detection| detection.frame() != frame)
        {
            return Err(TrackingError::malformed(
                frame,
                format!("detection from frame {} supplied", detection.frame()),
            ));
        }

        let seed = self.last_frame.is_none();
        let (detections, update) =
            match_frame(&mut self.store, &self.classes, frame, seed, detections)?;
        self.store.commit(update)?;
        self.last_frame = Some(frame);

        if let Some(compact_every) = self.compact_every {
            self.frames_since_compaction += 1;
            if self.frames_since_compaction >= compact_every.get() {
                self.compact();
            }
        }

        Ok(detections)
    }

    /// Tag every frame in ascending frame order.
    pub fn run(&mut self, frames: Frames) -> Result<Frames> {
        frames
            .into_iter()
            .map(|(frame, detections)| -> Result<(u32, Vec<Detection>)> {
                Ok((frame, self.update(frame, detections)?))
            })
            .collect()
    }

    /// Drop tracks that can no longer match any class.
    ///
    /// Uses the largest forget window in the class table so matching results are unchanged.
    /// Returns the number of tracks removed.
    pub fn compact(&mut self) -> usize {
        self.compact_with(self.classes.max_forget_window())
    }

    /// Drop tracks not seen within `max_age` frames of the last processed frame.
    ///
    /// A `max_age` below the class forget windows changes which tracks can match.
    pub fn compact_with(&mut self, max_age: u32) -> usize {
        self.frames_since_compaction = 0;
        let Some(frame) = self.last_frame else {
            return 0;
        };
        let removed = self.store.compact(frame, max_age);
        if removed > 0 {
            tracing::info!(frame, removed, remaining = self.store.len(), "compacted tracks");
        }
        removed
    }
}
