use std::collections::{BTreeMap, BTreeSet};

use crate::*;

/// Read-only view of the tracks as they were at the start of a frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    tracks: &'a BTreeMap<usize, Track>,
}

impl<'a> Snapshot<'a> {
    /// Iterate the tracks in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &'a Track> {
        self.tracks.values()
    }

    pub fn get(&self, track_id: usize) -> Option<&'a Track> {
        self.tracks.get(&track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// The mapping from track identifier to track.
///
/// Identifiers are issued sequentially from 0 and never reused, including after compaction.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    tracks: BTreeMap<usize, Track>,
    /// Used to allocate identifiers to new tracks.
    next_id: usize,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view used for all matching decisions within one frame.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tracks: &self.tracks,
        }
    }

    /// Returns and reserves the next sequential identifier.
    pub fn next_id(&mut self) -> usize {
        let track_id = self.next_id;
        self.next_id += 1;
        track_id
    }

    /// The identifier the next call to `next_id` will return.
    pub fn peek_id(&self) -> usize {
        self.next_id
    }

    /// Apply all matches and creations of one frame.
    ///
    /// The update is validated before anything is written so either all of it lands or none of it
    /// does.
    pub fn commit(&mut self, update: FrameUpdate) -> Result<()> {
        let frame = update.frame();
        let updates = update.into_updates();

        let mut created_ids = BTreeSet::new();

        for track_update in &updates {
            match track_update {
                TrackUpdate::Matched { track_id, .. } if !self.tracks.contains_key(track_id) => {
                    return Err(TrackingError::UnknownTrack(*track_id));
                }
                TrackUpdate::Created(track) if track.track_id() >= self.next_id => {
                    return Err(TrackingError::UnknownTrack(track.track_id()));
                }
                TrackUpdate::Created(track)
                    if self.tracks.contains_key(&track.track_id())
                        || !created_ids.insert(track.track_id()) =>
                {
                    return Err(TrackingError::DuplicateTrack(track.track_id()));
                }
                _ => {}
            }
        }

        let (mut matched, mut created) = (0, 0);
        for track_update in updates {
            match track_update {
                TrackUpdate::Matched { track_id, centroid } => {
                    if let Some(track) = self.tracks.get_mut(&track_id) {
                        track.update(centroid, frame);
                        matched += 1;
                    }
                }
                TrackUpdate::Created(track) => {
                    self.tracks.insert(track.track_id(), track);
                    created += 1;
                }
            }
        }

        tracing::debug!(frame, matched, created, tracks = self.tracks.len(), "committed frame");
        Ok(())
    }

    /// Drop every track not seen for more than `max_age` frames before `frame`.
    ///
    /// Returns the number of tracks removed.
    pub fn compact(&mut self, frame: u32, max_age: u32) -> usize {
        let before = self.tracks.len();
        self.tracks
            .retain(|_, track| track.frames_since_seen(frame) <= max_age);
        before - self.tracks.len()
    }

    pub fn get(&self, track_id: usize) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Iterate the tracks in ascending id order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use anyhow::Result;

    fn car(frame: u32, x: f32, y: f32) -> Detection {
        Detection::new(frame, "car", BoundingBox::new(x, y, 10.0, 10.0), 1.0)
    }

    #[test]
    fn next_id() {
        let mut store = TrackStore::new();
        assert_eq!(store.next_id(), 0);
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.peek_id(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn commit() -> Result<()> {
        let mut store = TrackStore::new();

        let mut update = FrameUpdate::new(1);
        let track_id = store.next_id();
        update.push(TrackUpdate::Created(Track::new(track_id, &car(1, 0.0, 0.0))));
        store.commit(update)?;

        let mut update = FrameUpdate::new(2);
        update.push(TrackUpdate::Matched {
            track_id: 0,
            centroid: Centroid::new(8, 8),
        });
        store.commit(update)?;

        let track = store.get(0).unwrap();
        assert_eq!(track.last_centroid(), Centroid::new(8, 8));
        assert_eq!(track.last_seen_frame(), 2);
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn commit_is_atomic() -> Result<()> {
        let mut store = TrackStore::new();

        let mut update = FrameUpdate::new(1);
        let track_id = store.next_id();
        update.push(TrackUpdate::Created(Track::new(track_id, &car(1, 0.0, 0.0))));
        store.commit(update)?;

        let mut update = FrameUpdate::new(2);
        update.push(TrackUpdate::Matched {
            track_id: 0,
            centroid: Centroid::new(8, 8),
        });
        update.push(TrackUpdate::Matched {
            track_id: 42,
            centroid: Centroid::new(1, 1),
        });
        assert!(matches!(
            store.commit(update),
            Err(TrackingError::UnknownTrack(42))
        ));

        // the valid half of the update was not applied
        let track = store.get(0).unwrap();
        assert_eq!(track.last_centroid(), Centroid::new(5, 5));
        assert_eq!(track.last_seen_frame(), 1);

        // recreating an existing id must not replace the track
        let mut update = FrameUpdate::new(3);
        update.push(TrackUpdate::Matched {
            track_id: 0,
            centroid: Centroid::new(8, 8),
        });
        let bus = Detection::new(3, "bus", BoundingBox::new(90.0, 90.0, 10.0, 10.0), 1.0);
        update.push(TrackUpdate::Created(Track::new(0, &bus)));
        assert!(matches!(
            store.commit(update),
            Err(TrackingError::DuplicateTrack(0))
        ));

        // as must creating the same new id twice in one frame
        let mut update = FrameUpdate::new(3);
        let track_id = store.next_id();
        update.push(TrackUpdate::Created(Track::new(track_id, &car(3, 50.0, 50.0))));
        update.push(TrackUpdate::Created(Track::new(track_id, &bus)));
        assert!(matches!(
            store.commit(update),
            Err(TrackingError::DuplicateTrack(1))
        ));

        assert_eq!(store.len(), 1);
        let track = store.get(0).unwrap();
        assert_eq!(track.class_name(), "car");
        assert_eq!(track.last_centroid(), Centroid::new(5, 5));
        assert_eq!(track.last_seen_frame(), 1);
        Ok(())
    }

    #[test]
    fn snapshot_is_id_ordered() -> Result<()> {
        let mut store = TrackStore::new();
        let mut update = FrameUpdate::new(1);
        for x in [30.0, 10.0, 20.0] {
            let track_id = store.next_id();
            update.push(TrackUpdate::Created(Track::new(track_id, &car(1, x, 0.0))));
        }
        store.commit(update)?;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        itertools::assert_equal(snapshot.iter().map(|track| track.track_id()), [0, 1, 2]);
        Ok(())
    }

    #[test]
    fn compact() -> Result<()> {
        let mut store = TrackStore::new();
        let mut update = FrameUpdate::new(1);
        let track_id = store.next_id();
        update.push(TrackUpdate::Created(Track::new(track_id, &car(1, 0.0, 0.0))));
        store.commit(update)?;

        let mut update = FrameUpdate::new(50);
        let track_id = store.next_id();
        update.push(TrackUpdate::Created(Track::new(track_id, &car(50, 100.0, 0.0))));
        store.commit(update)?;

        assert_eq!(store.compact(100, 60), 1);
        assert!(store.get(0).is_none());
        assert!(store.get(1).is_some());

        // identifiers are never reused
        assert_eq!(store.next_id(), 2);
        Ok(())
    }
}
