use crate::*;
use fixedbitset::FixedBitSet;

/// A detection continuing an existing track.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The matched track identifier.
    pub track_id: usize,
    /// Index of the detection in the frame's input order.
    pub detection_idx: usize,
    /// Centroid distance between the track and the detection.
    pub distance: f32,
}

impl Match {
    /// Return a new Match
    ///
    /// # Parameters
    ///
    /// * `track_id`: The matched track identifier.
    /// * `detection_idx`: The match detection index.
    /// * `distance`: Centroid distance in pixels.
    pub fn new(track_id: usize, detection_idx: usize, distance: f32) -> Match {
        Match {
            track_id,
            detection_idx,
            distance,
        }
    }
}

/// A single change to the track store.
#[derive(Debug, Clone)]
pub enum TrackUpdate {
    /// An existing track moves to a new centroid and is marked seen in the frame.
    Matched { track_id: usize, centroid: Centroid },
    /// A new track created from an unmatched detection.
    Created(Track),
}

/// Every change one frame makes to the track store, committed together.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    frame: u32,
    updates: Vec<TrackUpdate>,
}

impl FrameUpdate {
    pub fn new(frame: u32) -> Self {
        FrameUpdate {
            frame,
            updates: Vec::new(),
        }
    }

    pub fn push(&mut self, update: TrackUpdate) {
        self.updates.push(update);
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn updates(&self) -> &[TrackUpdate] {
        &self.updates
    }

    pub fn into_updates(self) -> Vec<TrackUpdate> {
        self.updates
    }
}

/// Match detections to the tracks of a frame-start snapshot.
///
/// A track is a candidate for a detection when it has the same class, was last seen no more than
/// the class forget window ago and its centroid is strictly closer than the class distance
/// threshold. Candidate pairs are resolved nearest first, ties going to the lowest track id and
/// then the lowest detection index, so every detection gets at most one track and every track at
/// most one detection regardless of input order. A detection whose nearest track was claimed by a
/// closer detection takes its nearest track not yet claimed.
///
/// # Parameters
///
/// * `classes`: The class parameter table.
/// * `frame`: The current frame index.
/// * `snapshot`: The tracks as they were at the start of `frame`.
/// * `detections`: The detections of `frame`.
///
/// # Returns
///
/// A tuple with the following two entries:
///
/// - A list of matches.
/// - A list of unmatched detection indices in input order.
pub fn nearest_neighbor_matching(
    classes: &ClassTable,
    frame: u32,
    snapshot: Snapshot<'_>,
    detections: &[Detection],
) -> Result<(Vec<Match>, Vec<usize>)> {
    // resolve every class before matching anything
    let parameters = detections
        .iter()
        .map(|detection| classes.get(frame, detection.class_name()))
        .collect::<Result<Vec<_>>>()?;

    let mut tracks = Vec::with_capacity(snapshot.len());
    for track in snapshot.iter() {
        if classes
            .get(frame, track.class_name())?
            .within_window(track.last_seen_frame(), frame)
        {
            tracks.push(track);
        }
    }

    let cost = centroid_cost(&tracks, detections);

    let mut candidates = Vec::new();
    tracks.iter().enumerate().for_each(|(row, track)| {
        detections
            .iter()
            .zip(&parameters)
            .enumerate()
            .for_each(|(col, (detection, parameters))| {
                let distance = cost[[row, col]];
                if track.class_name() == detection.class_name()
                    && distance < parameters.distance_threshold()
                {
                    candidates.push((row, Match::new(track.track_id(), col, distance)));
                }
            })
    });

    candidates.sort_by(|(_, a), (_, b)| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.track_id.cmp(&b.track_id))
            .then(a.detection_idx.cmp(&b.detection_idx))
    });

    let mut claimed_tracks = FixedBitSet::with_capacity(tracks.len());
    let mut claimed_detections = FixedBitSet::with_capacity(detections.len());
    let mut matches = Vec::with_capacity(tracks.len().min(detections.len()));
    for (row, candidate) in candidates {
        if claimed_tracks.contains(row) || claimed_detections.contains(candidate.detection_idx) {
            continue;
        }
        claimed_tracks.insert(row);
        claimed_detections.insert(candidate.detection_idx);
        matches.push(candidate);
    }

    let unmatched = (0..detections.len())
        .filter(|detection_idx| !claimed_detections.contains(*detection_idx))
        .collect::<Vec<_>>();

    Ok((matches, unmatched))
}

/// Tag one frame of detections and collect the resulting store changes.
///
/// When `seed` is set every detection starts a new track. Otherwise detections are matched with
/// [`nearest_neighbor_matching`] and the unmatched ones start new tracks, with identifiers issued
/// in input order. The store is only touched to reserve identifiers, and only after matching has
/// succeeded; the returned update still has to be committed.
pub fn match_frame(
    store: &mut TrackStore,
    classes: &ClassTable,
    frame: u32,
    seed: bool,
    mut detections: Vec<Detection>,
) -> Result<(Vec<Detection>, FrameUpdate)> {
    let (matches, unmatched) = if seed {
        detections
            .iter()
            .try_for_each(|detection| classes.get(frame, detection.class_name()).map(|_| ()))?;
        (vec![], (0..detections.len()).collect::<Vec<_>>())
    } else {
        nearest_neighbor_matching(classes, frame, store.snapshot(), &detections)?
    };

    let mut update = FrameUpdate::new(frame);

    for Match {
        track_id,
        detection_idx,
        distance,
    } in matches
    {
        let detection = &mut detections[detection_idx];
        detection.assign(track_id);
        tracing::debug!(
            frame,
            track_id,
            class = detection.class_name(),
            distance,
            "matched detection"
        );
        update.push(TrackUpdate::Matched {
            track_id,
            centroid: detection.centroid(),
        });
    }

    for detection_idx in unmatched {
        let detection = &mut detections[detection_idx];
        let track_id = store.next_id();
        detection.assign(track_id);
        tracing::debug!(
            frame,
            track_id,
            class = detection.class_name(),
            "created track"
        );
        update.push(TrackUpdate::Created(Track::new(track_id, detection)));
    }

    Ok((detections, update))
}
