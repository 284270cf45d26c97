use crate::*;
use ndarray::*;

/// Compute Euclidean centroid distance.
///
/// # Parameters
///
/// * `centroid`: A centroid in format `(x, y)`.
/// * `candidates`: A matrix of candidate centroids (one per row) in the same format as `centroid`.
///
/// # Returns
///
/// The distance in pixels between `centroid` and each candidate.
pub fn centroid_distance(centroid: &Array1<f32>, candidates: &Array2<f32>) -> Array1<f32> {
    let deltas = candidates - centroid;
    deltas.map_axis(Axis(1), |delta| delta.dot(&delta).sqrt())
}

/// Centroid distance metric.
///
/// # Parameters
///
/// * `tracks`: A list of tracks.
/// * `detections`: A list of detections.
///
/// # Returns
///
/// A cost matrix of shape `(tracks.len(), detections.len())` where entry (i, j) is the distance
/// between the last centroid of `tracks[i]` and the centroid of `detections[j]`.
pub fn centroid_cost(tracks: &[&Track], detections: &[Detection]) -> Array2<f32> {
    let mut cost = Array2::<f32>::zeros((tracks.len(), detections.len()));
    if tracks.is_empty() || detections.is_empty() {
        return cost;
    }

    let candidates = Array2::from_shape_fn((detections.len(), 2), |(row, col)| {
        let centroid = detections[row].centroid();
        if col == 0 {
            centroid.x() as f32
        } else {
            centroid.y() as f32
        }
    });

    cost.outer_iter_mut()
        .zip(tracks)
        .for_each(|(mut row, track)| {
            row.assign(&centroid_distance(
                &track.last_centroid().to_xy(),
                &candidates,
            ));
        });

    cost
}

#[cfg(test)]
mod tests {
    use crate::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::*;

    #[test]
    fn centroid_distance() {
        let centroid = array![20.0f32, 20.0f32];
        let candidates = array![[20.0f32, 20.0f32], [25.0f32, 25.0f32], [23.0f32, 16.0f32]];

        let distances = crate::centroid_distance(&centroid, &candidates);

        assert_eq!(distances.len(), 3);
        assert_approx_eq!(distances[0], 0.0);
        assert_approx_eq!(distances[1], 7.071068);
        assert_approx_eq!(distances[2], 5.0);
    }

    #[test]
    fn centroid_cost() {
        let t0 = Track::new(
            0,
            &Detection::new(1, "car", BoundingBox::new(10.0, 10.0, 20.0, 20.0), 1.0),
        );
        let t1 = Track::new(
            1,
            &Detection::new(1, "car", BoundingBox::new(100.0, 100.0, 20.0, 20.0), 1.0),
        );
        let detections = vec![
            Detection::new(2, "car", BoundingBox::new(15.0, 15.0, 20.0, 20.0), 1.0),
            Detection::new(2, "car", BoundingBox::new(100.0, 104.0, 20.0, 20.0), 1.0),
        ];

        let cost = crate::centroid_cost(&[&t0, &t1], &detections);

        assert_eq!(cost.shape(), &[2, 2]);
        assert_approx_eq!(cost[[0, 0]], 7.071068);
        assert_approx_eq!(cost[[1, 1]], 4.0);
        assert_approx_eq!(cost[[0, 1]], 130.13839, 1.0e-3);
        assert_approx_eq!(cost[[1, 0]], 120.20815, 1.0e-3);
    }

    #[test]
    fn centroid_cost_empty() {
        let cost = crate::centroid_cost(&[], &[]);
        assert_eq!(cost.shape(), &[0, 0]);
    }
}
