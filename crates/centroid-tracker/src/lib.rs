#[macro_use]
extern crate lazy_static;

mod bounding_box;
mod centroid_matching;
mod class_table;
mod detection;
mod error;
mod input;
mod matcher;
mod output;
mod track;
mod track_store;
mod tracker;

pub use bounding_box::{BoundingBox, Centroid};
pub use centroid_matching::{centroid_cost, centroid_distance};
pub use class_table::{ClassParameters, ClassTable, Color};
pub use detection::Detection;
pub use error::{Result, TrackingError};
pub use input::{load_detections, load_detections_from_path, Frames};
pub use matcher::{match_frame, nearest_neighbor_matching, FrameUpdate, Match, TrackUpdate};
pub use output::{tagged_records, write_json, write_mot, TaggedRecord};
pub use track::Track;
pub use track_store::{Snapshot, TrackStore};
pub use tracker::Tracker;
