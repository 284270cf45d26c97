use crate::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// An RGB display color. Passed through to rendering, never used for matching.
pub type Color = [u8; 3];

/// Matching parameters for one class of object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassParameters {
    /// Centroid distance in pixels a detection must be strictly below to continue a track.
    distance_threshold: f32,
    /// Number of frames since a track was last seen for which it can still be matched.
    forget_window: u32,
    /// Display color for overlays.
    display_color: Color,
}

impl ClassParameters {
    /// Returns new ClassParameters
    ///
    /// # Parameters
    ///
    /// * `distance_threshold`: Maximum (exclusive) centroid distance in pixels.
    /// * `forget_window`: Maximum (inclusive) frame gap since a track was last seen.
    /// * `display_color`: RGB color used by renderers.
    pub fn new(distance_threshold: f32, forget_window: u32, display_color: Color) -> Self {
        ClassParameters {
            distance_threshold,
            forget_window,
            display_color,
        }
    }

    pub fn distance_threshold(&self) -> f32 {
        self.distance_threshold
    }

    pub fn forget_window(&self) -> u32 {
        self.forget_window
    }

    pub fn display_color(&self) -> Color {
        self.display_color
    }

    /// Returns true if a track last seen at `last_seen_frame` may still be matched at `frame`.
    pub fn within_window(&self, last_seen_frame: u32, frame: u32) -> bool {
        frame.saturating_sub(last_seen_frame) <= self.forget_window
    }
}

lazy_static! {
    static ref DEFAULT_CLASSES: ClassTable = ClassTable::new()
        .with_class("car", ClassParameters::new(150.0, 180, [0, 0, 255]))
        .with_class("person", ClassParameters::new(40.0, 480, [255, 255, 0]))
        .with_class("truck", ClassParameters::new(500.0, 340, [255, 128, 0]))
        .with_class("bicycle", ClassParameters::new(60.0, 60, [0, 255, 0]))
        .with_class("bus", ClassParameters::new(500.0, 340, [255, 0, 255]))
        .with_class("motorbike", ClassParameters::new(60.0, 60, [255, 0, 0]));
}

/// The per-class parameter table.
///
/// Deserializes from a JSON object keyed by class name, for example:
///
/// ```
/// use centroid_tracker::ClassTable;
///
/// let classes = ClassTable::from_reader(
///     r#"{ "boat": { "distance_threshold": 80.0, "forget_window": 30, "display_color": [0, 0, 128] } }"#
///         .as_bytes(),
/// )
/// .unwrap();
///
/// assert_eq!(classes.len(), 1);
/// assert!(classes.contains("boat"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable {
    classes: IndexMap<String, ClassParameters>,
}

impl Default for ClassTable {
    fn default() -> Self {
        DEFAULT_CLASSES.clone()
    }
}

impl ClassTable {
    /// Returns an empty ClassTable
    pub fn new() -> Self {
        ClassTable {
            classes: IndexMap::new(),
        }
    }

    /// Read a ClassTable from JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(TrackingError::InvalidConfig)
    }

    /// Add or replace a class
    pub fn with_class<S: Into<String>>(mut self, class_name: S, parameters: ClassParameters) -> Self {
        self.insert(class_name, parameters);
        self
    }

    /// Add or replace a class, returning the previous parameters if any
    pub fn insert<S: Into<String>>(
        &mut self,
        class_name: S,
        parameters: ClassParameters,
    ) -> Option<ClassParameters> {
        self.classes.insert(class_name.into(), parameters)
    }

    /// Look up the parameters for a class observed in `frame`.
    pub fn get(&self, frame: u32, class_name: &str) -> Result<&ClassParameters> {
        self.classes
            .get(class_name)
            .ok_or_else(|| TrackingError::UnknownClass {
                frame,
                class: class_name.to_string(),
            })
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate the classes in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassParameters)> {
        self.classes
            .iter()
            .map(|(class_name, parameters)| (class_name.as_str(), parameters))
    }

    /// The largest forget window of any class. Tracks older than this can never match again.
    pub fn max_forget_window(&self) -> u32 {
        self.classes
            .values()
            .map(|parameters| parameters.forget_window)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use anyhow::Result;

    #[test]
    fn default_table() -> Result<()> {
        let classes = ClassTable::default();

        assert_eq!(classes.len(), 6);
        itertools::assert_equal(
            classes.iter().map(|(class_name, _)| class_name),
            ["car", "person", "truck", "bicycle", "bus", "motorbike"],
        );

        let car = classes.get(1, "car")?;
        assert_eq!(car.distance_threshold(), 150.0);
        assert_eq!(car.forget_window(), 180);

        let person = classes.get(1, "person")?;
        assert_eq!(person.distance_threshold(), 40.0);
        assert_eq!(person.forget_window(), 480);

        assert_eq!(classes.max_forget_window(), 480);
        Ok(())
    }

    #[test]
    fn unknown_class() {
        let classes = ClassTable::default();

        match classes.get(7, "helicopter") {
            Err(TrackingError::UnknownClass { frame, class }) => {
                assert_eq!(frame, 7);
                assert_eq!(class, "helicopter");
            }
            other => panic!("expected UnknownClass, got {:?}", other),
        }
    }

    #[test]
    fn within_window() {
        let parameters = ClassParameters::new(150.0, 180, [0, 0, 0]);

        assert!(parameters.within_window(1, 2));
        assert!(parameters.within_window(1, 181));
        assert!(!parameters.within_window(1, 182));
    }

    #[test]
    fn from_reader() -> Result<()> {
        let json = r#"{
            "car": { "distance_threshold": 10.0, "forget_window": 2, "display_color": [1, 2, 3] },
            "person": { "distance_threshold": 5, "forget_window": 9, "display_color": [4, 5, 6] }
        }"#;
        let classes = ClassTable::from_reader(json.as_bytes())?;

        assert_eq!(classes.len(), 2);
        assert_eq!(
            classes.get(1, "person")?,
            &ClassParameters::new(5.0, 9, [4, 5, 6])
        );
        assert_eq!(classes.max_forget_window(), 9);
        Ok(())
    }

    #[test]
    fn from_reader_invalid() {
        let json = r#"{ "car": { "distance_threshold": 10.0 } }"#;
        assert!(matches!(
            ClassTable::from_reader(json.as_bytes()),
            Err(TrackingError::InvalidConfig(_))
        ));
    }
}
