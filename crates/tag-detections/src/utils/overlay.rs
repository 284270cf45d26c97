use anyhow::{Context, Result};
use centroid_tracker::TaggedRecord;
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

static CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
static ID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
static CENTROID_RADIUS: i32 = 5;
static ID_SCALE: f32 = 40.0;

/// Load a TrueType font for drawing track ids.
pub fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    Font::try_from_vec(bytes).with_context(|| format!("invalid font {}", path.display()))
}

/// Frame index from an image file stem, e.g. `000123.jpg` is frame 123.
pub fn frame_index(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.parse::<u32>().ok()
}

/// Draw the bounding box in the class color, a centroid marker and, given a font, the track id.
pub fn draw_record(frame: &mut RgbImage, record: &TaggedRecord, font: Option<&Font>) {
    let [x, y, width, height] = record.bbox;
    let [cx, cy] = record.centroid;

    imageproc::drawing::draw_hollow_rect_mut(
        frame,
        Rect::at(x as i32, y as i32).of_size((width as u32).max(1), (height as u32).max(1)),
        Rgb(record.color),
    );

    imageproc::drawing::draw_filled_circle_mut(frame, (cx, cy), CENTROID_RADIUS, CENTROID_COLOR);

    if let Some(font) = font {
        imageproc::drawing::draw_text_mut(
            frame,
            ID_COLOR,
            cx,
            cy,
            Scale::uniform(ID_SCALE),
            font,
            &record.id.to_string(),
        );
    }
}

/// Draw the records of each frame onto the matching image and write it to `out_dir`.
///
/// Returns the number of images written.
pub fn write_images(
    pattern: &str,
    out_dir: &Path,
    records: &BTreeMap<u32, Vec<TaggedRecord>>,
    font: Option<&Font>,
) -> Result<usize> {
    std::fs::create_dir_all(out_dir)?;

    let paths = glob::glob(pattern)?
        .filter_map(|path| path.ok())
        .collect::<Vec<PathBuf>>();

    let mut written = 0;
    for path in paths {
        let Some(index) = frame_index(&path) else {
            tracing::warn!(path = %path.display(), "skipping image without a frame index");
            continue;
        };

        let mut frame = image::io::Reader::open(&path)?.decode()?.to_rgb8();
        if let Some(records) = records.get(&index) {
            records
                .iter()
                .for_each(|record| draw_record(&mut frame, record, font));
        }

        let file_name = path.file_name().context("image path has no file name")?;
        frame.save(out_dir.join(file_name))?;
        written += 1;
    }

    Ok(written)
}
