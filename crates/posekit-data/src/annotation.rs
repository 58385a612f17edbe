//! On-disk annotation layout.
//!
//! ```text
//! <root>/<species>/<index_file>        one sample id per line
//! <root>/<species>/keypoints/<id>.txt  N rows of `x y [visibility]`
//! <root>/<species>/bboxes/<id>.txt     optional `left top right bottom`
//! <root>/<species>/images/<id>.<ext>
//! ```
//!
//! Values may be separated by commas, whitespace or both. Blank lines and
//! lines starting with `#` are ignored everywhere.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use posekit_core::{BoundingBox, Keypoint};
use serde::Serialize;

use crate::config::DatasetConfig;
use crate::error::{DatasetError, DatasetResult};

/// One annotated sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub id: String,
    pub species: String,
    pub image_path: PathBuf,
    pub keypoints: Vec<Keypoint>,
    /// 1.0 for visible keypoints, 0.0 otherwise.
    pub visibility: Vec<f32>,
    pub bbox: BoundingBox,
}

impl SampleRecord {
    /// `species/id`, unique across the dataset.
    pub fn key(&self) -> String {
        format!("{}/{}", self.species, self.id)
    }
}

/// Lines of `text` that carry data, with 1-based line numbers.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_numbers(path: &Path, line_no: usize, line: &str) -> DatasetResult<Vec<f64>> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().map_err(|_| {
                DatasetError::annotation(path, line_no, format!("invalid number '{}'", field))
            })
        })
        .collect()
}

fn read_text(path: &Path) -> DatasetResult<String> {
    fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))
}

/// Read the sample ids listed in an index file.
pub fn read_index(path: &Path) -> DatasetResult<Vec<String>> {
    let text = read_text(path)?;
    Ok(data_lines(&text).map(|(_, id)| id.to_string()).collect())
}

/// Parse exactly `expected` keypoint rows.
///
/// A third column is the visibility flag (positive means visible). Rows with
/// only two columns count as visible when both coordinates are positive.
pub fn parse_keypoints(
    path: &Path,
    text: &str,
    expected: usize,
) -> DatasetResult<(Vec<Keypoint>, Vec<f32>)> {
    let mut keypoints = Vec::with_capacity(expected);
    let mut visibility = Vec::with_capacity(expected);
    let mut last_line = 0;

    for (line_no, line) in data_lines(text) {
        last_line = line_no;
        let values = parse_numbers(path, line_no, line)?;
        let (x, y, visible) = match values[..] {
            [x, y] => (x, y, x > 0.0 && y > 0.0),
            [x, y, v] => (x, y, v > 0.0),
            _ => {
                return Err(DatasetError::annotation(
                    path,
                    line_no,
                    format!("expected 2 or 3 values, found {}", values.len()),
                ))
            }
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(DatasetError::annotation(path, line_no, "non-finite coordinate"));
        }
        keypoints.push(Keypoint::new(x, y));
        visibility.push(if visible { 1.0 } else { 0.0 });
    }

    if keypoints.len() != expected {
        return Err(DatasetError::annotation(
            path,
            last_line,
            format!("expected {} keypoints, found {}", expected, keypoints.len()),
        ));
    }
    Ok((keypoints, visibility))
}

/// Parse a `left top right bottom` box.
pub fn parse_bbox(path: &Path, text: &str) -> DatasetResult<BoundingBox> {
    let (line_no, line) = data_lines(text)
        .next()
        .ok_or_else(|| DatasetError::annotation(path, 1, "empty bounding box file"))?;
    let values = parse_numbers(path, line_no, line)?;

    let [left, top, right, bottom] = values[..] else {
        return Err(DatasetError::annotation(
            path,
            line_no,
            format!("expected 4 values, found {}", values.len()),
        ));
    };
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DatasetError::annotation(path, line_no, "non-finite coordinate"));
    }
    if !(right > left && bottom > top) {
        return Err(DatasetError::annotation(
            path,
            line_no,
            format!("degenerate box [{}, {}, {}, {}]", left, top, right, bottom),
        ));
    }
    Ok(BoundingBox::new(left, top, right, bottom))
}

/// First existing `images/<id>.<ext>` in extension order.
pub fn resolve_image(
    species_dir: &Path,
    id: &str,
    extensions: &[String],
) -> DatasetResult<PathBuf> {
    let images = species_dir.join("images");
    extensions
        .iter()
        .map(|ext| images.join(format!("{}.{}", id, ext)))
        .find(|p| p.is_file())
        .ok_or_else(|| {
            let tried = extensions.join(", ");
            DatasetError::io(
                images.join(id),
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no image found with extensions [{}]", tried),
                ),
            )
        })
}

/// Build the record for `species/id` from its annotation files.
pub fn load_record(
    config: &DatasetConfig,
    species: &str,
    id: &str,
) -> DatasetResult<SampleRecord> {
    let species_dir = config.root.join(species);

    let kp_path = species_dir.join("keypoints").join(format!("{}.txt", id));
    let (keypoints, visibility) =
        parse_keypoints(&kp_path, &read_text(&kp_path)?, config.num_keypoints)?;

    let bbox_path = species_dir.join("bboxes").join(format!("{}.txt", id));
    let bbox = if bbox_path.is_file() {
        parse_bbox(&bbox_path, &read_text(&bbox_path)?)?
    } else {
        debug!("no bbox file for {}/{}, using visible keypoints", species, id);
        BoundingBox::from_visible_keypoints(&keypoints, &visibility).ok_or_else(|| {
            DatasetError::annotation(&kp_path, 0, "no visible keypoints and no bounding box")
        })?
    };

    let image_path = resolve_image(&species_dir, id, &config.image_extensions)?;

    Ok(SampleRecord {
        id: id.to_string(),
        species: species.to_string(),
        image_path,
        keypoints,
        visibility,
        bbox,
    })
}

/// Species directories under `root` that contain `index_file`, sorted by name.
pub fn discover_species(root: &Path, index_file: &str) -> DatasetResult<Vec<String>> {
    let entries = fs::read_dir(root).map_err(|e| DatasetError::io(root, e))?;
    let mut species: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join(index_file).is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    species.sort();
    Ok(species)
}
