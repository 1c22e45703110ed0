use std::path::{Path, PathBuf};

use crate::detect::locator::{FaceBox, FaceLocator, NormalizedBox, best_candidate};
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::render::frame::SourceImage;

/// Minimum detection confidence accepted from an annotation.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Face annotation document: a single detection or a list of candidates.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
enum Annotation {
    One(NormalizedBox),
    Many(Vec<NormalizedBox>),
}

/// Locator backed by a JSON annotation written by an external detector.
///
/// The annotation holds relative coordinates, e.g.
/// `{"xmin": 0.31, "ymin": 0.2, "width": 0.37, "height": 0.5, "confidence": 0.93}`, or an array
/// of such objects. A missing file means no face; an unreadable or malformed file is a detector
/// failure.
#[derive(Clone, Debug)]
pub struct SidecarLocator {
    path: PathBuf,
    min_confidence: f64,
}

impl SidecarLocator {
    /// Read annotations from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Conventional annotation path next to an image: `photo.jpg` -> `photo.jpg.face.json`.
    pub fn path_for_image(image_path: &Path) -> PathBuf {
        let mut name = image_path.as_os_str().to_owned();
        name.push(".face.json");
        PathBuf::from(name)
    }

    /// Locator reading the conventional annotation next to `image_path`.
    pub fn for_image(image_path: &Path) -> Self {
        Self::new(Self::path_for_image(image_path))
    }

    /// Override the confidence floor.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Annotation path this locator reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_candidates(&self) -> StillmotionResult<Option<Vec<NormalizedBox>>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StillmotionError::face_detection(format!(
                    "read face annotation '{}': {e}",
                    self.path.display()
                )));
            }
        };
        let doc: Annotation = serde_json::from_slice(&bytes).map_err(|e| {
            StillmotionError::face_detection(format!(
                "parse face annotation '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(match doc {
            Annotation::One(b) => vec![b],
            Annotation::Many(v) => v,
        }))
    }
}

impl FaceLocator for SidecarLocator {
    fn detect(&mut self, image: &SourceImage) -> StillmotionResult<Option<FaceBox>> {
        let Some(candidates) = self.read_candidates()? else {
            tracing::debug!(path = %self.path.display(), "no face annotation");
            return Ok(None);
        };
        let Some(best) = best_candidate(&candidates, self.min_confidence) else {
            return Ok(None);
        };
        Ok(best.to_pixels(image.width(), image.height()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/sidecar.rs"]
mod tests;
