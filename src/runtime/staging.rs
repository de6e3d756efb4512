use std::path::{Path, PathBuf};
use image::{DynamicImage, GenericImageView};
use image::imageops::FilterType;
use tracing::info;
use crate::error::StagingError;

/// Size that scales `(width, height)` uniformly so the shorter side is `short_side`.
///
/// Halves round to even: 1025x1024 becomes 512x512.
pub fn scaled_dimensions(width: u32, height: u32, short_side: u32) -> Result<(u32, u32), StagingError> {
    let min_side = width.min(height);
    if min_side == 0 {
        return Err(StagingError::EmptyImage);
    }
    let scale = short_side as f64 / min_side as f64;
    let w = (width as f64 * scale).round_ties_even().max(1.0) as u32;
    let h = (height as f64 * scale).round_ties_even().max(1.0) as u32;
    Ok((w, h))
}

pub fn resize_to_short_side(image: &DynamicImage, short_side: u32) -> Result<DynamicImage, StagingError> {
    let (width, height) = image.dimensions();
    let (w, h) = scaled_dimensions(width, height, short_side)?;
    Ok(image.resize_exact(w, h, FilterType::CatmullRom))
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, StagingError> {
    image::load_from_memory(bytes).map_err(StagingError::Decode)
}

/// Writes the input image where the backend's loader node will read it.
#[derive(Debug, Clone)]
pub struct Stager {
    target: PathBuf,
    short_side: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Stager {
    pub fn new(target: impl Into<PathBuf>, short_side: u32) -> Self {
        Self {
            target: target.into(),
            short_side,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Resize and save, replacing whatever an earlier request staged.
    pub fn stage(&self, image: &DynamicImage) -> Result<StagedImage, StagingError> {
        let resized = resize_to_short_side(image, self.short_side)?;
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        rgb.save(&self.target).map_err(|source| StagingError::Write {
            path: self.target.clone(),
            source,
        })?;

        info!(path = %self.target.display(), width = rgb.width(), height = rgb.height(), "Staged input image");
        Ok(StagedImage {
            path: self.target.clone(),
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}
