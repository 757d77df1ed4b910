// ============================================================
// Layer 4 — Feature Transform
// ============================================================
// Turns raw pixels into the FeatureVector the model consumes.
//
// There are two entry points but only one place where features
// are actually produced:
//
//   dataset pixels (28x28, bright-on-dark) ─────────────┐
//                                                        ▼
//   uploaded bytes → decode → canonical_grid ──► features_from_canonical_grid
//                              │                         │
//                              ├ 1. grayscale            ├ 5. flatten row-major
//                              ├ 2. invert polarity      └    divide by 255
//                              ├ 3. resize to 20x20 (Lanczos3)
//                              └ 4. pad 4px of 0 → 28x28
//
// Any drift between the two paths would silently degrade the
// model, so the final normalisation step is shared code.

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage};

use crate::domain::{
    error::DigitError,
    features::{FeatureVector, FEATURE_LEN, IMAGE_SIDE},
};

/// Side of the box the digit is resized into before padding.
pub const DIGIT_BOX: u32 = 20;

/// Border of zeros added on every side of the resized digit.
pub const BORDER: u32 = 4;

/// Stateless feature transform for both training and serving inputs.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Training path: pixels are already a 28x28 bright-on-dark grid.
    pub fn from_dataset_pixels(&self, pixels: &[u8]) -> Result<FeatureVector, DigitError> {
        features_from_canonical_grid(pixels)
    }

    /// Serving path: any encoded image the `image` crate can decode.
    pub fn from_upload(&self, bytes: &[u8]) -> Result<FeatureVector, DigitError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| DigitError::DecodeFailure(e.to_string()))?;
        let grid = self.canonical_grid(&image)?;
        features_from_canonical_grid(grid.as_raw())
    }

    /// Steps 1-4: produce a 28x28 bright-on-dark grid from any image.
    pub fn canonical_grid(&self, image: &DynamicImage) -> Result<GrayImage, DigitError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DigitError::TransformFailure(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }

        // Alpha is dropped here, the same way a plain luma conversion does.
        let mut gray = image.to_luma8();
        imageops::invert(&mut gray);

        let digit = imageops::resize(&gray, DIGIT_BOX, DIGIT_BOX, FilterType::Lanczos3);

        let side = IMAGE_SIDE as u32;
        let mut grid = GrayImage::new(side, side);
        for (x, y, pixel) in digit.enumerate_pixels() {
            grid.put_pixel(x + BORDER, y + BORDER, *pixel);
        }

        tracing::debug!(
            "Canonical grid from {}x{} upload, ink mass {}",
            image.width(),
            image.height(),
            grid.as_raw().iter().map(|&p| u64::from(p)).sum::<u64>(),
        );
        Ok(grid)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Step 5, shared by both paths: flatten row-major and scale to [0, 1].
pub fn features_from_canonical_grid(pixels: &[u8]) -> Result<FeatureVector, DigitError> {
    if pixels.len() != FEATURE_LEN {
        return Err(DigitError::ShapeMismatch {
            expected: FEATURE_LEN,
            actual:   pixels.len(),
        });
    }
    FeatureVector::new(pixels.iter().map(|&p| f32::from(p) / 255.0).collect())
}
