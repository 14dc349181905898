//! Image to feature vector transform.
//!
//! The models were trained on 64x64 grayscale thumbnails scaled to `[0, 1]`
//! and flattened row by row, so every input goes through exactly that pipeline
//! regardless of its original size or color layout.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use ndarray::{Array1, ArrayView1};
use scenery_helpers::{LengthMismatch, check_len};

/// Side length of the square thumbnail fed to the models.
pub const IMAGE_SIDE: u32 = 64;

/// Number of values in every [`FeatureVector`].
pub const FEATURE_LEN: usize = (IMAGE_SIDE * IMAGE_SIDE) as usize;

/// Resampling filter used for the resize. Pinned so extraction is reproducible.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// A flattened 64x64 grayscale thumbnail with intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }
}

impl TryFrom<Array1<f64>> for FeatureVector {
    type Error = LengthMismatch;

    /// Accepts precomputed values as long as there are exactly [`FEATURE_LEN`] of them.
    fn try_from(values: Array1<f64>) -> Result<Self, Self::Error> {
        check_len(values.view(), FEATURE_LEN)?;
        Ok(FeatureVector(values))
    }
}

/// Converts `image` into the model input.
///
/// Alpha is discarded, the RGB pixels are reduced to 8-bit luma, the result is
/// resized to [`IMAGE_SIDE`]x[`IMAGE_SIDE`], scaled by `1/255` and flattened
/// row-major.
pub fn extract(image: &DynamicImage) -> FeatureVector {
    let gray = to_luma(image);
    let thumb = imageops::resize(&gray, IMAGE_SIDE, IMAGE_SIDE, RESIZE_FILTER);
    let values: Array1<f64> = thumb.pixels().map(|p| f64::from(p.0[0]) / 255.0).collect();
    debug_assert_eq!(values.len(), FEATURE_LEN);
    FeatureVector(values)
}

/// ITU-R 601-2 luma in 16-bit fixed point with rounding:
/// `L = (R*19595 + G*38470 + B*7471 + 0x8000) >> 16`.
///
/// This is the conversion the training thumbnails were made with. It differs
/// from `DynamicImage::to_luma8`, which uses Rec. 709 weights.
pub fn to_luma(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        let l = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        *dst = Luma([l as u8]);
    }
    gray
}
