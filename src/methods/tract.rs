//! Tract-backed [`Segmenter`] running an ONNX foreground segmentation model
//!
//! Pure Rust inference on the CPU. The model is read from disk on the first
//! `segment` call and cached for the lifetime of the segmenter, including a
//! failed load, so a missing model is reported once per chain rather than
//! re-read for every image.

use super::Segmenter;
use crate::{
    config::RemovalConfig,
    error::{BgRemovalError, Result},
    services::ImageIOService,
};
use image::{imageops, DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};
use instant::Instant;
use ndarray::{Array4, ArrayView4};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

const PADDING_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Square letterbox placement of an image inside the model input
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    scale: f32,
    scaled_width: u32,
    scaled_height: u32,
    offset_x: u32,
    offset_y: u32,
}

impl Letterbox {
    fn new(original: (u32, u32), target_size: u32) -> Self {
        let (width, height) = original;
        let target = target_size as f32;
        let scale = (target / width.max(1) as f32).min(target / height.max(1) as f32);

        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            scaled_width,
            scaled_height,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
        }
    }
}

#[derive(Debug)]
pub struct TractSegmenter {
    model_path: PathBuf,
    input_size: u32,
    mean: [f32; 3],
    std: [f32; 3],
    model: OnceCell<std::result::Result<TractModel, String>>,
}

impl TractSegmenter {
    /// Segmenter for the model at `model_path` with the configured
    /// preprocessing parameters
    #[must_use]
    pub fn from_config(config: &RemovalConfig) -> Self {
        Self {
            model_path: config.resolved_model_path(),
            input_size: config.model_input_size,
            mean: config.normalization_mean,
            std: config.normalization_std,
            model: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn model(&self) -> Result<&TractModel> {
        self.model
            .get_or_init(|| load_model(&self.model_path).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| BgRemovalError::model(e.clone()))
    }

    fn preprocess(&self, image: &DynamicImage, letterbox: &Letterbox) -> Array4<f32> {
        let rgb = image.to_rgb8();
        let resized = imageops::resize(
            &rgb,
            letterbox.scaled_width,
            letterbox.scaled_height,
            imageops::FilterType::Triangle,
        );

        let mut canvas = RgbImage::from_pixel(self.input_size, self.input_size, PADDING_COLOR);
        imageops::replace(
            &mut canvas,
            &resized,
            i64::from(letterbox.offset_x),
            i64::from(letterbox.offset_y),
        );

        let size = self.input_size as usize;
        Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
            let value = f32::from(canvas.get_pixel(x as u32, y as u32)[c]) / 255.0;
            (value - self.mean[c]) / self.std[c]
        })
    }

    fn infer(&self, input: Array4<f32>) -> Result<Array4<f32>> {
        let model = self.model()?;
        let shape = input.shape().to_vec();
        let data = input.into_raw_vec_and_offset().0;

        let tensor = Tensor::from_shape(&shape, &data)
            .map_err(|e| BgRemovalError::model(format!("Failed to build input tensor: {e}")))?;
        let outputs = model
            .run(tvec![tensor.into()])
            .map_err(|e| BgRemovalError::model(format!("Tract inference failed: {e}")))?;

        let output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| BgRemovalError::model("No output tensor found"))?
            .into_arc_tensor();

        let dims = output.shape().to_vec();
        let [n, c, h, w] = dims[..] else {
            return Err(BgRemovalError::model(format!(
                "Expected 4D output tensor, got {}D",
                dims.len()
            )));
        };
        if n != 1 || c != 1 {
            return Err(BgRemovalError::model(format!(
                "Expected a single-channel mask, got shape {dims:?}"
            )));
        }

        let values = output
            .as_slice::<f32>()
            .map_err(|e| BgRemovalError::model(format!("Failed to read output tensor: {e}")))?;
        let view = ArrayView4::from_shape((n, c, h, w), values)
            .map_err(|e| BgRemovalError::model(format!("Failed to reshape output tensor: {e}")))?;
        Ok(view.to_owned())
    }
}

fn load_model(path: &Path) -> Result<TractModel> {
    if !path.exists() {
        return Err(BgRemovalError::model_error_with_context(
            "load",
            path,
            "model unavailable",
            &[
                "pass --model <PATH>",
                "set model_path in the configuration file",
            ],
        ));
    }

    let start = Instant::now();
    let model = onnx()
        .model_for_path(path)
        .map_err(|e| BgRemovalError::model(format!("Failed to load ONNX model: {e}")))?
        .into_optimized()
        .map_err(|e| BgRemovalError::model(format!("Failed to optimize model: {e}")))?
        .into_runnable()
        .map_err(|e| BgRemovalError::model(format!("Failed to create runnable model: {e}")))?;

    log::info!(
        "Loaded segmentation model {} in {}ms",
        path.display(),
        start.elapsed().as_millis()
    );
    Ok(model)
}

/// Map the model's letterboxed mask back onto the original image grid
fn mask_to_alpha(mask: &Array4<f32>, original: (u32, u32), letterbox: &Letterbox) -> GrayImage {
    let (width, height) = original;
    let mask_height = mask.shape().get(2).copied().unwrap_or(0);
    let mask_width = mask.shape().get(3).copied().unwrap_or(0);

    GrayImage::from_fn(width, height, |x, y| {
        let tx = (x as f32 * letterbox.scale).round() as usize + letterbox.offset_x as usize;
        let ty = (y as f32 * letterbox.scale).round() as usize + letterbox.offset_y as usize;
        let value = if tx < mask_width && ty < mask_height {
            mask.get([0, 0, ty, tx]).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        Luma([(value.clamp(0.0, 1.0) * 255.0) as u8])
    })
}

impl Segmenter for TractSegmenter {
    fn name(&self) -> &str {
        "tract"
    }

    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let image = ImageIOService::decode_bytes(image_bytes)?;
        let dimensions = image.dimensions();
        let letterbox = Letterbox::new(dimensions, self.input_size);

        let input = self.preprocess(&image, &letterbox);
        let mask = self.infer(input)?;
        let alpha = mask_to_alpha(&mask, dimensions, &letterbox);

        let mut rgba = image.to_rgba8();
        for (pixel, a) in rgba.pixels_mut().zip(alpha.pixels()) {
            pixel[3] = a[0];
        }
        ImageIOService::encode_png(&rgba)
    }
}
