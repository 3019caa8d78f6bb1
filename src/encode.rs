use image::{ImageBuffer, ImageFormat, Rgb};
use ndarray::Array2;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Frame buffer does not match its dimensions")]
    Geometry,

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// One encoded slice, ready to be handed to storage
pub struct RenderedImage {
    /// 0-based index of the frame in the original stack
    pub index: usize,
    /// `slice_NNNN.png`, 1-based to match clinical slice numbering
    pub filename: String,
    pub png: Vec<u8>,
}

pub struct SliceEncoder;

impl SliceEncoder {
    /// Encode a normalized frame as a PNG, promoting the gray channel to
    /// RGB for consumers that expect full-color rasters.
    pub fn encode(frame: &Array2<u8>, index: usize) -> Result<RenderedImage, EncodeError> {
        let (height, width) = frame.dim();

        let mut rgb = Vec::with_capacity(height * width * 3);
        for &v in frame.iter() {
            rgb.extend_from_slice(&[v, v, v]);
        }

        let image: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width as u32, height as u32, rgb).ok_or(EncodeError::Geometry)?;

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(RenderedImage {
            index,
            filename: Self::filename(index),
            png,
        })
    }

    /// Deterministic name for the slice at a 0-based index. The field widens
    /// past four digits for very long stacks.
    pub fn filename(index: usize) -> String {
        format!("slice_{:04}.png", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn filenames_are_one_based_and_zero_padded() {
        assert_eq!(SliceEncoder::filename(0), "slice_0001.png");
        assert_eq!(SliceEncoder::filename(1), "slice_0002.png");
        assert_eq!(SliceEncoder::filename(41), "slice_0042.png");
        assert_eq!(SliceEncoder::filename(9998), "slice_9999.png");
    }

    #[test]
    fn filenames_sort_like_indices() {
        let names: Vec<String> = (0..9999).map(SliceEncoder::filename).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn gray_is_replicated_across_channels() {
        let frame = array![[0u8, 128], [255, 7]];
        let rendered = SliceEncoder::encode(&frame, 0).unwrap();
        assert_eq!(rendered.filename, "slice_0001.png");

        let decoded = image::load_from_memory(&rendered.png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(decoded.get_pixel(1, 0), &Rgb([128, 128, 128]));
        assert_eq!(decoded.get_pixel(0, 1), &Rgb([255, 255, 255]));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([7, 7, 7]));
    }
}
