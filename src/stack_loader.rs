use crate::stack::{FrameStack, FrameStackError};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, from_reader},
    pixeldata::{ConvertOptions, DecodedPixelData, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array4, Axis};
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

#[derive(Debug, Error)]
pub enum StackLoaderError {
    #[error("Not a decodable DICOM stream: {0}")]
    InvalidInput(#[from] dicom::object::ReadError),

    #[error("Failed to read pixel data: {0}")]
    Pixel(#[from] dicom::pixeldata::Error),

    #[error("Unsupported samples per pixel: {0}")]
    UnsupportedSamples(usize),

    #[error(transparent)]
    Stack(#[from] FrameStackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct StackLoader;

impl StackLoader {
    /// Decode one DICOM dataset into a frame stack.
    ///
    /// Windowing (VOI LUT) is applied when the dataset carries one; polarity
    /// is corrected for MONOCHROME1 datasets so that higher sample values
    /// always mean brighter pixels. Both transforms are best-effort and fall
    /// back to the untouched payload when unavailable.
    ///
    /// # Arguments
    ///
    /// * `bytes` - One complete DICOM file, with or without the 128-byte
    ///   preamble
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not parseable DICOM, if the pixel
    /// payload cannot be read, or if the payload is not monochrome.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<FrameStack, StackLoaderError> {
        let object = from_reader(Self::strip_preamble(bytes))?;
        Self::load_from_object(&object)
    }

    /// Decode a DICOM file on disk into a frame stack.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<FrameStack, StackLoaderError> {
        let bytes = fs::read(path.as_ref())?;
        Self::load_from_bytes(&bytes)
    }

    /// Decode an already-parsed DICOM object into a frame stack.
    pub fn load_from_object(
        object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<FrameStack, StackLoaderError> {
        let pixel_data = object.decode_pixel_data()?;
        let payload = Self::windowed_payload(&pixel_data)?;

        let (frames, _, _, samples) = payload.dim();
        if samples != 1 {
            return Err(StackLoaderError::UnsupportedSamples(samples));
        }
        let mut payload = payload.index_axis_move(Axis(3), 0);

        if Self::is_monochrome1(object) {
            let max = payload.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
            debug!(max, "inverting MONOCHROME1 sample values");
            payload.mapv_inplace(|v| max - v);
        }

        // Single-frame payloads drop the frame axis, matching the shape a
        // plain 2D dataset reports.
        let payload = if frames == 1 {
            payload.index_axis_move(Axis(0), 0).into_dyn()
        } else {
            payload.into_dyn()
        };

        Ok(FrameStack::from_dyn(payload)?)
    }

    fn strip_preamble(bytes: &[u8]) -> &[u8] {
        if bytes.len() >= PREAMBLE_LEN + MAGIC.len()
            && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC
        {
            &bytes[PREAMBLE_LEN..]
        } else {
            bytes
        }
    }

    fn windowed_payload(
        pixel_data: &DecodedPixelData<'_>,
    ) -> Result<Array4<f32>, dicom::pixeldata::Error> {
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::First);
        match pixel_data.to_ndarray_with_options::<f32>(&options) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(%error, "VOI LUT not applicable, using raw sample values");
                pixel_data.to_ndarray::<f32>()
            }
        }
    }

    fn is_monochrome1(object: &FileDicomObject<InMemDicomObject>) -> bool {
        let interpretation = object
            .element(tags::PHOTOMETRIC_INTERPRETATION)
            .ok()
            .and_then(|element| element.to_str().ok());
        match interpretation {
            Some(value) => value.trim().eq_ignore_ascii_case("MONOCHROME1"),
            None => {
                debug!("photometric interpretation unavailable, skipping inversion");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_invalid_input() {
        let result = StackLoader::load_from_bytes(b"definitely not a DICOM stream");
        assert!(matches!(result, Err(StackLoaderError::InvalidInput(_))));
    }

    #[test]
    fn preamble_is_stripped_only_when_magic_follows() {
        let mut with_preamble = vec![0u8; PREAMBLE_LEN];
        with_preamble.extend_from_slice(b"DICMrest");
        assert_eq!(StackLoader::strip_preamble(&with_preamble), b"DICMrest");

        let without = b"DICMrest".to_vec();
        assert_eq!(StackLoader::strip_preamble(&without), b"DICMrest");

        let short = b"xx".to_vec();
        assert_eq!(StackLoader::strip_preamble(&short), b"xx");
    }
}
