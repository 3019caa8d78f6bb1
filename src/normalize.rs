use crate::stack::Frame;

use ndarray::Array2;

pub struct Normalizer;

impl Normalizer {
    /// Stretch one frame to the full 8-bit range.
    ///
    /// Each frame is normalized on its own: the frame minimum maps to 0 and
    /// the frame maximum to 255. A uniform frame comes out all black.
    pub fn rescale(frame: &Frame) -> Array2<u8> {
        let min = frame.fold(f32::INFINITY, |acc, &v| acc.min(v));
        let span = frame.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v)) - min;
        let scale = if span > 0.0 { 255.0 / span } else { 0.0 };
        frame.mapv(|v| ((v - min) * scale) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn output_spans_full_range() {
        let frame = array![[10.0, 20.0], [30.0, 50.0]];
        let rescaled = Normalizer::rescale(&frame);
        assert_eq!(rescaled, array![[0u8, 63], [127, 255]]);
    }

    #[test]
    fn uniform_frame_is_black() {
        let frame = Frame::from_elem((3, 3), 42.0);
        let rescaled = Normalizer::rescale(&frame);
        assert!(rescaled.iter().all(|&v| v == 0));
    }

    #[test]
    fn negative_samples_are_shifted_into_range() {
        let frame = array![[-100.0, 0.0], [100.0, 300.0]];
        let rescaled = Normalizer::rescale(&frame);
        assert_eq!(rescaled[[0, 0]], 0);
        assert_eq!(rescaled[[1, 1]], 255);
    }

    #[test]
    fn idempotent_on_non_uniform_output() {
        let frame = array![[0.0, 128.0], [200.0, 255.0]];
        let once = Normalizer::rescale(&frame);
        let again = Normalizer::rescale(&once.mapv(f32::from));
        assert_eq!(once, again);
    }
}
