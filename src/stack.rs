use ndarray::{Array2, ArrayD, Ix2, Ix3};
use thiserror::Error;

/// A single 2D grid of sample values, floating point after any LUT
/// application by the decode step.
pub type Frame = Array2<f32>;

#[derive(Debug, Error)]
pub enum FrameStackError {
    #[error("Pixel payload has no frames")]
    Empty,

    #[error("Unsupported pixel payload rank: {0}")]
    UnsupportedRank(usize),
}

/// An ordered collection of equally-shaped frames decoded from one dataset.
///
/// A rank-2 payload is a single image; a rank-3 payload is a stack whose
/// outermost axis counts frames. Higher ranks are rejected instead of being
/// reinterpreted through their outermost dimension.
pub enum FrameStack {
    Single(Frame),
    Stack(Vec<Frame>),
}

impl FrameStack {
    /// Build a stack from a dynamic-rank array as reported by the decoder.
    ///
    /// # Errors
    ///
    /// Returns an error for rank ≥ 4 payloads and for rank-3 payloads with
    /// an empty frame axis.
    pub fn from_dyn(array: ArrayD<f32>) -> Result<Self, FrameStackError> {
        match array.ndim() {
            2 => {
                let frame = array
                    .into_dimensionality::<Ix2>()
                    .map_err(|_| FrameStackError::UnsupportedRank(2))?;
                Ok(FrameStack::Single(frame))
            }
            3 => {
                let stack = array
                    .into_dimensionality::<Ix3>()
                    .map_err(|_| FrameStackError::UnsupportedRank(3))?;
                if stack.shape()[0] == 0 {
                    return Err(FrameStackError::Empty);
                }
                let frames = stack.outer_iter().map(|frame| frame.to_owned()).collect();
                Ok(FrameStack::Stack(frames))
            }
            rank => Err(FrameStackError::UnsupportedRank(rank)),
        }
    }

    /// Number of frames in the stack
    pub fn total(&self) -> usize {
        match self {
            FrameStack::Single(_) => 1,
            FrameStack::Stack(frames) => frames.len(),
        }
    }

    /// Height and width shared by every frame
    pub fn frame_dim(&self) -> (usize, usize) {
        match self {
            FrameStack::Single(frame) => frame.dim(),
            FrameStack::Stack(frames) => frames[0].dim(),
        }
    }

    /// Iterate the frames in order
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        match self {
            FrameStack::Single(frame) => std::slice::from_ref(frame).iter(),
            FrameStack::Stack(frames) => frames.iter(),
        }
    }
}
