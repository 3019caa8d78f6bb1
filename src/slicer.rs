use crate::encode::{EncodeError, SliceEncoder};
use crate::normalize::Normalizer;
use crate::select::{Selection, SelectionError, SelectionPlan};
use crate::stack_loader::{StackLoader, StackLoaderError};
use crate::storage::SliceStore;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SliceError {
    #[error(transparent)]
    Load(#[from] StackLoaderError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// One rendered slice as recorded in an [`OutputBatch`]. The image bytes
/// live in the store, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRecord {
    pub index: usize,
    pub filename: String,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct OutputBatch {
    pub batch_id: String,
    pub slices: Vec<SliceRecord>,
}

pub struct Slicer;

impl Slicer {
    /// Run the full pipeline: decode the dataset, plan the selection, then
    /// normalize, encode and store each selected frame in order.
    ///
    /// Decoding and planning happen before the batch namespace is touched,
    /// so a failed run never leaves a partial batch behind. Storage errors
    /// propagate unchanged; nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns an error for undecodable input, invalid or empty selections,
    /// and any encoding or storage failure.
    pub fn run(
        bytes: &[u8],
        selection: Selection,
        store: &dyn SliceStore,
        batch_id: &str,
    ) -> Result<OutputBatch, SliceError> {
        let stack = StackLoader::load_from_bytes(bytes)?;
        let (height, width) = stack.frame_dim();
        debug!(total = stack.total(), height, width, "decoded frame stack");

        let plan = SelectionPlan::build(stack.total(), selection)?;

        store.create_batch(batch_id)?;

        let mut slices = Vec::with_capacity(plan.len());
        for (index, frame) in stack.frames().enumerate() {
            if !plan.contains(index) {
                continue;
            }
            let normalized = Normalizer::rescale(frame);
            let rendered = SliceEncoder::encode(&normalized, index)?;
            store.write_blob(batch_id, &rendered.filename, &rendered.png)?;
            slices.push(SliceRecord {
                index,
                filename: rendered.filename,
            });
        }

        info!(
            batch_id,
            total = stack.total(),
            selected = slices.len(),
            "sliced dataset"
        );

        Ok(OutputBatch {
            batch_id: batch_id.to_string(),
            slices,
        })
    }
}
