use thiserror::Error;

/// Which frames of a stack to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every frame
    All,
    /// Every nth frame, counting from the first. The stride is validated
    /// when the plan is built, not here.
    EveryNth(i64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Stride must be a positive integer, got {0}")]
    InvalidStride(i64),

    #[error("Selection matches no slices")]
    EmptySelection,
}

/// The ordered, strictly increasing set of frame indices to materialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPlan {
    indices: Vec<usize>,
}

impl SelectionPlan {
    /// Plan which of `total` frames to keep.
    ///
    /// # Errors
    ///
    /// Rejects non-positive strides and plans that select nothing. An empty
    /// plan can only arise from an empty stack, which the loader never
    /// produces, but the check stands regardless.
    pub fn build(total: usize, selection: Selection) -> Result<Self, SelectionError> {
        let indices: Vec<usize> = match selection {
            Selection::All => (0..total).collect(),
            Selection::EveryNth(n) => {
                if n <= 0 {
                    return Err(SelectionError::InvalidStride(n));
                }
                (0..total).step_by(n as usize).collect()
            }
        };

        if indices.is_empty() {
            return Err(SelectionError::EmptySelection);
        }

        Ok(SelectionPlan { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}
