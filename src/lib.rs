//! # DICOM-slicer library
//!
//! This crate turns one DICOM dataset into a batch of normalized,
//! browser-displayable PNG slice images.

//!
//! This library is part of the dicom-rs ecosystem and leverages its
//! components to decode the pixel payload, apply windowing (VOI LUT) when
//! the dataset carries one, and correct MONOCHROME1 polarity. The decoded
//! frames are each contrast-stretched to the full 8-bit range, thinned to
//! every nth slice (or kept in full), and written as RGB PNGs named
//! `slice_0001.png`, `slice_0002.png`, … into a batch-scoped location of a
//! pluggable store. A finished batch can be bundled into a single zip
//! archive for download.
//!
//! The pipeline is synchronous and owns no shared state; concurrent
//! invocations only need distinct batch identifiers.
//!
//! # Examples
//!
//! ## Slicing every third frame of a dataset
//!
//! Read a DICOM file, keep every third slice, and store the rendered
//! images under a temporary directory.
//!
//! ```no_run
//! # use dicom_slicer::select::Selection;
//! # use dicom_slicer::slicer::Slicer;
//! # use dicom_slicer::storage::{self, FsStore};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("study.dcm")?;
//! let store = FsStore::open_temp()?;
//! let batch_id = storage::batch_id("study");
//! let batch = Slicer::run(&bytes, Selection::EveryNth(3), &store, &batch_id)?;
//! for slice in &batch.slices {
//!     println!("{}", slice.filename);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod encode;
pub mod normalize;
pub mod select;
pub mod slicer;
pub mod stack;
pub mod stack_loader;
pub mod storage;
