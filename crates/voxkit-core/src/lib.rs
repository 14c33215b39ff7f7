//! Core volume handling for voxkit.
//!
//! This crate has no GPU dependencies. It provides:
//! - [`parse_header`] for decoding raw `i16` datasets
//! - [`normalize`] for rescaling samples by the dataset maximum
//! - [`LoaderOptions`] for configuring byte order, scale policy and texture unit

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod header;
pub mod normalize;
pub mod options;

pub use error::{Result, VolumeError};
pub use header::{encode_dataset, parse_header, RawVolume, VolumeHeader, HEADER_BYTES};
pub use normalize::{
    normalization_scale, normalize, normalize_with_policy, sample_range, NormalizedVolume,
    SampleRange,
};
pub use options::{ByteOrder, LoaderOptions, ScalePolicy};

// Re-export glam types for convenience
pub use glam::UVec3;
