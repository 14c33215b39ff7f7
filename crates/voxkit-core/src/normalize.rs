//! Host-side sample normalization.

use crate::error::{Result, VolumeError};
use crate::options::ScalePolicy;

/// Samples rescaled by the dataset maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVolume {
    /// One value per voxel, in the order of the raw samples.
    pub samples: Vec<f32>,
    /// The divisor applied to every sample.
    pub scale: f32,
}

/// True minimum and maximum of a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRange {
    pub min: i16,
    pub max: i16,
}

/// Returns the true range of `samples`, or `None` if there are none.
#[must_use]
pub fn sample_range(samples: &[i16]) -> Option<SampleRange> {
    let (&first, rest) = samples.split_first()?;
    let range = rest.iter().fold(
        SampleRange {
            min: first,
            max: first,
        },
        |acc, &v| SampleRange {
            min: acc.min.min(v),
            max: acc.max.max(v),
        },
    );
    Some(range)
}

/// Computes the normalization scale: the running maximum seeded at zero.
///
/// A dataset with no positive sample therefore has a scale of zero, not its
/// true (negative) maximum.
#[must_use]
pub fn normalization_scale(samples: &[i16]) -> f32 {
    let max = samples.iter().fold(0i16, |max, &v| max.max(v));
    f32::from(max)
}

/// Rescales every sample by the dataset maximum.
///
/// The scale is computed over the whole sequence before any division. When
/// the scale is zero the division is carried out anyway: zero samples become
/// NaN and negative samples become negative infinity.
#[must_use]
pub fn normalize(samples: &[i16]) -> NormalizedVolume {
    let scale = normalization_scale(samples);
    log::info!("normalization scale is {scale}");

    let samples = samples.iter().map(|&v| f32::from(v) / scale).collect();
    NormalizedVolume { samples, scale }
}

/// Like [`normalize`], but applies `policy` to a non-positive scale.
///
/// # Errors
///
/// Returns [`VolumeError::NonPositiveScale`] under [`ScalePolicy::Strict`] when
/// no sample is positive.
pub fn normalize_with_policy(samples: &[i16], policy: ScalePolicy) -> Result<NormalizedVolume> {
    if let Some(range) = sample_range(samples) {
        log::debug!("sample range is [{}, {}]", range.min, range.max);
    }

    let normalized = normalize(samples);
    if normalized.scale <= 0.0 {
        match policy {
            ScalePolicy::SeedAtZero => {
                log::warn!("volume has no positive sample; normalized values are not finite");
            }
            ScalePolicy::Strict => {
                log::error!(
                    "refusing to normalize volume with scale {}",
                    normalized.scale
                );
                return Err(VolumeError::NonPositiveScale(normalized.scale));
            }
        }
    }
    Ok(normalized)
}
