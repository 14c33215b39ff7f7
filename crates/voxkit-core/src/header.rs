//! Raw dataset decoding.
//!
//! A dataset is a flat sequence of 16-bit signed integers. The first three
//! elements are the volume dimensions (width, height, depth); every element
//! after that is a voxel sample, x varying fastest, then y, then z. There is no
//! magic number, version field or endianness marker.

use glam::UVec3;

use crate::error::{Result, VolumeError};
use crate::options::ByteOrder;

/// Number of 16-bit elements in the dataset header.
pub const HEADER_ELEMENTS: usize = 3;

/// Size of the dataset header in bytes.
pub const HEADER_BYTES: usize = HEADER_ELEMENTS * 2;

/// Dimensions declared at the start of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeHeader {
    /// Width, height and depth in voxels.
    pub dims: UVec3,
}

impl VolumeHeader {
    /// Creates a header from explicit dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            dims: UVec3::new(width, height, depth),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.dims.x
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.dims.y
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.dims.z
    }

    /// Number of voxels the header declares.
    #[must_use]
    pub fn voxel_count(&self) -> u64 {
        u64::from(self.dims.x) * u64::from(self.dims.y) * u64::from(self.dims.z)
    }
}

/// A decoded dataset: header plus the raw samples that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVolume {
    pub header: VolumeHeader,
    pub samples: Vec<i16>,
}

/// Decodes the header and sample region of a dataset.
///
/// The sample count is not checked against the header here; the texture
/// uploader rejects mismatched volumes before touching the GPU.
///
/// # Errors
///
/// Returns [`VolumeError::MalformedHeader`] if the buffer is shorter than
/// [`HEADER_BYTES`], has an odd length, or declares a negative dimension.
pub fn parse_header(bytes: &[u8], byte_order: ByteOrder) -> Result<RawVolume> {
    if bytes.len() < HEADER_BYTES {
        return Err(malformed(format!(
            "buffer of {} bytes is shorter than the {HEADER_BYTES}-byte header",
            bytes.len()
        )));
    }
    if bytes.len() % 2 != 0 {
        return Err(malformed(format!(
            "buffer length {} is not a multiple of 2",
            bytes.len()
        )));
    }

    let (head, body) = bytes.split_at(HEADER_BYTES);
    let mut dims = [0u32; HEADER_ELEMENTS];
    for ((axis, pair), dim) in ["width", "height", "depth"]
        .iter()
        .zip(head.chunks_exact(2))
        .zip(dims.iter_mut())
    {
        let value = byte_order.read_i16([pair[0], pair[1]]);
        let Ok(extent) = u32::try_from(value) else {
            return Err(malformed(format!("{axis} is negative ({value})")));
        };
        *dim = extent;
    }

    let header = VolumeHeader::new(dims[0], dims[1], dims[2]);
    let samples: Vec<i16> = body
        .chunks_exact(2)
        .map(|pair| byte_order.read_i16([pair[0], pair[1]]))
        .collect();
    log::debug!(
        "parsed volume header {}x{}x{} with {} samples",
        header.width(),
        header.height(),
        header.depth(),
        samples.len()
    );

    Ok(RawVolume { header, samples })
}

fn malformed(reason: String) -> VolumeError {
    log::error!("Malformed volume header: {reason}");
    VolumeError::MalformedHeader(reason)
}

/// Encodes a dataset in the same layout [`parse_header`] reads.
///
/// Dimensions above `i16::MAX` cannot be represented and are clamped.
#[must_use]
pub fn encode_dataset(header: &VolumeHeader, samples: &[i16], byte_order: ByteOrder) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_BYTES + samples.len() * 2);
    for dim in header.dims.to_array() {
        let dim = i16::try_from(dim).unwrap_or(i16::MAX);
        bytes.extend_from_slice(&byte_order.write_i16(dim));
    }
    for &sample in samples {
        bytes.extend_from_slice(&byte_order.write_i16(sample));
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_2x2x1() {
        let bytes = encode_dataset(
            &VolumeHeader::new(2, 2, 1),
            &[10, 20, 0, 5],
            ByteOrder::LittleEndian,
        );
        let raw = parse_header(&bytes, ByteOrder::LittleEndian).unwrap();
        assert_eq!(raw.header, VolumeHeader::new(2, 2, 1));
        assert_eq!(raw.samples, vec![10, 20, 0, 5]);
        assert_eq!(raw.header.voxel_count(), 4);
    }

    #[test]
    fn test_little_endian_layout() {
        // width=3, height=1, depth=1, one sample of 258
        let bytes = [3, 0, 1, 0, 1, 0, 2, 1];
        let raw = parse_header(&bytes, ByteOrder::LittleEndian).unwrap();
        assert_eq!(raw.header.dims, UVec3::new(3, 1, 1));
        assert_eq!(raw.samples, vec![258]);
    }

    #[test]
    fn test_big_endian() {
        let bytes = encode_dataset(
            &VolumeHeader::new(1, 1, 2),
            &[-7, 300],
            ByteOrder::BigEndian,
        );
        assert_eq!(&bytes[..2], &[0, 1]);
        let raw = parse_header(&bytes, ByteOrder::BigEndian).unwrap();
        assert_eq!(raw.header, VolumeHeader::new(1, 1, 2));
        assert_eq!(raw.samples, vec![-7, 300]);
    }

    #[test]
    fn test_header_only() {
        let bytes = encode_dataset(&VolumeHeader::new(0, 0, 0), &[], ByteOrder::LittleEndian);
        let raw = parse_header(&bytes, ByteOrder::LittleEndian).unwrap();
        assert!(raw.samples.is_empty());
        assert_eq!(raw.header.voxel_count(), 0);
    }

    #[test]
    fn test_odd_length_rejected() {
        let bytes = [2, 0, 2, 0, 1, 0, 9];
        assert!(matches!(
            parse_header(&bytes, ByteOrder::LittleEndian),
            Err(VolumeError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let mut bytes = encode_dataset(&VolumeHeader::new(2, 2, 1), &[], ByteOrder::LittleEndian);
        bytes[2..4].copy_from_slice(&(-1i16).to_le_bytes());
        let err = parse_header(&bytes, ByteOrder::LittleEndian).unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn test_max_dimension() {
        let bytes = encode_dataset(
            &VolumeHeader::new(32767, 1, 1),
            &[],
            ByteOrder::LittleEndian,
        );
        let raw = parse_header(&bytes, ByteOrder::LittleEndian).unwrap();
        assert_eq!(raw.header.width(), 32767);
    }

    proptest! {
        #[test]
        fn short_buffers_are_malformed(
            bytes in proptest::collection::vec(any::<u8>(), 0..HEADER_BYTES)
        ) {
            prop_assert!(matches!(
                parse_header(&bytes, ByteOrder::LittleEndian),
                Err(VolumeError::MalformedHeader(_))
            ));
        }

        #[test]
        fn sample_region_follows_header(
            dims in (0u32..64, 0u32..64, 0u32..64),
            samples in proptest::collection::vec(any::<i16>(), 0..128),
        ) {
            let header = VolumeHeader::new(dims.0, dims.1, dims.2);
            let bytes = encode_dataset(&header, &samples, ByteOrder::LittleEndian);
            let raw = parse_header(&bytes, ByteOrder::LittleEndian).unwrap();
            prop_assert_eq!(raw.header, header);
            prop_assert_eq!(raw.samples, samples);
        }
    }
}
