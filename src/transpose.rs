//! Axis reordering between the ISMRMRD and MRD payload conventions.
//!
//! ISMRMRD indexes acquisition data as `(sample, channel)` and images as `(x, y, z, channel)`,
//! column-major. MRD indexes the same payloads as `(channel, sample)` and `(channel, z, y, x)`,
//! row-major. Trajectories are `(dimension, sample)` on both sides, column-major in ISMRMRD and
//! row-major in MRD. Every conversion copies element by element through explicit subscripts, so
//! the mapping stays correct regardless of how the two layouts happen to coincide in memory.

use crate::error::{Error, Result};
use crate::{ArrayDim, Layout, N_DIMS};

/// Copy `src` (laid out as `src_dims`) into a new buffer laid out as `layout`, where axis `k` of
/// the new buffer is axis `axes[k]` of the source. Returns the new buffer and its dims.
pub fn permute<T: Copy>(src: &[T], src_dims: ArrayDim, axes: &[usize], layout: Layout) -> Result<(Vec<T>, ArrayDim)> {
    let rank = src_dims.rank();
    assert_eq!(axes.len(), rank, "one target axis per source axis");
    if src.len() != src_dims.numel() {
        return Err(Error::ShapeMismatch {
            what: "payload",
            expected: src_dims.numel(),
            found: src.len(),
        });
    }

    let mut shape = [1usize; N_DIMS];
    for (d, &a) in shape.iter_mut().zip(axes) {
        *d = src_dims.size(a);
    }
    let dst_dims = ArrayDim::from_shape(&shape[..rank], layout);

    let mut dst = Vec::with_capacity(src.len());
    // walk the destination in memory order and pull each element from its source subscript
    for dst_addr in 0..dst_dims.numel() {
        let idx = dst_dims.calc_idx(dst_addr);
        let mut src_idx = [0usize; N_DIMS];
        for (&i, &a) in idx[..rank].iter().zip(axes) {
            src_idx[a] = i;
        }
        dst.push(src[src_dims.calc_addr(&src_idx[..rank])]);
    }
    Ok((dst, dst_dims))
}

/// reverse the order of the axes
pub fn reverse_axes<T: Copy>(src: &[T], src_dims: ArrayDim, layout: Layout) -> Result<(Vec<T>, ArrayDim)> {
    let mut axes = [0usize; N_DIMS];
    let rank = src_dims.rank();
    for (k, a) in axes[..rank].iter_mut().enumerate() {
        *a = rank - 1 - k;
    }
    permute(src, src_dims, &axes[..rank], layout)
}

/// ISMRMRD `(sample, channel)` -> MRD `(channel, sample)`
pub fn samples_to_mrd<T: Copy>(data: &[T], samples: usize, channels: usize) -> Result<(Vec<T>, ArrayDim)> {
    reverse_axes(data, ArrayDim::column_major(&[samples, channels]), Layout::RowMajor)
}

/// MRD `(channel, sample)` -> ISMRMRD `(sample, channel)`
pub fn samples_to_ismrmrd<T: Copy>(data: &[T], channels: usize, samples: usize) -> Result<Vec<T>> {
    reverse_axes(data, ArrayDim::row_major(&[channels, samples]), Layout::ColumnMajor).map(|(d, _)| d)
}

/// ISMRMRD `(x, y, z, channel)` -> MRD `(channel, z, y, x)`
pub fn voxels_to_mrd<T: Copy>(data: &[T], matrix: [usize; 3], channels: usize) -> Result<(Vec<T>, ArrayDim)> {
    let [x, y, z] = matrix;
    reverse_axes(data, ArrayDim::column_major(&[x, y, z, channels]), Layout::RowMajor)
}

/// MRD `(channel, z, y, x)` -> ISMRMRD `(x, y, z, channel)`
pub fn voxels_to_ismrmrd<T: Copy>(data: &[T], dims: ArrayDim) -> Result<Vec<T>> {
    reverse_axes(data, dims, Layout::ColumnMajor).map(|(d, _)| d)
}

/// ISMRMRD trajectory `(dimension, sample)` column-major -> MRD `(dimension, sample)` row-major
pub fn trajectory_to_mrd(traj: &[f32], dimensions: usize, samples: usize) -> Result<(Vec<f32>, ArrayDim)> {
    permute(traj, ArrayDim::column_major(&[dimensions, samples]), &[0, 1], Layout::RowMajor)
}

/// MRD trajectory `(dimension, sample)` row-major -> ISMRMRD `(dimension, sample)` column-major
pub fn trajectory_to_ismrmrd(traj: &[f32], dimensions: usize, samples: usize) -> Result<Vec<f32>> {
    permute(traj, ArrayDim::row_major(&[dimensions, samples]), &[0, 1], Layout::ColumnMajor).map(|(d, _)| d)
}

#[cfg(test)]
mod tests {
    use num_complex::{Complex32, Complex64};

    use super::*;
    use crate::Element;

    fn ramp<T: Element>(n: usize, f: impl Fn(usize) -> T) -> Vec<T> {
        (0..n).map(f).collect()
    }

    #[test]
    fn samples_follow_subscripts() {
        // 3 samples x 2 channels, value = 10 * channel + sample
        let legacy: Vec<u32> = vec![0, 1, 2, 10, 11, 12];
        let (mrd, dims) = samples_to_mrd(&legacy, 3, 2).unwrap();
        assert_eq!(dims.shape(), &[2, 3]);
        for c in 0..2 {
            for s in 0..3 {
                assert_eq!(mrd[dims.calc_addr(&[c, s])], (10 * c + s) as u32);
            }
        }
        assert_eq!(samples_to_ismrmrd(&mrd, 2, 3).unwrap(), legacy);
    }

    #[test]
    fn voxels_follow_subscripts() {
        let legacy_dims = ArrayDim::column_major(&[4, 3, 2, 2]);
        let legacy: Vec<i32> = (0..legacy_dims.numel() as i32).collect();
        let (mrd, dims) = voxels_to_mrd(&legacy, [4, 3, 2], 2).unwrap();
        assert_eq!(dims.shape(), &[2, 2, 3, 4]);
        for c in 0..2 {
            for z in 0..2 {
                for y in 0..3 {
                    for x in 0..4 {
                        assert_eq!(
                            mrd[dims.calc_addr(&[c, z, y, x])],
                            legacy[legacy_dims.calc_addr(&[x, y, z, c])]
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn trajectory_changes_memory_order() {
        // 2 dimensions x 3 samples; legacy interleaves (kx, ky) per sample
        let legacy = vec![0.0f32, 0.5, 1.0, 1.5, 2.0, 2.5];
        let (mrd, dims) = trajectory_to_mrd(&legacy, 2, 3).unwrap();
        assert_eq!(dims.shape(), &[2, 3]);
        assert_eq!(mrd, vec![0.0, 1.0, 2.0, 0.5, 1.5, 2.5]);
        assert_eq!(trajectory_to_ismrmrd(&mrd, 2, 3).unwrap(), legacy);
    }

    fn round_trip<T: Element>(f: impl Fn(usize) -> T) {
        let data = ramp(5 * 4 * 3 * 2, &f);
        let (mrd, dims) = voxels_to_mrd(&data, [5, 4, 3], 2).unwrap();
        assert_eq!(voxels_to_ismrmrd(&mrd, dims).unwrap(), data);

        let samples = ramp(10 * 4, &f);
        let (mrd, _) = samples_to_mrd(&samples, 10, 4).unwrap();
        assert_eq!(samples_to_ismrmrd(&mrd, 4, 10).unwrap(), samples);
    }

    #[test]
    fn round_trip_is_identity_for_every_element_kind() {
        round_trip(|i| i as u16);
        round_trip(|i| -(i as i16));
        round_trip(|i| i as u32 * 7);
        round_trip(|i| i as i32 - 50);
        round_trip(|i| i as f32 * 0.5);
        round_trip(|i| i as f64 / 3.0);
        round_trip(|i| Complex32::new(i as f32, -(i as f32)));
        round_trip(|i| Complex64::new(0.25 * i as f64, i as f64));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = samples_to_mrd(&[0u16; 5], 3, 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 6, found: 5, .. }));
    }

    #[test]
    fn empty_payload() {
        let (mrd, dims) = samples_to_mrd::<Complex32>(&[], 0, 4).unwrap();
        assert!(mrd.is_empty());
        assert_eq!(dims.shape(), &[4, 0]);
    }
}
