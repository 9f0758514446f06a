/*
    Converters between the legacy ISMRMRD raw-data stream and the MRD stream format.
    Payloads are addressed through ArrayDim, which knows both axis orders:
    ISMRMRD buffers are column-major (first index fastest), MRD arrays are row-major (last index fastest).
 */
// payloads are moved as raw bytes and both formats are little endian on the wire
#[cfg(target_endian = "big")]
compile_error!("mrd-convert only supports little-endian targets");

pub mod cli;
pub mod convert;
pub mod element;
pub mod error;
pub mod ismrmrd;
pub mod mrd;
pub mod pump;
pub mod transpose;

pub use element::{Element, ElementKind};
pub use error::{Error, Result};

/// maximum rank of any payload handled by the converters (channel, z, y, x)
pub const N_DIMS: usize = 4;


/// memory order of a multidimensional buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// first index varies fastest (ISMRMRD buffers)
    ColumnMajor,
    /// last index varies fastest (MRD arrays)
    RowMajor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayDim {
    rank: usize,
    shape: [usize; N_DIMS],
    strides: [usize; N_DIMS],
    layout: Layout,
}

impl ArrayDim {

    pub fn column_major(shape: &[usize]) -> ArrayDim {
        Self::from_shape(shape, Layout::ColumnMajor)
    }

    pub fn row_major(shape: &[usize]) -> ArrayDim {
        Self::from_shape(shape, Layout::RowMajor)
    }

    pub fn from_shape(shape: &[usize], layout: Layout) -> ArrayDim {
        assert!(shape.len() <= N_DIMS, "only arrays of up to {N_DIMS} dimensions are supported");

        let mut dims = [1; N_DIMS];
        let mut strides = [1; N_DIMS];

        for (d, s) in dims.iter_mut().zip(shape.iter()) {
            *d = *s;
        }

        Self::calc_strides(&dims[..shape.len()], layout, &mut strides[..shape.len()]);
        Self {
            rank: shape.len(),
            shape: dims,
            strides,
            layout,
        }
    }

    /// the shape of the array, one entry per axis
    pub fn shape(&self) -> &[usize] {
        &self.shape[..self.rank]
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn size(&self, dim: usize) -> usize {
        assert!(dim < self.rank);
        self.shape[dim]
    }

    pub fn numel(&self) -> usize {
        self.shape().iter().product()
    }

    fn calc_strides(dims: &[usize], layout: Layout, strides: &mut [usize]) {
        let mut stride = 1;
        match layout {
            Layout::ColumnMajor => {
                for (dim, s) in dims.iter().zip(strides.iter_mut()) {
                    *s = stride;
                    stride *= dim;
                }
            }
            Layout::RowMajor => {
                for (dim, s) in dims.iter().zip(strides.iter_mut()).rev() {
                    *s = stride;
                    stride *= dim;
                }
            }
        }
    }

    #[inline]
    /// calculate the element address from the index (subscripts)
    pub fn calc_addr(&self, idx: &[usize]) -> usize {
        let mut offset = 0;
        for (i, stride) in idx.iter().zip(self.strides.iter()) {
            offset += i * stride;
        }
        offset
    }

    #[inline]
    /// calculate the element index (subscript) from the address
    pub fn calc_idx(&self, addr: usize) -> [usize; N_DIMS] {
        debug_assert!(addr < self.numel(), "offset {} exceeds total number of elements {}", addr, self.numel());
        let mut addr = addr;
        let mut idx = [0usize; N_DIMS];
        match self.layout {
            Layout::ColumnMajor => {
                for k in 0..self.rank {
                    idx[k] = addr % self.shape[k];
                    addr /= self.shape[k];
                }
            }
            Layout::RowMajor => {
                for k in (0..self.rank).rev() {
                    idx[k] = addr % self.shape[k];
                    addr /= self.shape[k];
                }
            }
        }
        idx
    }

}
