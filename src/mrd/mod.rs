//! The MRD stream: a schema preamble, an optional header and a sequence of stream items.

use std::io::{Read, Write};

use crate::element::{read_elements, write_elements, Element};
use crate::error::{Error, Result};
use crate::{ArrayDim, N_DIMS};

pub mod binary;
pub mod header;
pub mod items;
pub mod protocol;

pub use binary::{Decode, Encode};
pub use header::*;
pub use items::*;
pub use protocol::{MrdReader, MrdWriter};

/// A dense row-major array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Element> NdArray<T> {
    pub fn new(shape: &[usize], data: Vec<T>) -> Result<Self> {
        if shape.len() > N_DIMS {
            return Err(Error::ShapeMismatch {
                what: "array rank",
                expected: N_DIMS,
                found: shape.len(),
            });
        }
        let numel = shape.iter().product();
        if data.len() != numel {
            return Err(Error::ShapeMismatch {
                what: "array elements",
                expected: numel,
                found: data.len(),
            });
        }
        Ok(NdArray {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn dims(&self) -> ArrayDim {
        ArrayDim::row_major(&self.shape)
    }

    /// the shape, failing unless the array has exactly `rank` axes
    pub fn shape_of_rank(&self, what: &'static str, rank: usize) -> Result<&[usize]> {
        if self.shape.len() != rank {
            return Err(Error::ShapeMismatch {
                what,
                expected: rank,
                found: self.shape.len(),
            });
        }
        Ok(&self.shape)
    }
}

impl<T: Element> Encode for NdArray<T> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        binary::write_len(w, self.shape.len())?;
        for &n in &self.shape {
            binary::write_len(w, n)?;
        }
        write_elements(w, &self.data)
    }
}

impl<T: Element> Decode for NdArray<T> {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let rank = binary::read_len(r)?;
        if rank > N_DIMS {
            return Err(Error::ShapeMismatch {
                what: "array rank",
                expected: N_DIMS,
                found: rank,
            });
        }
        let shape = (0..rank).map(|_| binary::read_len(r)).collect::<Result<Vec<_>>>()?;
        let numel = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(Error::Overflow {
                field: "array size",
                value: i128::MAX,
                target: "usize",
            })?;
        let data = read_elements(r, numel)?;
        Ok(NdArray { shape, data })
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex32;

    use super::*;

    #[test]
    fn array_encoding() {
        let a = NdArray::new(&[2, 1], vec![Complex32::new(1.0, 2.0), Complex32::new(3.0, 4.0)]).unwrap();
        let mut buf = vec![];
        a.encode(&mut buf).unwrap();
        assert_eq!(&buf[..3], &[2, 2, 1]);
        assert_eq!(&buf[3..7], &1.0f32.to_le_bytes());
        assert_eq!(buf.len(), 3 + 16);
        assert_eq!(NdArray::<Complex32>::decode(&mut buf.as_slice()).unwrap(), a);
    }

    #[test]
    fn array_shape_checks() {
        assert!(NdArray::new(&[2, 2], vec![0u16; 3]).is_err());
        assert!(NdArray::new(&[1, 1, 1, 1, 1], vec![0u16]).is_err());
        let a = NdArray::new(&[3], vec![0u32; 3]).unwrap();
        assert!(a.shape_of_rank("waveform data", 2).is_err());
        assert_eq!(a.shape_of_rank("waveform data", 1).unwrap(), &[3]);
        assert!(NdArray::<u16>::decode(&mut &[5u8][..]).is_err());
    }

    #[test]
    fn array_larger_than_input() {
        let mut buf = vec![2];
        binary::write_len(&mut buf, 1).unwrap();
        binary::write_len(&mut buf, 1 << 61).unwrap();
        assert!(matches!(
            NdArray::<Complex32>::decode(&mut buf.as_slice()),
            Err(Error::Overflow { .. })
        ));
        buf.extend_from_slice(&[0; 8]);
        assert!(matches!(NdArray::<u32>::decode(&mut buf.as_slice()), Err(Error::Io(_))));
    }
}
