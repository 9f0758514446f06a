use std::fmt::Debug;
use std::io::{self, Read, Write};

use bytemuck::Pod;
use num_complex::{Complex32, Complex64};
use num_traits::Zero;

use crate::error::{Error, Result};

/// The closed set of voxel element types shared by both formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    Complex32,
    Complex64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 8] = [
        ElementKind::U16,
        ElementKind::I16,
        ElementKind::U32,
        ElementKind::I32,
        ElementKind::F32,
        ElementKind::F64,
        ElementKind::Complex32,
        ElementKind::Complex64,
    ];

    /// `data_type` code in the ISMRMRD image header
    pub fn ismrmrd_code(self) -> u16 {
        match self {
            ElementKind::U16 => 1,
            ElementKind::I16 => 2,
            ElementKind::U32 => 3,
            ElementKind::I32 => 4,
            ElementKind::F32 => 5,
            ElementKind::F64 => 6,
            ElementKind::Complex32 => 7,
            ElementKind::Complex64 => 8,
        }
    }

    pub fn from_ismrmrd_code(code: u16) -> Result<ElementKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.ismrmrd_code() == code)
            .ok_or_else(|| Error::unknown("image data type", code))
    }
}

/// A voxel element type. Implemented exactly for the types listed in [`ElementKind`].
pub trait Element: Pod + Zero + PartialEq + Debug + sealed::Sealed {
    const KIND: ElementKind;
}

mod sealed {
    pub trait Sealed {}
}

/// Read exactly `n` bytes; the buffer grows only with the bytes actually read. Fewer than `n`
/// bytes left is `UnexpectedEof`.
pub fn read_bytes<R: Read>(reader: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![];
    reader.by_ref().take(n as u64).read_to_end(&mut bytes)?;
    if bytes.len() != n {
        let msg = format!("expected {n} bytes, found {}", bytes.len());
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, msg).into());
    }
    Ok(bytes)
}

/// read `n` elements stored back to back in little-endian byte order
pub fn read_elements<T: Pod, R: Read>(reader: &mut R, n: usize) -> Result<Vec<T>> {
    let size = size_of::<T>();
    let len = n.checked_mul(size).ok_or(Error::Overflow {
        field: "element count",
        value: n as i128,
        target: "usize",
    })?;
    let bytes = read_bytes(reader, len)?;
    Ok(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
}

/// write elements back to back in little-endian byte order
pub fn write_elements<T: Pod, W: Write>(writer: &mut W, data: &[T]) -> Result<()> {
    writer.write_all(bytemuck::cast_slice(data))?;
    Ok(())
}

macro_rules! element {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl Element for $t {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

element! {
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
    Complex32 => Complex32,
    Complex64 => Complex64,
}
