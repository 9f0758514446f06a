//! The legacy ISMRMRD stream: XML header, fixed-layout item headers and the message framing.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub mod acquisition;
pub mod header;
pub mod image;
pub mod meta;
pub mod protocol;
pub mod waveform;
pub mod xml;

pub use acquisition::{Acquisition, AcquisitionHeader, EncodingCounters};
pub use header::*;
pub use image::{AnyImage, Image, ImageHeader};
pub use meta::Meta;
pub use protocol::{MessageId, ProtocolReader, ProtocolWriter};
pub use waveform::{Waveform, WaveformHeader};

/// major version stamped into every item header written
pub const VERSION: u16 = 1;
pub const USER_INTS: usize = 8;
pub const USER_FLOATS: usize = 8;
pub const PHYSIOLOGY_TIME_STAMPS: usize = 3;
/// number of 64 bit words in the acquisition channel mask
pub const CHANNEL_MASKS: usize = 16;

// fixed-layout fields are little endian and packed

pub(crate) fn read_u16s<const N: usize, R: Read>(r: &mut R) -> io::Result<[u16; N]> {
    let mut v = [0; N];
    r.read_u16_into::<LittleEndian>(&mut v)?;
    Ok(v)
}

pub(crate) fn read_u32s<const N: usize, R: Read>(r: &mut R) -> io::Result<[u32; N]> {
    let mut v = [0; N];
    r.read_u32_into::<LittleEndian>(&mut v)?;
    Ok(v)
}

pub(crate) fn read_u64s<const N: usize, R: Read>(r: &mut R) -> io::Result<[u64; N]> {
    let mut v = [0; N];
    r.read_u64_into::<LittleEndian>(&mut v)?;
    Ok(v)
}

pub(crate) fn read_i32s<const N: usize, R: Read>(r: &mut R) -> io::Result<[i32; N]> {
    let mut v = [0; N];
    r.read_i32_into::<LittleEndian>(&mut v)?;
    Ok(v)
}

pub(crate) fn read_f32s<const N: usize, R: Read>(r: &mut R) -> io::Result<[f32; N]> {
    let mut v = [0.0; N];
    r.read_f32_into::<LittleEndian>(&mut v)?;
    Ok(v)
}

pub(crate) fn skip<R: Read>(r: &mut R, n: usize) -> io::Result<()> {
    let mut pad = [0u8; 8];
    r.read_exact(&mut pad[..n])
}

pub(crate) fn write_u16s<W: Write>(w: &mut W, values: &[u16]) -> io::Result<()> {
    values.iter().try_for_each(|&v| w.write_u16::<LittleEndian>(v))
}

pub(crate) fn write_u32s<W: Write>(w: &mut W, values: &[u32]) -> io::Result<()> {
    values.iter().try_for_each(|&v| w.write_u32::<LittleEndian>(v))
}

pub(crate) fn write_u64s<W: Write>(w: &mut W, values: &[u64]) -> io::Result<()> {
    values.iter().try_for_each(|&v| w.write_u64::<LittleEndian>(v))
}

pub(crate) fn write_i32s<W: Write>(w: &mut W, values: &[i32]) -> io::Result<()> {
    values.iter().try_for_each(|&v| w.write_i32::<LittleEndian>(v))
}

pub(crate) fn write_f32s<W: Write>(w: &mut W, values: &[f32]) -> io::Result<()> {
    values.iter().try_for_each(|&v| w.write_f32::<LittleEndian>(v))
}

pub(crate) fn pad<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    w.write_all(&[0u8; 8][..n])
}
