//! Compact binary encoding of MRD values.
//!
//! Unsigned integers are LEB128 varints, signed integers zig-zag varints, floats little-endian
//! IEEE. Strings and vectors carry a varint length, optionals a presence byte, enums and union
//! tags their varint code. Dates are days since 1970-01-01 and times nanoseconds since midnight,
//! both as signed varints. N-dimensional arrays are their rank and shape followed by the
//! row-major elements as raw little-endian bytes.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{NaiveDate, NaiveTime, TimeDelta, Timelike};
use num_complex::Complex;

use crate::element::read_bytes;
use crate::error::{Error, Result};

pub trait Encode {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()>;
}

pub trait Decode: Sized {
    fn decode<R: Read>(r: &mut R) -> Result<Self>;
}

pub fn write_varint<W: Write>(w: &mut W, mut value: u64) -> Result<()> {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            w.write_u8(byte)?;
            return Ok(());
        }
        w.write_u8(byte | 0x80)?;
    }
}

pub fn read_varint<R: Read>(r: &mut R) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0;
    loop {
        let byte = r.read_u8()?;
        if shift > 63 || (shift == 63 && byte > 1) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "varint exceeds 64 bits").into());
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

pub fn write_signed<W: Write>(w: &mut W, value: i64) -> Result<()> {
    write_varint(w, ((value << 1) ^ (value >> 63)) as u64)
}

pub fn read_signed<R: Read>(r: &mut R) -> Result<i64> {
    let u = read_varint(r)?;
    Ok((u >> 1) as i64 ^ -((u & 1) as i64))
}

pub fn write_len<W: Write>(w: &mut W, len: usize) -> Result<()> {
    write_varint(w, len as u64)
}

pub fn read_len<R: Read>(r: &mut R) -> Result<usize> {
    let len = read_varint(r)?;
    usize::try_from(len).map_err(|_| Error::Overflow {
        field: "length",
        value: len.into(),
        target: "usize",
    })
}

macro_rules! unsigned {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
                    write_varint(w, u64::from(*self))
                }
            }
            impl Decode for $t {
                fn decode<R: Read>(r: &mut R) -> Result<Self> {
                    crate::error::narrow(stringify!($t), read_varint(r)?)
                }
            }
        )*
    };
}

macro_rules! signed {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
                    write_signed(w, i64::from(*self))
                }
            }
            impl Decode for $t {
                fn decode<R: Read>(r: &mut R) -> Result<Self> {
                    crate::error::narrow(stringify!($t), read_signed(r)?)
                }
            }
        )*
    };
}

unsigned!(u16, u32, u64);
signed!(i32, i64);

impl Encode for f32 {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        Ok(w.write_f32::<LittleEndian>(*self)?)
    }
}

impl Decode for f32 {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        Ok(r.read_f32::<LittleEndian>()?)
    }
}

impl Encode for f64 {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        Ok(w.write_f64::<LittleEndian>(*self)?)
    }
}

impl Decode for f64 {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        Ok(r.read_f64::<LittleEndian>()?)
    }
}

impl<T: Encode> Encode for Complex<T> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        self.re.encode(w)?;
        self.im.encode(w)
    }
}

impl<T: Decode> Decode for Complex<T> {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Complex::new(T::decode(r)?, T::decode(r)?))
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_len(w, self.len())?;
        Ok(w.write_all(self.as_bytes())?)
    }
}

impl Decode for String {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_len(r)?;
        let bytes = read_bytes(r, len)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            None => Ok(w.write_u8(0)?),
            Some(v) => {
                w.write_u8(1)?;
                v.encode(w)
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        match r.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(r)?)),
            b => Err(io::Error::new(io::ErrorKind::InvalidData, format!("invalid optional tag {b}")).into()),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_len(w, self.len())?;
        self.iter().try_for_each(|v| v.encode(w))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_len(r)?;
        (0..len).map(|_| T::decode(r)).collect()
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        self.iter().try_for_each(|v| v.encode(w))
    }
}

impl<T: Decode + Default + Copy, const N: usize> Decode for [T; N] {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let mut out = [T::default(); N];
        for v in out.iter_mut() {
            *v = T::decode(r)?;
        }
        Ok(out)
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_len(w, self.len())?;
        for (k, v) in self {
            k.encode(w)?;
            v.encode(w)?;
        }
        Ok(())
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_len(r)?;
        (0..len)
            .map(|_| -> Result<(K, V)> { Ok((K::decode(r)?, V::decode(r)?)) })
            .collect()
    }
}

impl Encode for NaiveDate {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_signed(w, self.signed_duration_since(NaiveDate::default()).num_days())
    }
}

impl Decode for NaiveDate {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let days = read_signed(r)?;
        TimeDelta::try_days(days)
            .and_then(|d| NaiveDate::default().checked_add_signed(d))
            .ok_or_else(|| Error::InvalidDate(format!("{days} days from epoch")))
    }
}

const NANOS_PER_SECOND: i64 = 1_000_000_000;

impl Encode for NaiveTime {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        let nanos = i64::from(self.num_seconds_from_midnight()) * NANOS_PER_SECOND + i64::from(self.nanosecond());
        write_signed(w, nanos)
    }
}

impl Decode for NaiveTime {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let nanos = read_signed(r)?;
        let secs = u32::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok();
        let frac = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
        secs.and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, frac))
            .ok_or_else(|| Error::InvalidTime(format!("{nanos} ns after midnight")))
    }
}

/// Implements [`Encode`] and [`Decode`] for a struct, encoding the listed fields in order.
macro_rules! record {
    ($name:ident $(<$g:ident : $bound:path>)? { $($field:ident),* $(,)? }) => {
        impl$(<$g: $bound>)? $crate::mrd::binary::Encode for $name$(<$g>)? {
            fn encode<W: std::io::Write>(&self, w: &mut W) -> $crate::error::Result<()> {
                $( $crate::mrd::binary::Encode::encode(&self.$field, w)?; )*
                Ok(())
            }
        }
        impl$(<$g: $bound>)? $crate::mrd::binary::Decode for $name$(<$g>)? {
            fn decode<R: std::io::Read>(r: &mut R) -> $crate::error::Result<Self> {
                Ok($name {
                    $( $field: $crate::mrd::binary::Decode::decode(r)?, )*
                })
            }
        }
    };
}

/// Declares an enum with fixed integer codes that encodes as its code.
macro_rules! mrd_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $code),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::mrd::binary::Encode for $name {
            fn encode<W: std::io::Write>(&self, w: &mut W) -> $crate::error::Result<()> {
                $crate::mrd::binary::write_varint(w, *self as u64)
            }
        }

        impl $crate::mrd::binary::Decode for $name {
            fn decode<R: std::io::Read>(r: &mut R) -> $crate::error::Result<Self> {
                let code = $crate::mrd::binary::read_varint(r)?;
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| *v as u64 == code)
                    .ok_or_else(|| $crate::error::Error::unknown(stringify!($name), code))
            }
        }
    };
}

pub(crate) use {mrd_enum, record};
