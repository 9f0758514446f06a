use std::collections::BTreeMap;
use std::io::{Read, Write};

use num_complex::{Complex32, Complex64};

use super::binary::{mrd_enum, read_varint, record, write_varint, Decode, Encode};
use super::NdArray;
use crate::element::{Element, ElementKind};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodingCounters {
    pub kspace_encode_step_1: Option<u32>,
    pub kspace_encode_step_2: Option<u32>,
    pub average: Option<u32>,
    pub slice: Option<u32>,
    pub contrast: Option<u32>,
    pub phase: Option<u32>,
    pub repetition: Option<u32>,
    pub set: Option<u32>,
    pub segment: Option<u32>,
    pub user: Vec<u32>,
}

/// One readout. `data` is `(channel, sample)`; `trajectory` is `(dimension, sample)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Acquisition {
    pub flags: u64,
    pub idx: EncodingCounters,
    pub measurement_uid: u32,
    pub scan_counter: Option<u32>,
    pub acquisition_time_stamp: Option<u32>,
    pub physiology_time_stamp: Vec<u32>,
    pub channel_order: Vec<u32>,
    pub discard_pre: Option<u32>,
    pub discard_post: Option<u32>,
    pub center_sample: Option<u32>,
    pub encoding_space_ref: Option<u32>,
    pub sample_time_us: Option<f32>,
    pub position: [f32; 3],
    pub read_dir: [f32; 3],
    pub phase_dir: [f32; 3],
    pub slice_dir: [f32; 3],
    pub patient_table_position: [f32; 3],
    pub user_int: Vec<i32>,
    pub user_float: Vec<f32>,
    pub data: NdArray<Complex32>,
    pub trajectory: Option<NdArray<f32>>,
}

mrd_enum!(ImageType {
    Magnitude = 1,
    Phase = 2,
    Real = 3,
    Imag = 4,
    Complex = 5,
});

pub type ImageMeta = BTreeMap<String, Vec<String>>;

/// An image with voxels `(channel, z, y, x)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    pub flags: u64,
    pub measurement_uid: u32,
    pub field_of_view: [f32; 3],
    pub position: [f32; 3],
    pub col_dir: [f32; 3],
    pub line_dir: [f32; 3],
    pub slice_dir: [f32; 3],
    pub patient_table_position: [f32; 3],
    pub average: Option<u32>,
    pub slice: Option<u32>,
    pub contrast: Option<u32>,
    pub phase: Option<u32>,
    pub repetition: Option<u32>,
    pub set: Option<u32>,
    pub acquisition_time_stamp: Option<u32>,
    pub physiology_time_stamp: Vec<u32>,
    pub image_type: ImageType,
    pub image_index: Option<u32>,
    pub image_series_index: Option<u32>,
    pub user_int: Vec<i32>,
    pub user_float: Vec<f32>,
    pub data: NdArray<T>,
    pub meta: ImageMeta,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveform {
    pub flags: u64,
    pub measurement_uid: u32,
    pub scan_counter: u32,
    pub time_stamp: u32,
    pub sample_time_us: f32,
    pub waveform_id: u32,
    /// `(channel, sample)`
    pub data: NdArray<u32>,
}

record!(EncodingCounters {
    kspace_encode_step_1,
    kspace_encode_step_2,
    average,
    slice,
    contrast,
    phase,
    repetition,
    set,
    segment,
    user,
});

record!(Acquisition {
    flags,
    idx,
    measurement_uid,
    scan_counter,
    acquisition_time_stamp,
    physiology_time_stamp,
    channel_order,
    discard_pre,
    discard_post,
    center_sample,
    encoding_space_ref,
    sample_time_us,
    position,
    read_dir,
    phase_dir,
    slice_dir,
    patient_table_position,
    user_int,
    user_float,
    data,
    trajectory,
});

record!(Image<T: Element> {
    flags,
    measurement_uid,
    field_of_view,
    position,
    col_dir,
    line_dir,
    slice_dir,
    patient_table_position,
    average,
    slice,
    contrast,
    phase,
    repetition,
    set,
    acquisition_time_stamp,
    physiology_time_stamp,
    image_type,
    image_index,
    image_series_index,
    user_int,
    user_float,
    data,
    meta,
});

record!(Waveform {
    flags,
    measurement_uid,
    scan_counter,
    time_stamp,
    sample_time_us,
    waveform_id,
    data,
});

#[derive(Clone, Debug, PartialEq)]
pub enum AnyImage {
    U16(Image<u16>),
    I16(Image<i16>),
    U32(Image<u32>),
    I32(Image<i32>),
    F32(Image<f32>),
    F64(Image<f64>),
    Complex32(Image<Complex32>),
    Complex64(Image<Complex64>),
}

impl AnyImage {
    pub fn kind(&self) -> ElementKind {
        match self {
            AnyImage::U16(_) => ElementKind::U16,
            AnyImage::I16(_) => ElementKind::I16,
            AnyImage::U32(_) => ElementKind::U32,
            AnyImage::I32(_) => ElementKind::I32,
            AnyImage::F32(_) => ElementKind::F32,
            AnyImage::F64(_) => ElementKind::F64,
            AnyImage::Complex32(_) => ElementKind::Complex32,
            AnyImage::Complex64(_) => ElementKind::Complex64,
        }
    }
}

/// One element of the data step.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamItem {
    Acquisition(Acquisition),
    Waveform(Waveform),
    Image(AnyImage),
}

impl StreamItem {
    /// union case index on the wire: acquisition, waveform, then one image case per element kind
    pub fn case_index(&self) -> u64 {
        match self {
            StreamItem::Acquisition(_) => 0,
            StreamItem::Waveform(_) => 1,
            StreamItem::Image(im) => 2 + kind_index(im.kind()),
        }
    }
}

fn kind_index(kind: ElementKind) -> u64 {
    ElementKind::ALL.iter().position(|&k| k == kind).unwrap_or_default() as u64
}

impl Encode for StreamItem {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_varint(w, self.case_index())?;
        match self {
            StreamItem::Acquisition(acq) => acq.encode(w),
            StreamItem::Waveform(wav) => wav.encode(w),
            StreamItem::Image(AnyImage::U16(im)) => im.encode(w),
            StreamItem::Image(AnyImage::I16(im)) => im.encode(w),
            StreamItem::Image(AnyImage::U32(im)) => im.encode(w),
            StreamItem::Image(AnyImage::I32(im)) => im.encode(w),
            StreamItem::Image(AnyImage::F32(im)) => im.encode(w),
            StreamItem::Image(AnyImage::F64(im)) => im.encode(w),
            StreamItem::Image(AnyImage::Complex32(im)) => im.encode(w),
            StreamItem::Image(AnyImage::Complex64(im)) => im.encode(w),
        }
    }
}

impl Decode for StreamItem {
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let case = read_varint(r)?;
        let kind = case
            .checked_sub(2)
            .and_then(|i| ElementKind::ALL.get(i as usize).copied());
        Ok(match (case, kind) {
            (0, _) => StreamItem::Acquisition(Acquisition::decode(r)?),
            (1, _) => StreamItem::Waveform(Waveform::decode(r)?),
            (_, Some(kind)) => StreamItem::Image(decode_image(kind, r)?),
            (_, None) => return Err(Error::UnsupportedMessage(case, "MRD stream")),
        })
    }
}

fn decode_image<R: Read>(kind: ElementKind, r: &mut R) -> Result<AnyImage> {
    Ok(match kind {
        ElementKind::U16 => AnyImage::U16(Image::decode(r)?),
        ElementKind::I16 => AnyImage::I16(Image::decode(r)?),
        ElementKind::U32 => AnyImage::U32(Image::decode(r)?),
        ElementKind::I32 => AnyImage::I32(Image::decode(r)?),
        ElementKind::F32 => AnyImage::F32(Image::decode(r)?),
        ElementKind::F64 => AnyImage::F64(Image::decode(r)?),
        ElementKind::Complex32 => AnyImage::Complex32(Image::decode(r)?),
        ElementKind::Complex64 => AnyImage::Complex64(Image::decode(r)?),
    })
}
