use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_complex::{Complex32, Complex64};

use super::acquisition::check_len;
use super::*;
use crate::element::{read_bytes, read_elements, write_elements, Element, ElementKind};
use crate::error::{Error, Result};

/// The packed 198 byte image header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageHeader {
    pub version: u16,
    /// element type code, see [`ElementKind::ismrmrd_code`]
    pub data_type: u16,
    pub flags: u64,
    pub measurement_uid: u32,
    pub matrix_size: [u16; 3],
    pub field_of_view: [f32; 3],
    pub channels: u16,
    pub position: [f32; 3],
    pub read_dir: [f32; 3],
    pub phase_dir: [f32; 3],
    pub slice_dir: [f32; 3],
    pub patient_table_position: [f32; 3],
    pub average: u16,
    pub slice: u16,
    pub contrast: u16,
    pub phase: u16,
    pub repetition: u16,
    pub set: u16,
    pub acquisition_time_stamp: u32,
    pub physiology_time_stamp: [u32; PHYSIOLOGY_TIME_STAMPS],
    /// 1 magnitude, 2 phase, 3 real, 4 imaginary, 5 complex
    pub image_type: u16,
    pub image_index: u16,
    pub image_series_index: u16,
    pub user_int: [i32; USER_INTS],
    pub user_float: [f32; USER_FLOATS],
    pub attribute_string_len: u32,
}

impl ImageHeader {
    pub const SIZE: usize = 198;

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let version = r.read_u16::<LittleEndian>()?;
        let data_type = r.read_u16::<LittleEndian>()?;
        let flags = r.read_u64::<LittleEndian>()?;
        let measurement_uid = r.read_u32::<LittleEndian>()?;
        let matrix_size = read_u16s(r)?;
        let field_of_view = read_f32s(r)?;
        let channels = r.read_u16::<LittleEndian>()?;
        let position = read_f32s(r)?;
        let read_dir = read_f32s(r)?;
        let phase_dir = read_f32s(r)?;
        let slice_dir = read_f32s(r)?;
        let patient_table_position = read_f32s(r)?;
        let [average, slice, contrast, phase, repetition, set] = read_u16s(r)?;
        let acquisition_time_stamp = r.read_u32::<LittleEndian>()?;
        let physiology_time_stamp = read_u32s(r)?;
        let [image_type, image_index, image_series_index] = read_u16s(r)?;
        Ok(ImageHeader {
            version,
            data_type,
            flags,
            measurement_uid,
            matrix_size,
            field_of_view,
            channels,
            position,
            read_dir,
            phase_dir,
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
            user_int: read_i32s(r)?,
            user_float: read_f32s(r)?,
            attribute_string_len: r.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u16s(w, &[self.version, self.data_type])?;
        w.write_u64::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.measurement_uid)?;
        write_u16s(w, &self.matrix_size)?;
        write_f32s(w, &self.field_of_view)?;
        w.write_u16::<LittleEndian>(self.channels)?;
        for v in [
            &self.position,
            &self.read_dir,
            &self.phase_dir,
            &self.slice_dir,
            &self.patient_table_position,
        ] {
            write_f32s(w, v)?;
        }
        write_u16s(
            w,
            &[self.average, self.slice, self.contrast, self.phase, self.repetition, self.set],
        )?;
        w.write_u32::<LittleEndian>(self.acquisition_time_stamp)?;
        write_u32s(w, &self.physiology_time_stamp)?;
        write_u16s(w, &[self.image_type, self.image_index, self.image_series_index])?;
        write_i32s(w, &self.user_int)?;
        write_f32s(w, &self.user_float)?;
        w.write_u32::<LittleEndian>(self.attribute_string_len)?;
        Ok(())
    }

    /// number of voxels over all channels
    pub fn data_len(&self) -> usize {
        self.matrix_size.iter().map(|&n| n as usize).product::<usize>() * self.channels as usize
    }
}

/// An image with voxels `(x, y, z, channel)`, x varying fastest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image<T> {
    pub head: ImageHeader,
    /// `ismrmrdMeta` XML, possibly empty
    pub attribute_string: String,
    pub data: Vec<T>,
}

impl<T: Element> Image<T> {
    fn read_body<R: Read>(head: ImageHeader, r: &mut R) -> Result<Self> {
        let len = r.read_u64::<LittleEndian>()?;
        let len = usize::try_from(len).map_err(|_| Error::Overflow {
            field: "attribute string length",
            value: len.into(),
            target: "usize",
        })?;
        let bytes = read_bytes(r, len)?;
        let attribute_string =
            String::from_utf8(bytes).map_err(|e| Error::MalformedXml(e.to_string()))?;
        let data = read_elements(r, head.data_len())?;
        Ok(Image { head, attribute_string, data })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        check_len("image data", self.head.data_len(), self.data.len())?;
        check_len(
            "image attribute string",
            self.head.attribute_string_len as usize,
            self.attribute_string.len(),
        )?;
        if self.head.data_type != T::KIND.ismrmrd_code() {
            return Err(Error::unknown("image data type", self.head.data_type));
        }
        self.head.write(w)?;
        w.write_u64::<LittleEndian>(self.attribute_string.len() as u64)?;
        w.write_all(self.attribute_string.as_bytes())?;
        write_elements(w, &self.data)
    }
}

/// An image of any of the supported element types.
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
    /// read one image, dispatching on the header's data type
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let head = ImageHeader::read(r)?;
        Ok(match ElementKind::from_ismrmrd_code(head.data_type)? {
            ElementKind::U16 => AnyImage::U16(Image::read_body(head, r)?),
            ElementKind::I16 => AnyImage::I16(Image::read_body(head, r)?),
            ElementKind::U32 => AnyImage::U32(Image::read_body(head, r)?),
            ElementKind::I32 => AnyImage::I32(Image::read_body(head, r)?),
            ElementKind::F32 => AnyImage::F32(Image::read_body(head, r)?),
            ElementKind::F64 => AnyImage::F64(Image::read_body(head, r)?),
            ElementKind::Complex32 => AnyImage::Complex32(Image::read_body(head, r)?),
            ElementKind::Complex64 => AnyImage::Complex64(Image::read_body(head, r)?),
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            AnyImage::U16(im) => im.write(w),
            AnyImage::I16(im) => im.write(w),
            AnyImage::U32(im) => im.write(w),
            AnyImage::I32(im) => im.write(w),
            AnyImage::F32(im) => im.write(w),
            AnyImage::F64(im) => im.write(w),
            AnyImage::Complex32(im) => im.write(w),
            AnyImage::Complex64(im) => im.write(w),
        }
    }

    pub fn head(&self) -> &ImageHeader {
        match self {
            AnyImage::U16(im) => &im.head,
            AnyImage::I16(im) => &im.head,
            AnyImage::U32(im) => &im.head,
            AnyImage::I32(im) => &im.head,
            AnyImage::F32(im) => &im.head,
            AnyImage::F64(im) => &im.head,
            AnyImage::Complex32(im) => &im.head,
            AnyImage::Complex64(im) => &im.head,
        }
    }
}
