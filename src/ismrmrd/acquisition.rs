use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_complex::Complex32;

use super::*;
use crate::element::{read_elements, write_elements};
use crate::error::{Error, Result};

/// Position of an acquisition along every encoding dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodingCounters {
    pub kspace_encode_step_1: u16,
    pub kspace_encode_step_2: u16,
    pub average: u16,
    pub slice: u16,
    pub contrast: u16,
    pub phase: u16,
    pub repetition: u16,
    pub set: u16,
    pub segment: u16,
    pub user: [u16; USER_LIMITS],
}

/// The packed 340 byte acquisition header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AcquisitionHeader {
    pub version: u16,
    pub flags: u64,
    pub measurement_uid: u32,
    pub scan_counter: u32,
    pub acquisition_time_stamp: u32,
    pub physiology_time_stamp: [u32; PHYSIOLOGY_TIME_STAMPS],
    pub number_of_samples: u16,
    pub available_channels: u16,
    pub active_channels: u16,
    pub channel_mask: [u64; CHANNEL_MASKS],
    pub discard_pre: u16,
    pub discard_post: u16,
    pub center_sample: u16,
    pub encoding_space_ref: u16,
    pub trajectory_dimensions: u16,
    pub sample_time_us: f32,
    pub position: [f32; 3],
    pub read_dir: [f32; 3],
    pub phase_dir: [f32; 3],
    pub slice_dir: [f32; 3],
    pub patient_table_position: [f32; 3],
    pub idx: EncodingCounters,
    pub user_int: [i32; USER_INTS],
    pub user_float: [f32; USER_FLOATS],
}

impl AcquisitionHeader {
    pub const SIZE: usize = 340;

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        Ok(AcquisitionHeader {
            version: r.read_u16::<LittleEndian>()?,
            flags: r.read_u64::<LittleEndian>()?,
            measurement_uid: r.read_u32::<LittleEndian>()?,
            scan_counter: r.read_u32::<LittleEndian>()?,
            acquisition_time_stamp: r.read_u32::<LittleEndian>()?,
            physiology_time_stamp: read_u32s(r)?,
            number_of_samples: r.read_u16::<LittleEndian>()?,
            available_channels: r.read_u16::<LittleEndian>()?,
            active_channels: r.read_u16::<LittleEndian>()?,
            channel_mask: read_u64s(r)?,
            discard_pre: r.read_u16::<LittleEndian>()?,
            discard_post: r.read_u16::<LittleEndian>()?,
            center_sample: r.read_u16::<LittleEndian>()?,
            encoding_space_ref: r.read_u16::<LittleEndian>()?,
            trajectory_dimensions: r.read_u16::<LittleEndian>()?,
            sample_time_us: r.read_f32::<LittleEndian>()?,
            position: read_f32s(r)?,
            read_dir: read_f32s(r)?,
            phase_dir: read_f32s(r)?,
            slice_dir: read_f32s(r)?,
            patient_table_position: read_f32s(r)?,
            idx: {
                let [e1, e2, average, slice, contrast, phase, repetition, set, segment] = read_u16s(r)?;
                EncodingCounters {
                    kspace_encode_step_1: e1,
                    kspace_encode_step_2: e2,
                    average,
                    slice,
                    contrast,
                    phase,
                    repetition,
                    set,
                    segment,
                    user: read_u16s(r)?,
                }
            },
            user_int: read_i32s(r)?,
            user_float: read_f32s(r)?,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<LittleEndian>(self.version)?;
        w.write_u64::<LittleEndian>(self.flags)?;
        write_u32s(w, &[self.measurement_uid, self.scan_counter, self.acquisition_time_stamp])?;
        write_u32s(w, &self.physiology_time_stamp)?;
        write_u16s(w, &[self.number_of_samples, self.available_channels, self.active_channels])?;
        write_u64s(w, &self.channel_mask)?;
        write_u16s(
            w,
            &[
                self.discard_pre,
                self.discard_post,
                self.center_sample,
                self.encoding_space_ref,
                self.trajectory_dimensions,
            ],
        )?;
        w.write_f32::<LittleEndian>(self.sample_time_us)?;
        for v in [
            &self.position,
            &self.read_dir,
            &self.phase_dir,
            &self.slice_dir,
            &self.patient_table_position,
        ] {
            write_f32s(w, v)?;
        }
        let idx = &self.idx;
        write_u16s(
            w,
            &[
                idx.kspace_encode_step_1,
                idx.kspace_encode_step_2,
                idx.average,
                idx.slice,
                idx.contrast,
                idx.phase,
                idx.repetition,
                idx.set,
                idx.segment,
            ],
        )?;
        write_u16s(w, &idx.user)?;
        write_i32s(w, &self.user_int)?;
        write_f32s(w, &self.user_float)?;
        Ok(())
    }

    pub fn traj_len(&self) -> usize {
        self.trajectory_dimensions as usize * self.number_of_samples as usize
    }

    pub fn data_len(&self) -> usize {
        self.number_of_samples as usize * self.active_channels as usize
    }
}

/// One readout. `traj` is `(dimension, sample)` and `data` is `(sample, channel)`, both with the
/// first index varying fastest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Acquisition {
    pub head: AcquisitionHeader,
    pub traj: Vec<f32>,
    pub data: Vec<Complex32>,
}

impl Acquisition {
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let head = AcquisitionHeader::read(r)?;
        let traj = read_elements(r, head.traj_len())?;
        let data = read_elements(r, head.data_len())?;
        Ok(Acquisition { head, traj, data })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        check_len("acquisition trajectory", self.head.traj_len(), self.traj.len())?;
        check_len("acquisition data", self.head.data_len(), self.data.len())?;
        self.head.write(w)?;
        write_elements(w, &self.traj)?;
        write_elements(w, &self.data)
    }
}

pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ShapeMismatch { what, expected, found });
    }
    Ok(())
}
