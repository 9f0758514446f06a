use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::acquisition::check_len;
use super::*;
use crate::element::{read_elements, write_elements};
use crate::error::Result;

/// The 40 byte waveform header. Unlike the other item headers it keeps its natural alignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveformHeader {
    pub version: u16,
    pub flags: u64,
    pub measurement_uid: u32,
    pub scan_counter: u32,
    pub time_stamp: u32,
    pub number_of_samples: u16,
    pub channels: u16,
    pub sample_time_us: f32,
    pub waveform_id: u16,
}

impl WaveformHeader {
    pub const SIZE: usize = 40;

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let version = r.read_u16::<LittleEndian>()?;
        skip(r, 6)?;
        let flags = r.read_u64::<LittleEndian>()?;
        let [measurement_uid, scan_counter, time_stamp] = read_u32s(r)?;
        let [number_of_samples, channels] = read_u16s(r)?;
        let sample_time_us = r.read_f32::<LittleEndian>()?;
        let waveform_id = r.read_u16::<LittleEndian>()?;
        skip(r, 2)?;
        Ok(WaveformHeader {
            version,
            flags,
            measurement_uid,
            scan_counter,
            time_stamp,
            number_of_samples,
            channels,
            sample_time_us,
            waveform_id,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<LittleEndian>(self.version)?;
        pad(w, 6)?;
        w.write_u64::<LittleEndian>(self.flags)?;
        write_u32s(w, &[self.measurement_uid, self.scan_counter, self.time_stamp])?;
        write_u16s(w, &[self.number_of_samples, self.channels])?;
        w.write_f32::<LittleEndian>(self.sample_time_us)?;
        w.write_u16::<LittleEndian>(self.waveform_id)?;
        pad(w, 2)?;
        Ok(())
    }

    pub fn data_len(&self) -> usize {
        self.number_of_samples as usize * self.channels as usize
    }
}

/// A physiological or gradient waveform; `data` is `(sample, channel)`, sample varying fastest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveform {
    pub head: WaveformHeader,
    pub data: Vec<u32>,
}

impl Waveform {
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let head = WaveformHeader::read(r)?;
        let data = read_elements(r, head.data_len())?;
        Ok(Waveform { head, data })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        check_len("waveform data", self.head.data_len(), self.data.len())?;
        self.head.write(w)?;
        write_elements(w, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let head = WaveformHeader {
            version: 1,
            flags: 3,
            number_of_samples: 5,
            channels: 2,
            waveform_id: 0x0a0b,
            ..Default::default()
        };
        let mut buf = vec![];
        head.write(&mut buf).unwrap();
        assert_eq!(buf.len(), WaveformHeader::SIZE);
        assert_eq!(&buf[8..10], &[3, 0]);
        assert_eq!(&buf[28..32], &[5, 0, 2, 0]);
        assert_eq!(&buf[36..40], &[0x0b, 0x0a, 0, 0]);
        assert_eq!(WaveformHeader::read(&mut buf.as_slice()).unwrap(), head);
    }

    #[test]
    fn waveform_message_body() {
        let wav = Waveform {
            head: WaveformHeader {
                number_of_samples: 4,
                channels: 3,
                ..Default::default()
            },
            data: (0..12).collect(),
        };
        let mut buf = vec![];
        wav.write(&mut buf).unwrap();
        assert_eq!(buf.len(), WaveformHeader::SIZE + 12 * 4);
        assert_eq!(Waveform::read(&mut buf.as_slice()).unwrap(), wav);
    }
}
