//! Stream items: acquisitions, images of every element type, and waveforms.

use super::counters::{counters_to_ismrmrd, counters_to_mrd};
use super::enums::IMAGE_TYPE;
use crate::element::Element;
use crate::error::{check_capacity, narrow, Error, Result};
use crate::ismrmrd::meta::{parse_meta, serialize_meta};
use crate::ismrmrd::{self, CHANNEL_MASKS, PHYSIOLOGY_TIME_STAMPS, USER_FLOATS, USER_INTS};
use crate::mrd::{self, NdArray};
use crate::transpose::*;

/// channels whose bit is set in the legacy channel mask, in ascending order
pub fn channel_order_from_mask(mask: &[u64; CHANNEL_MASKS]) -> Vec<u32> {
    (0..CHANNEL_MASKS * 64)
        .filter(|&c| (mask[c / 64] >> (c % 64)) & 1 == 1)
        .map(|c| c as u32)
        .collect()
}

/// Legacy channel mask for an MRD channel order. The mask can only describe data rows in ascending
/// channel order, so any other order is rejected.
pub fn channel_mask_from_order(order: &[u32]) -> Result<[u64; CHANNEL_MASKS]> {
    if let Some(pair) = order.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::InvalidValue {
            element: "channelOrder".to_string(),
            value: format!("channel {} after channel {}", pair[1], pair[0]),
        });
    }
    let mut mask = [0u64; CHANNEL_MASKS];
    for &c in order {
        let word = mask.get_mut(c as usize / 64).ok_or_else(|| Error::Overflow {
            field: "channel order",
            value: c.into(),
            target: "channel mask",
        })?;
        *word |= 1 << (c % 64);
    }
    Ok(mask)
}

/// copy a list into a fixed block of slots, zero filling the rest
fn fill<T: Copy + Default, const N: usize>(field: &'static str, values: &[T]) -> Result<[T; N]> {
    check_capacity(field, values.len(), N)?;
    let mut out = [T::default(); N];
    out[..values.len()].copy_from_slice(values);
    Ok(out)
}

fn optional_u16(field: &'static str, value: Option<u32>) -> Result<u16> {
    narrow(field, value.unwrap_or(0))
}

pub fn acquisition_to_mrd(acq: &ismrmrd::Acquisition) -> Result<mrd::Acquisition> {
    let head = &acq.head;
    let samples = head.number_of_samples as usize;
    let (data, dims) = samples_to_mrd(&acq.data, samples, head.active_channels as usize)?;
    let trajectory = match head.trajectory_dimensions {
        0 => None,
        d => {
            let (traj, dims) = trajectory_to_mrd(&acq.traj, d as usize, samples)?;
            Some(NdArray::new(dims.shape(), traj)?)
        }
    };
    Ok(mrd::Acquisition {
        flags: head.flags,
        idx: counters_to_mrd(&head.idx),
        measurement_uid: head.measurement_uid,
        scan_counter: Some(head.scan_counter),
        acquisition_time_stamp: Some(head.acquisition_time_stamp),
        physiology_time_stamp: head.physiology_time_stamp.to_vec(),
        channel_order: channel_order_from_mask(&head.channel_mask),
        discard_pre: Some(head.discard_pre.into()),
        discard_post: Some(head.discard_post.into()),
        center_sample: Some(head.center_sample.into()),
        encoding_space_ref: Some(head.encoding_space_ref.into()),
        sample_time_us: Some(head.sample_time_us),
        position: head.position,
        read_dir: head.read_dir,
        phase_dir: head.phase_dir,
        slice_dir: head.slice_dir,
        patient_table_position: head.patient_table_position,
        user_int: head.user_int.to_vec(),
        user_float: head.user_float.to_vec(),
        data: NdArray::new(dims.shape(), data)?,
        trajectory,
    })
}

pub fn acquisition_to_ismrmrd(acq: &mrd::Acquisition) -> Result<ismrmrd::Acquisition> {
    let shape = acq.data.shape_of_rank("acquisition data rank", 2)?;
    let [channels, samples] = [shape[0], shape[1]];
    let (trajectory_dimensions, traj) = match &acq.trajectory {
        None => (0, vec![]),
        Some(t) => {
            let shape = t.shape_of_rank("trajectory rank", 2)?;
            let [dims, traj_samples] = [shape[0], shape[1]];
            if traj_samples != samples {
                return Err(Error::ShapeMismatch {
                    what: "trajectory samples",
                    expected: samples,
                    found: traj_samples,
                });
            }
            (dims, trajectory_to_ismrmrd(t.data(), dims, samples)?)
        }
    };
    let channels_u16 = narrow("active channels", channels as u64)?;
    let head = ismrmrd::AcquisitionHeader {
        version: ismrmrd::VERSION,
        flags: acq.flags,
        measurement_uid: acq.measurement_uid,
        scan_counter: acq.scan_counter.unwrap_or(0),
        acquisition_time_stamp: acq.acquisition_time_stamp.unwrap_or(0),
        physiology_time_stamp: fill::<_, PHYSIOLOGY_TIME_STAMPS>("physiology time stamps", &acq.physiology_time_stamp)?,
        number_of_samples: narrow("number of samples", samples as u64)?,
        available_channels: channels_u16,
        active_channels: channels_u16,
        channel_mask: channel_mask_from_order(&acq.channel_order)?,
        discard_pre: optional_u16("discard pre", acq.discard_pre)?,
        discard_post: optional_u16("discard post", acq.discard_post)?,
        center_sample: optional_u16("center sample", acq.center_sample)?,
        encoding_space_ref: optional_u16("encoding space ref", acq.encoding_space_ref)?,
        trajectory_dimensions: narrow("trajectory dimensions", trajectory_dimensions as u64)?,
        sample_time_us: acq.sample_time_us.unwrap_or(0.0),
        position: acq.position,
        read_dir: acq.read_dir,
        phase_dir: acq.phase_dir,
        slice_dir: acq.slice_dir,
        patient_table_position: acq.patient_table_position,
        idx: counters_to_ismrmrd(&acq.idx)?,
        user_int: fill::<_, USER_INTS>("user ints", &acq.user_int)?,
        user_float: fill::<_, USER_FLOATS>("user floats", &acq.user_float)?,
    };
    Ok(ismrmrd::Acquisition {
        head,
        traj,
        data: samples_to_ismrmrd(acq.data.data(), channels, samples)?,
    })
}

pub fn image_to_mrd<T: Element>(im: &ismrmrd::Image<T>) -> Result<mrd::Image<T>> {
    let head = &im.head;
    let [x, y, z] = head.matrix_size.map(usize::from);
    let (data, dims) = voxels_to_mrd(&im.data, [x, y, z], head.channels as usize)?;
    Ok(mrd::Image {
        flags: head.flags,
        measurement_uid: head.measurement_uid,
        field_of_view: head.field_of_view,
        position: head.position,
        col_dir: head.read_dir,
        line_dir: head.phase_dir,
        slice_dir: head.slice_dir,
        patient_table_position: head.patient_table_position,
        average: Some(head.average.into()),
        slice: Some(head.slice.into()),
        contrast: Some(head.contrast.into()),
        phase: Some(head.phase.into()),
        repetition: Some(head.repetition.into()),
        set: Some(head.set.into()),
        acquisition_time_stamp: Some(head.acquisition_time_stamp),
        physiology_time_stamp: head.physiology_time_stamp.to_vec(),
        image_type: IMAGE_TYPE.to_mrd(&head.image_type)?,
        image_index: Some(head.image_index.into()),
        image_series_index: Some(head.image_series_index.into()),
        user_int: head.user_int.to_vec(),
        user_float: head.user_float.to_vec(),
        data: NdArray::new(dims.shape(), data)?,
        meta: parse_meta(&im.attribute_string)?,
    })
}

pub fn image_to_ismrmrd<T: Element>(im: &mrd::Image<T>) -> Result<ismrmrd::Image<T>> {
    let shape = im.data.shape_of_rank("image data rank", 4)?;
    let [channels, z, y, x] = [shape[0], shape[1], shape[2], shape[3]];
    let attribute_string = serialize_meta(&im.meta)?;
    let head = ismrmrd::ImageHeader {
        version: ismrmrd::VERSION,
        data_type: T::KIND.ismrmrd_code(),
        flags: im.flags,
        measurement_uid: im.measurement_uid,
        matrix_size: [
            narrow("matrix size x", x as u64)?,
            narrow("matrix size y", y as u64)?,
            narrow("matrix size z", z as u64)?,
        ],
        field_of_view: im.field_of_view,
        channels: narrow("image channels", channels as u64)?,
        position: im.position,
        read_dir: im.col_dir,
        phase_dir: im.line_dir,
        slice_dir: im.slice_dir,
        patient_table_position: im.patient_table_position,
        average: optional_u16("average", im.average)?,
        slice: optional_u16("slice", im.slice)?,
        contrast: optional_u16("contrast", im.contrast)?,
        phase: optional_u16("phase", im.phase)?,
        repetition: optional_u16("repetition", im.repetition)?,
        set: optional_u16("set", im.set)?,
        acquisition_time_stamp: im.acquisition_time_stamp.unwrap_or(0),
        physiology_time_stamp: fill::<_, PHYSIOLOGY_TIME_STAMPS>("physiology time stamps", &im.physiology_time_stamp)?,
        image_type: IMAGE_TYPE.to_ismrmrd(im.image_type)?,
        image_index: optional_u16("image index", im.image_index)?,
        image_series_index: optional_u16("image series index", im.image_series_index)?,
        user_int: fill::<_, USER_INTS>("user ints", &im.user_int)?,
        user_float: fill::<_, USER_FLOATS>("user floats", &im.user_float)?,
        attribute_string_len: narrow("attribute string length", attribute_string.len() as u64)?,
    };
    Ok(ismrmrd::Image {
        head,
        attribute_string,
        data: voxels_to_ismrmrd(im.data.data(), im.data.dims())?,
    })
}

pub fn any_image_to_mrd(im: &ismrmrd::AnyImage) -> Result<mrd::AnyImage> {
    use ismrmrd::AnyImage as Legacy;
    Ok(match im {
        Legacy::U16(im) => mrd::AnyImage::U16(image_to_mrd(im)?),
        Legacy::I16(im) => mrd::AnyImage::I16(image_to_mrd(im)?),
        Legacy::U32(im) => mrd::AnyImage::U32(image_to_mrd(im)?),
        Legacy::I32(im) => mrd::AnyImage::I32(image_to_mrd(im)?),
        Legacy::F32(im) => mrd::AnyImage::F32(image_to_mrd(im)?),
        Legacy::F64(im) => mrd::AnyImage::F64(image_to_mrd(im)?),
        Legacy::Complex32(im) => mrd::AnyImage::Complex32(image_to_mrd(im)?),
        Legacy::Complex64(im) => mrd::AnyImage::Complex64(image_to_mrd(im)?),
    })
}

pub fn any_image_to_ismrmrd(im: &mrd::AnyImage) -> Result<ismrmrd::AnyImage> {
    use ismrmrd::AnyImage as Legacy;
    Ok(match im {
        mrd::AnyImage::U16(im) => Legacy::U16(image_to_ismrmrd(im)?),
        mrd::AnyImage::I16(im) => Legacy::I16(image_to_ismrmrd(im)?),
        mrd::AnyImage::U32(im) => Legacy::U32(image_to_ismrmrd(im)?),
        mrd::AnyImage::I32(im) => Legacy::I32(image_to_ismrmrd(im)?),
        mrd::AnyImage::F32(im) => Legacy::F32(image_to_ismrmrd(im)?),
        mrd::AnyImage::F64(im) => Legacy::F64(image_to_ismrmrd(im)?),
        mrd::AnyImage::Complex32(im) => Legacy::Complex32(image_to_ismrmrd(im)?),
        mrd::AnyImage::Complex64(im) => Legacy::Complex64(image_to_ismrmrd(im)?),
    })
}

pub fn waveform_to_mrd(wav: &ismrmrd::Waveform) -> Result<mrd::Waveform> {
    let head = &wav.head;
    let (data, dims) = samples_to_mrd(&wav.data, head.number_of_samples as usize, head.channels as usize)?;
    Ok(mrd::Waveform {
        flags: head.flags,
        measurement_uid: head.measurement_uid,
        scan_counter: head.scan_counter,
        time_stamp: head.time_stamp,
        sample_time_us: head.sample_time_us,
        waveform_id: head.waveform_id.into(),
        data: NdArray::new(dims.shape(), data)?,
    })
}

pub fn waveform_to_ismrmrd(wav: &mrd::Waveform) -> Result<ismrmrd::Waveform> {
    let shape = wav.data.shape_of_rank("waveform data rank", 2)?;
    let [channels, samples] = [shape[0], shape[1]];
    Ok(ismrmrd::Waveform {
        head: ismrmrd::WaveformHeader {
            version: ismrmrd::VERSION,
            flags: wav.flags,
            measurement_uid: wav.measurement_uid,
            scan_counter: wav.scan_counter,
            time_stamp: wav.time_stamp,
            number_of_samples: narrow("waveform samples", samples as u64)?,
            channels: narrow("waveform channels", channels as u64)?,
            sample_time_us: wav.sample_time_us,
            waveform_id: narrow("waveform id", wav.waveform_id)?,
        },
        data: samples_to_ismrmrd(wav.data.data(), channels, samples)?,
    })
}

#[cfg(test)]
mod tests {
    use num_complex::{Complex32, Complex64};

    use super::*;

    fn legacy_acquisition(samples: u16, channels: u16, dims: u16) -> ismrmrd::Acquisition {
        let ns = samples as usize;
        ismrmrd::Acquisition {
            head: ismrmrd::AcquisitionHeader {
                number_of_samples: samples,
                active_channels: channels,
                available_channels: channels,
                trajectory_dimensions: dims,
                scan_counter: 17,
                center_sample: samples / 2,
                idx: ismrmrd::EncodingCounters {
                    kspace_encode_step_1: 5,
                    ..Default::default()
                },
                ..Default::default()
            },
            traj: (0..dims as usize * ns).map(|i| i as f32).collect(),
            // value = 100 * channel + sample
            data: (0..channels as usize * ns)
                .map(|i| Complex32::new((100 * (i / ns) + i % ns) as f32, 0.0))
                .collect(),
        }
    }

    #[test]
    fn acquisition_data_is_channel_major() {
        let acq = acquisition_to_mrd(&legacy_acquisition(10, 4, 0)).unwrap();
        assert_eq!(acq.data.shape(), &[4, 10]);
        assert_eq!(acq.trajectory, None);
        let dims = acq.data.dims();
        for c in 0..4 {
            for s in 0..10 {
                assert_eq!(acq.data.data()[dims.calc_addr(&[c, s])].re, (100 * c + s) as f32);
            }
        }
        assert_eq!(acq.scan_counter, Some(17));
        assert_eq!(acq.center_sample, Some(5));
        assert_eq!(acq.idx.kspace_encode_step_1, Some(5));
        assert_eq!(acq.user_int.len(), USER_INTS);
    }

    #[test]
    fn acquisition_survives_both_directions() {
        let mut legacy = legacy_acquisition(6, 3, 2);
        legacy.head.version = ismrmrd::VERSION;
        legacy.head.channel_mask[0] = 0b111;
        legacy.head.physiology_time_stamp = [1, 2, 3];
        let acq = acquisition_to_mrd(&legacy).unwrap();
        assert_eq!(acq.channel_order, [0, 1, 2]);
        let traj = acq.trajectory.as_ref().unwrap();
        assert_eq!(traj.shape(), &[2, 6]);
        // legacy stores (dim, sample) with dim fastest
        assert_eq!(traj.data()[traj.dims().calc_addr(&[1, 0])], 1.0);
        assert_eq!(traj.data()[traj.dims().calc_addr(&[0, 1])], 2.0);
        assert_eq!(acquisition_to_ismrmrd(&acq).unwrap(), legacy);
    }

    #[test]
    fn acquisition_capacity_checks() {
        let base = acquisition_to_mrd(&legacy_acquisition(2, 1, 0)).unwrap();

        let mut acq = base.clone();
        acq.physiology_time_stamp = vec![0; 4];
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::Cardinality { .. })));

        let mut acq = base.clone();
        acq.user_float = vec![0.0; 9];
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::Cardinality { .. })));

        let mut acq = base.clone();
        acq.channel_order = vec![1024];
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::Overflow { .. })));

        let mut acq = base;
        acq.discard_pre = Some(1 << 16);
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::Overflow { .. })));
    }

    #[test]
    fn absent_acquisition_fields_become_zero() {
        let acq = mrd::Acquisition {
            data: NdArray::new(&[1, 2], vec![Complex32::default(); 2]).unwrap(),
            ..Default::default()
        };
        let legacy = acquisition_to_ismrmrd(&acq).unwrap();
        assert_eq!(legacy.head.scan_counter, 0);
        assert_eq!(legacy.head.discard_post, 0);
        assert_eq!(legacy.head.sample_time_us, 0.0);
        assert_eq!(legacy.head.trajectory_dimensions, 0);
        assert_eq!(legacy.head.number_of_samples, 2);
        assert_eq!(legacy.head.active_channels, 1);
    }

    #[test]
    fn trajectory_must_match_samples() {
        let mut acq = acquisition_to_mrd(&legacy_acquisition(4, 1, 2)).unwrap();
        acq.trajectory = Some(NdArray::new(&[2, 3], vec![0.0; 6]).unwrap());
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn channel_mask() {
        let mask = channel_mask_from_order(&[0, 63, 64, 1023]).unwrap();
        assert_eq!(mask[0], 1 | 1 << 63);
        assert_eq!(mask[1], 1);
        assert_eq!(mask[15], 1 << 63);
        assert_eq!(channel_order_from_mask(&mask), [0, 63, 64, 1023]);
    }

    #[test]
    fn unordered_channels_are_rejected() {
        for order in [&[2, 1][..], &[0, 3, 3][..], &[5, 0, 7][..]] {
            assert!(matches!(
                channel_mask_from_order(order),
                Err(Error::InvalidValue { ref element, .. }) if element == "channelOrder"
            ));
        }
        let mut acq = acquisition_to_mrd(&legacy_acquisition(4, 2, 0)).unwrap();
        acq.channel_order = vec![1, 0];
        assert!(matches!(acquisition_to_ismrmrd(&acq), Err(Error::InvalidValue { .. })));
    }

    fn legacy_image<T: Element>(f: impl Fn(usize) -> T) -> ismrmrd::Image<T> {
        let attribute_string = serialize_meta(
            &[("ImageComment".to_string(), vec!["first".to_string(), "second".to_string()])].into(),
        )
        .unwrap();
        ismrmrd::Image {
            head: ismrmrd::ImageHeader {
                version: ismrmrd::VERSION,
                data_type: T::KIND.ismrmrd_code(),
                matrix_size: [4, 3, 2],
                channels: 2,
                image_type: 5,
                read_dir: [1.0, 0.0, 0.0],
                phase_dir: [0.0, 1.0, 0.0],
                slice: 7,
                user_int: [1, 2, 3, 4, 5, 6, 7, 8],
                attribute_string_len: attribute_string.len() as u32,
                ..Default::default()
            },
            attribute_string,
            data: (0..4 * 3 * 2 * 2).map(f).collect(),
        }
    }

    fn image_both_directions<T: Element>(f: impl Fn(usize) -> T) {
        let legacy = legacy_image(f);
        let im = image_to_mrd(&legacy).unwrap();
        assert_eq!(im.data.shape(), &[2, 2, 3, 4]);
        assert_eq!(im.image_type, mrd::ImageType::Complex);
        assert_eq!(im.col_dir, [1.0, 0.0, 0.0]);
        assert_eq!(im.slice, Some(7));
        assert_eq!(im.meta["ImageComment"], ["first", "second"]);
        // voxel (x=1, y=2, z=1, c=1)
        let legacy_addr = 1 + 4 * (2 + 3 * (1 + 2 * 1));
        assert_eq!(im.data.data()[im.data.dims().calc_addr(&[1, 1, 2, 1])], legacy.data[legacy_addr]);
        assert_eq!(image_to_ismrmrd(&im).unwrap(), legacy);
    }

    #[test]
    fn images_of_every_element_type() {
        image_both_directions(|i| i as u16);
        image_both_directions(|i| -(i as i16));
        image_both_directions(|i| i as u32);
        image_both_directions(|i| i as i32 - 20);
        image_both_directions(|i| i as f32 / 4.0);
        image_both_directions(|i| i as f64 * 1.5);
        image_both_directions(|i| Complex32::new(i as f32, 1.0));
        image_both_directions(|i| Complex64::new(0.0, i as f64));
    }

    #[test]
    fn any_image_dispatch() {
        let legacy = ismrmrd::AnyImage::F64(legacy_image(|i| i as f64));
        let im = any_image_to_mrd(&legacy).unwrap();
        assert!(matches!(im, mrd::AnyImage::F64(_)));
        assert_eq!(any_image_to_ismrmrd(&im).unwrap(), legacy);
    }

    #[test]
    fn unknown_image_type() {
        let mut legacy = legacy_image(|i| i as u16);
        legacy.head.image_type = 9;
        assert!(matches!(image_to_mrd(&legacy), Err(Error::UnknownEnumValue { .. })));
    }

    #[test]
    fn empty_meta_is_empty_attribute_string() {
        let mut legacy = legacy_image(|i| i as u16);
        legacy.attribute_string.clear();
        legacy.head.attribute_string_len = 0;
        let im = image_to_mrd(&legacy).unwrap();
        assert!(im.meta.is_empty());
        assert_eq!(image_to_ismrmrd(&im).unwrap(), legacy);
    }

    #[test]
    fn waveform_both_directions() {
        let legacy = ismrmrd::Waveform {
            head: ismrmrd::WaveformHeader {
                version: ismrmrd::VERSION,
                number_of_samples: 5,
                channels: 2,
                waveform_id: 3,
                sample_time_us: 2.5,
                ..Default::default()
            },
            data: (0..10).collect(),
        };
        let wav = waveform_to_mrd(&legacy).unwrap();
        assert_eq!(wav.data.shape(), &[2, 5]);
        assert_eq!(wav.data.data(), legacy.data.as_slice());
        assert_eq!(waveform_to_ismrmrd(&wav).unwrap(), legacy);

        let mut wav = wav;
        wav.waveform_id = 70_000;
        assert!(matches!(waveform_to_ismrmrd(&wav), Err(Error::Overflow { .. })));
    }
}
