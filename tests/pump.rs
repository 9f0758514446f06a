use mrd_convert::convert::header_to_mrd;
use mrd_convert::ismrmrd::{self, MessageId, ProtocolReader, ProtocolWriter};
use mrd_convert::mrd::binary::write_varint;
use mrd_convert::mrd::{self, Encode, MrdReader, MrdWriter, NdArray, StreamItem};
use mrd_convert::pump::{ismrmrd_to_mrd, mrd_to_ismrmrd};
use mrd_convert::Error;
use num_complex::{Complex32, Complex64};

fn cartesian_header() -> ismrmrd::IsmrmrdHeader {
    ismrmrd::IsmrmrdHeader {
        version: Some(2),
        encoding: vec![ismrmrd::Encoding {
            encoded_space: ismrmrd::EncodingSpace {
                matrix_size: ismrmrd::MatrixSize { x: 10, y: 1, z: 1 },
                ..Default::default()
            },
            trajectory: "cartesian".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// 4 channels x 10 samples, value = 100 * channel + sample
fn acquisition() -> ismrmrd::Acquisition {
    ismrmrd::Acquisition {
        head: ismrmrd::AcquisitionHeader {
            version: ismrmrd::VERSION,
            number_of_samples: 10,
            active_channels: 4,
            available_channels: 4,
            scan_counter: 1,
            ..Default::default()
        },
        traj: vec![],
        data: (0..40)
            .map(|i| Complex32::new((100 * (i / 10) + i % 10) as f32, -1.0))
            .collect(),
    }
}

fn legacy_stream(header: Option<&ismrmrd::IsmrmrdHeader>, write: impl FnOnce(&mut ProtocolWriter<&mut Vec<u8>>)) -> Vec<u8> {
    let mut bytes = vec![];
    let mut writer = ProtocolWriter::new(&mut bytes);
    if let Some(h) = header {
        writer.write_header(h).unwrap();
    }
    write(&mut writer);
    writer.close().unwrap();
    bytes
}

fn mrd_stream(header: Option<&mrd::Header>, items: &[StreamItem]) -> Vec<u8> {
    let mut writer = MrdWriter::new(vec![]).unwrap();
    writer.write_header(header).unwrap();
    for item in items {
        writer.write_data(item).unwrap();
    }
    writer.end_data().unwrap()
}

#[test]
fn cartesian_acquisition_end_to_end() {
    let input = legacy_stream(Some(&cartesian_header()), |w| w.write_acquisition(&acquisition()).unwrap());
    let mut output = vec![];
    let stats = ismrmrd_to_mrd(input.as_slice(), &mut output).unwrap();
    assert!(stats.header);
    assert_eq!(stats.acquisitions, 1);

    let mut reader = MrdReader::new(output.as_slice()).unwrap();
    let header = reader.read_header().unwrap().unwrap();
    assert_eq!(header.encoding.len(), 1);
    assert_eq!(header.encoding[0].trajectory, mrd::Trajectory::Cartesian);

    let Some(StreamItem::Acquisition(acq)) = reader.read_data().unwrap() else {
        panic!("expected an acquisition");
    };
    assert_eq!(acq.data.shape(), &[4, 10]);
    assert!(acq.trajectory.is_none());
    for (i, value) in acq.data.data().iter().enumerate() {
        // row-major (channel, sample): sample is fastest
        assert_eq!(value.re, (100 * (i / 10) + i % 10) as f32);
    }
    assert_eq!(reader.read_data().unwrap(), None);

    let mut legacy = vec![];
    mrd_to_ismrmrd(output.as_slice(), &mut legacy).unwrap();
    let mut reader = ProtocolReader::new(legacy.as_slice());
    assert_eq!(reader.read_header().unwrap(), cartesian_header());
    assert_eq!(reader.read_acquisition().unwrap(), acquisition());
    reader.read_close().unwrap();
}

#[test]
fn headerless_input() {
    let input = legacy_stream(None, |w| w.write_acquisition(&acquisition()).unwrap());
    let mut output = vec![];
    let stats = ismrmrd_to_mrd(input.as_slice(), &mut output).unwrap();
    assert!(!stats.header);

    let mut reader = MrdReader::new(output.as_slice()).unwrap();
    assert_eq!(reader.read_header().unwrap(), None);
    assert!(matches!(reader.read_data().unwrap(), Some(StreamItem::Acquisition(_))));
    assert_eq!(reader.read_data().unwrap(), None);
}

#[test]
fn missing_encoding_writes_nothing() {
    let header = ismrmrd::IsmrmrdHeader::default();
    let input = legacy_stream(Some(&header), |_| {});
    let mut output = vec![];
    assert!(matches!(ismrmrd_to_mrd(input.as_slice(), &mut output), Err(Error::MissingEncoding)));
    assert!(output.is_empty());

    let mut header = header_to_mrd(&cartesian_header()).unwrap();
    header.encoding.clear();
    let input = mrd_stream(Some(&header), &[]);
    let mut output = vec![];
    assert!(matches!(mrd_to_ismrmrd(input.as_slice(), &mut output), Err(Error::MissingEncoding)));
    assert!(output.is_empty());
}

#[test]
fn too_many_user_limits_writes_nothing() {
    let mut header = header_to_mrd(&cartesian_header()).unwrap();
    header.encoding[0].encoding_limits.user = vec![None; 9];
    let input = mrd_stream(Some(&header), &[]);
    let mut output = vec![];
    assert!(matches!(mrd_to_ismrmrd(input.as_slice(), &mut output), Err(Error::Cardinality { .. })));
    assert!(output.is_empty());
}

fn mrd_acquisition(user: Vec<u32>) -> StreamItem {
    StreamItem::Acquisition(mrd::Acquisition {
        idx: mrd::EncodingCounters {
            user,
            ..Default::default()
        },
        data: NdArray::new(&[1, 2], vec![Complex32::default(); 2]).unwrap(),
        ..Default::default()
    })
}

/// the output holds the header message and nothing after it
fn assert_header_only(output: &[u8]) {
    let mut reader = ProtocolReader::new(output);
    reader.read_header().unwrap();
    assert!(matches!(reader.peek(), Err(Error::Io(_))));
}

#[test]
fn nine_user_counters_are_rejected() {
    let header = header_to_mrd(&cartesian_header()).unwrap();
    let input = mrd_stream(Some(&header), &[mrd_acquisition(vec![0; 9])]);
    let mut output = vec![];
    assert!(matches!(
        mrd_to_ismrmrd(input.as_slice(), &mut output),
        Err(Error::Cardinality { len: 9, capacity: 8, .. })
    ));
    assert_header_only(&output);
}

#[test]
fn user_counter_overflow_is_rejected() {
    let header = header_to_mrd(&cartesian_header()).unwrap();
    let input = mrd_stream(Some(&header), &[mrd_acquisition(vec![65536])]);
    let mut output = vec![];
    assert!(matches!(
        mrd_to_ismrmrd(input.as_slice(), &mut output),
        Err(Error::Overflow { value: 65536, .. })
    ));
    assert_header_only(&output);
}

#[test]
fn unknown_trajectory_is_rejected() {
    let mut header = cartesian_header();
    header.encoding[0].trajectory = "zigzag".to_string();
    let input = legacy_stream(Some(&header), |_| {});
    assert!(matches!(
        ismrmrd_to_mrd(input.as_slice(), vec![]),
        Err(Error::UnknownEnumValue { .. })
    ));
}

fn image<T: mrd_convert::Element>(f: impl Fn(usize) -> T) -> ismrmrd::Image<T> {
    ismrmrd::Image {
        head: ismrmrd::ImageHeader {
            version: ismrmrd::VERSION,
            data_type: T::KIND.ismrmrd_code(),
            matrix_size: [3, 2, 1],
            channels: 2,
            image_type: 1,
            ..Default::default()
        },
        attribute_string: String::new(),
        data: (0..12).map(f).collect(),
    }
}

#[test]
fn images_and_waveforms_round_trip() {
    use ismrmrd::AnyImage;
    let images = [
        AnyImage::U16(image(|i| i as u16)),
        AnyImage::I16(image(|i| i as i16 - 6)),
        AnyImage::U32(image(|i| i as u32)),
        AnyImage::I32(image(|i| i as i32 * -3)),
        AnyImage::F32(image(|i| i as f32 * 0.5)),
        AnyImage::F64(image(|i| i as f64 * 0.25)),
        AnyImage::Complex32(image(|i| Complex32::new(i as f32, 2.0))),
        AnyImage::Complex64(image(|i| Complex64::new(1.0, i as f64))),
    ];
    let waveform = ismrmrd::Waveform {
        head: ismrmrd::WaveformHeader {
            version: ismrmrd::VERSION,
            number_of_samples: 4,
            channels: 3,
            waveform_id: 2,
            ..Default::default()
        },
        data: (0..12).collect(),
    };
    let input = legacy_stream(Some(&cartesian_header()), |w| {
        for im in &images {
            w.write_image(im).unwrap();
        }
        w.write_waveform(&waveform).unwrap();
    });

    let mut output = vec![];
    let stats = ismrmrd_to_mrd(input.as_slice(), &mut output).unwrap();
    assert_eq!(stats.images, 8);
    assert_eq!(stats.waveforms, 1);

    let mut legacy = vec![];
    let back = mrd_to_ismrmrd(output.as_slice(), &mut legacy).unwrap();
    assert_eq!(back, stats);

    let mut reader = ProtocolReader::new(legacy.as_slice());
    reader.read_header().unwrap();
    for im in &images {
        assert_eq!(reader.peek().unwrap(), MessageId::Image);
        assert_eq!(&reader.read_image().unwrap(), im);
    }
    assert_eq!(reader.read_waveform().unwrap(), waveform);
    reader.read_close().unwrap();
}

#[test]
fn waveform_shape_beyond_input() {
    let item = StreamItem::Waveform(mrd::Waveform {
        data: NdArray::new(&[1, 1], vec![7]).unwrap(),
        ..Default::default()
    });
    let mut body = vec![];
    item.encode(&mut body).unwrap();
    // rank, shape and the one sample go; the shape becomes [1, 2^61] with no samples behind it
    body.truncate(body.len() - 7);
    body.extend_from_slice(&[2, 1]);
    write_varint(&mut body, 1 << 61).unwrap();

    let header = header_to_mrd(&cartesian_header()).unwrap();
    let mut input = mrd_stream(Some(&header), &[]);
    input.pop();
    input.push(1);
    input.extend_from_slice(&body);
    input.push(0);

    let mut output = vec![];
    assert!(matches!(mrd_to_ismrmrd(input.as_slice(), &mut output), Err(Error::Io(_))));
    assert_header_only(&output);
}

#[test]
fn attribute_length_beyond_input() {
    let im = image(|i| i as u16);
    let mut message = vec![];
    im.head.write(&mut message).unwrap();
    message.extend_from_slice(&(u64::MAX / 2).to_le_bytes());

    let mut input = legacy_stream(Some(&cartesian_header()), |_| {});
    // replace the close message with an image that claims a huge attribute string
    input.truncate(input.len() - 2);
    input.extend_from_slice(&MessageId::Image.code().to_le_bytes());
    input.extend_from_slice(&message);

    let mut output = vec![];
    assert!(matches!(ismrmrd_to_mrd(input.as_slice(), &mut output), Err(Error::Io(_))));
}

#[test]
fn not_an_mrd_stream() {
    assert!(matches!(mrd_to_ismrmrd(&b"hello world"[..], vec![]), Err(Error::BadMagic)));
}
