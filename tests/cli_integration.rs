use assert_cmd::Command;
use mrd_convert::ismrmrd::{self, ProtocolReader, ProtocolWriter};
use mrd_convert::mrd::MrdReader;
use num_complex::Complex32;
use predicates::prelude::*;

fn ismrmrd_to_mrd() -> Command {
    Command::cargo_bin("ismrmrd-to-mrd").unwrap()
}

fn mrd_to_ismrmrd() -> Command {
    Command::cargo_bin("mrd-to-ismrmrd").unwrap()
}

fn legacy_input(with_header: bool) -> Vec<u8> {
    let mut bytes = vec![];
    let mut writer = ProtocolWriter::new(&mut bytes);
    if with_header {
        writer
            .write_header(&ismrmrd::IsmrmrdHeader {
                encoding: vec![ismrmrd::Encoding {
                    trajectory: "cartesian".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap();
    }
    writer
        .write_acquisition(&ismrmrd::Acquisition {
            head: ismrmrd::AcquisitionHeader {
                version: ismrmrd::VERSION,
                number_of_samples: 10,
                active_channels: 4,
                available_channels: 4,
                ..Default::default()
            },
            traj: vec![],
            data: (0..40).map(|i| Complex32::new(i as f32, 0.0)).collect(),
        })
        .unwrap();
    writer.close().unwrap();
    bytes
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_help_flag() {
    ismrmrd_to_mrd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ISMRMRD stream on stdin"));
    mrd_to_ismrmrd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MRD stream on stdin"));
}

#[test]
fn test_version_flag() {
    ismrmrd_to_mrd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_positional_arguments_are_rejected() {
    ismrmrd_to_mrd().arg("input.h5").assert().failure();
}

// =============================================================================
// CONVERSION
// =============================================================================

#[test]
fn test_round_trip_through_both_binaries() {
    let input = legacy_input(true);
    let mrd = ismrmrd_to_mrd().write_stdin(input).assert().success().get_output().stdout.clone();

    let mut reader = MrdReader::new(mrd.as_slice()).unwrap();
    assert!(reader.read_header().unwrap().is_some());

    let legacy = mrd_to_ismrmrd().write_stdin(mrd).assert().success().get_output().stdout.clone();
    let mut reader = ProtocolReader::new(legacy.as_slice());
    reader.read_header().unwrap();
    let acq = reader.read_acquisition().unwrap();
    assert_eq!(acq.head.number_of_samples, 10);
    assert_eq!(acq.data[13], Complex32::new(13.0, 0.0));
    reader.read_close().unwrap();
}

#[test]
fn test_headerless_input_warns() {
    ismrmrd_to_mrd()
        .write_stdin(legacy_input(false))
        .assert()
        .success()
        .stderr(predicate::str::contains("instead of a header"));
}

#[test]
fn test_verbose_logs_item_count() {
    ismrmrd_to_mrd()
        .arg("-v")
        .write_stdin(legacy_input(true))
        .assert()
        .success()
        .stderr(predicate::str::contains("1 acquisitions"));
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn test_close_first_exits_with_1() {
    let mut input = vec![];
    ProtocolWriter::new(&mut input).close().unwrap();
    ismrmrd_to_mrd()
        .write_stdin(input)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_empty_input_exits_with_1() {
    ismrmrd_to_mrd().write_stdin(Vec::new()).assert().code(1);
    mrd_to_ismrmrd().write_stdin(Vec::new()).assert().code(1);
}

#[test]
fn test_legacy_stream_is_not_mrd() {
    mrd_to_ismrmrd()
        .write_stdin(legacy_input(true))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad magic"));
}
