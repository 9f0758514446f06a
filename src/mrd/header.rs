//! The MRD stream header.

use chrono::{NaiveDate, NaiveTime};

use super::binary::{mrd_enum, record};

mrd_enum!(PatientGender { M = 0, F = 1, O = 2 });

mrd_enum!(PatientPosition {
    HFP = 0,
    HFS = 1,
    HFDR = 2,
    HFDL = 3,
    FFP = 4,
    FFS = 5,
    FFDR = 6,
    FFDL = 7,
});

mrd_enum!(Trajectory {
    Cartesian = 0,
    Epi = 1,
    Radial = 2,
    Goldenangle = 3,
    Spiral = 4,
    Other = 5,
});

mrd_enum!(CalibrationMode {
    Embedded = 0,
    Interleaved = 1,
    Separate = 2,
    External = 3,
    Other = 4,
});

mrd_enum!(InterleavingDimension {
    Phase = 0,
    Repetition = 1,
    Contrast = 2,
    Average = 3,
    Other = 4,
});

mrd_enum!(
    /// multiband calibration
    Calibration {
        Separable2d = 0,
        Full3d = 1,
        Other = 2,
    }
);

mrd_enum!(DiffusionDimension {
    Average = 0,
    Contrast = 1,
    Phase = 2,
    Repetition = 3,
    Set = 4,
    Segment = 5,
    User0 = 6,
    User1 = 7,
    User2 = 8,
    User3 = 9,
    User4 = 10,
    User5 = 11,
    User6 = 12,
    User7 = 13,
});

mrd_enum!(WaveformType {
    Ecg = 0,
    Pulse = 1,
    Respiratory = 2,
    Trigger = 3,
    Gradientwaveform = 4,
    Other = 5,
});

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub version: Option<i64>,
    pub subject_information: Option<SubjectInformationType>,
    pub study_information: Option<StudyInformationType>,
    pub measurement_information: Option<MeasurementInformationType>,
    pub acquisition_system_information: Option<AcquisitionSystemInformationType>,
    pub experimental_conditions: ExperimentalConditionsType,
    /// never empty in a valid header
    pub encoding: Vec<EncodingType>,
    pub sequence_parameters: Option<SequenceParametersType>,
    pub user_parameters: Option<UserParametersType>,
    pub waveform_information: Vec<WaveformInformationType>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectInformationType {
    pub patient_name: Option<String>,
    pub patient_weight_kg: Option<f32>,
    pub patient_height_m: Option<f32>,
    pub patient_id: Option<String>,
    pub patient_birthdate: Option<NaiveDate>,
    pub patient_gender: Option<PatientGender>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudyInformationType {
    pub study_date: Option<NaiveDate>,
    pub study_time: Option<NaiveTime>,
    pub study_id: Option<String>,
    pub accession_number: Option<i64>,
    pub referring_physician_name: Option<String>,
    pub study_description: Option<String>,
    pub study_instance_uid: Option<String>,
    pub body_part_examined: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementDependencyType {
    pub dependency_type: String,
    pub measurement_id: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferencedImageSequenceType {
    pub referenced_sop_instance_uid: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreeDimensionalFloat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementInformationType {
    pub measurement_id: Option<String>,
    pub series_date: Option<NaiveDate>,
    pub series_time: Option<NaiveTime>,
    pub patient_position: PatientPosition,
    pub relative_table_position: Option<ThreeDimensionalFloat>,
    pub initial_series_number: Option<i64>,
    pub protocol_name: Option<String>,
    pub sequence_name: Option<String>,
    pub series_description: Option<String>,
    pub measurement_dependency: Vec<MeasurementDependencyType>,
    pub series_instance_uid_root: Option<String>,
    pub frame_of_reference_uid: Option<String>,
    pub referenced_image_sequence: Option<ReferencedImageSequenceType>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoilLabelType {
    pub coil_number: u32,
    pub coil_name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AcquisitionSystemInformationType {
    pub system_vendor: Option<String>,
    pub system_model: Option<String>,
    pub system_field_strength_t: Option<f32>,
    pub relative_receiver_noise_bandwidth: Option<f32>,
    pub receiver_channels: Option<u32>,
    pub coil_label: Vec<CoilLabelType>,
    pub institution_name: Option<String>,
    pub station_name: Option<String>,
    pub device_id: Option<String>,
    pub device_serial_number: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExperimentalConditionsType {
    pub h1resonance_frequency_hz: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatrixSizeType {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldOfViewMm {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EncodingSpaceType {
    pub matrix_size: MatrixSizeType,
    pub field_of_view_mm: FieldOfViewMm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitType {
    pub minimum: u32,
    pub maximum: u32,
    pub center: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodingLimitsType {
    pub kspace_encoding_step_0: Option<LimitType>,
    pub kspace_encoding_step_1: Option<LimitType>,
    pub kspace_encoding_step_2: Option<LimitType>,
    pub average: Option<LimitType>,
    pub slice: Option<LimitType>,
    pub contrast: Option<LimitType>,
    pub phase: Option<LimitType>,
    pub repetition: Option<LimitType>,
    pub set: Option<LimitType>,
    pub segment: Option<LimitType>,
    /// user dimensions by position, at most eight
    pub user: Vec<Option<LimitType>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterLongType {
    pub name: String,
    pub value: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterDoubleType {
    pub name: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterStringType {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterBase64Type {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrajectoryDescriptionType {
    pub identifier: String,
    pub user_parameter_long: Vec<UserParameterLongType>,
    pub user_parameter_double: Vec<UserParameterDoubleType>,
    pub user_parameter_string: Vec<UserParameterStringType>,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccelerationFactorType {
    pub kspace_encoding_step_1: u32,
    pub kspace_encoding_step_2: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultibandSpacingType {
    pub d_z: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultibandType {
    pub spacing: Vec<MultibandSpacingType>,
    pub delta_kz: f32,
    pub multiband_factor: u32,
    pub calibration: Calibration,
    pub calibration_encoding: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParallelImagingType {
    pub acceleration_factor: AccelerationFactorType,
    pub calibration_mode: Option<CalibrationMode>,
    pub interleaving_dimension: Option<InterleavingDimension>,
    pub multiband: Option<MultibandType>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncodingType {
    pub encoded_space: EncodingSpaceType,
    pub recon_space: EncodingSpaceType,
    pub encoding_limits: EncodingLimitsType,
    pub trajectory: Trajectory,
    pub trajectory_description: Option<TrajectoryDescriptionType>,
    pub parallel_imaging: Option<ParallelImagingType>,
    pub echo_train_length: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientDirectionType {
    pub rl: f32,
    pub ap: f32,
    pub fh: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiffusionType {
    pub gradient_direction: GradientDirectionType,
    pub bvalue: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceParametersType {
    pub t_r: Vec<f32>,
    pub t_e: Vec<f32>,
    pub t_i: Vec<f32>,
    pub flip_angle_deg: Vec<f32>,
    pub sequence_type: Option<String>,
    pub echo_spacing: Vec<f32>,
    pub diffusion_dimension: Option<DiffusionDimension>,
    pub diffusion: Vec<DiffusionType>,
    pub diffusion_scheme: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParametersType {
    pub user_parameter_long: Vec<UserParameterLongType>,
    pub user_parameter_double: Vec<UserParameterDoubleType>,
    pub user_parameter_string: Vec<UserParameterStringType>,
    pub user_parameter_base64: Vec<UserParameterBase64Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveformInformationType {
    pub waveform_name: String,
    pub waveform_type: WaveformType,
    pub user_parameters: UserParametersType,
}

record!(Header {
    version,
    subject_information,
    study_information,
    measurement_information,
    acquisition_system_information,
    experimental_conditions,
    encoding,
    sequence_parameters,
    user_parameters,
    waveform_information,
});

record!(SubjectInformationType {
    patient_name,
    patient_weight_kg,
    patient_height_m,
    patient_id,
    patient_birthdate,
    patient_gender,
});

record!(StudyInformationType {
    study_date,
    study_time,
    study_id,
    accession_number,
    referring_physician_name,
    study_description,
    study_instance_uid,
    body_part_examined,
});

record!(MeasurementDependencyType { dependency_type, measurement_id });
record!(ReferencedImageSequenceType { referenced_sop_instance_uid });
record!(ThreeDimensionalFloat { x, y, z });

record!(MeasurementInformationType {
    measurement_id,
    series_date,
    series_time,
    patient_position,
    relative_table_position,
    initial_series_number,
    protocol_name,
    sequence_name,
    series_description,
    measurement_dependency,
    series_instance_uid_root,
    frame_of_reference_uid,
    referenced_image_sequence,
});

record!(CoilLabelType { coil_number, coil_name });

record!(AcquisitionSystemInformationType {
    system_vendor,
    system_model,
    system_field_strength_t,
    relative_receiver_noise_bandwidth,
    receiver_channels,
    coil_label,
    institution_name,
    station_name,
    device_id,
    device_serial_number,
});

record!(ExperimentalConditionsType { h1resonance_frequency_hz });
record!(MatrixSizeType { x, y, z });
record!(FieldOfViewMm { x, y, z });
record!(EncodingSpaceType { matrix_size, field_of_view_mm });
record!(LimitType { minimum, maximum, center });

record!(EncodingLimitsType {
    kspace_encoding_step_0,
    kspace_encoding_step_1,
    kspace_encoding_step_2,
    average,
    slice,
    contrast,
    phase,
    repetition,
    set,
    segment,
    user,
});

record!(UserParameterLongType { name, value });
record!(UserParameterDoubleType { name, value });
record!(UserParameterStringType { name, value });
record!(UserParameterBase64Type { name, value });

record!(TrajectoryDescriptionType {
    identifier,
    user_parameter_long,
    user_parameter_double,
    user_parameter_string,
    comment,
});

record!(AccelerationFactorType { kspace_encoding_step_1, kspace_encoding_step_2 });
record!(MultibandSpacingType { d_z });

record!(MultibandType {
    spacing,
    delta_kz,
    multiband_factor,
    calibration,
    calibration_encoding,
});

record!(ParallelImagingType {
    acceleration_factor,
    calibration_mode,
    interleaving_dimension,
    multiband,
});

record!(EncodingType {
    encoded_space,
    recon_space,
    encoding_limits,
    trajectory,
    trajectory_description,
    parallel_imaging,
    echo_train_length,
});

record!(GradientDirectionType { rl, ap, fh });
record!(DiffusionType { gradient_direction, bvalue });

record!(SequenceParametersType {
    t_r,
    t_e,
    t_i,
    flip_angle_deg,
    sequence_type,
    echo_spacing,
    diffusion_dimension,
    diffusion,
    diffusion_scheme,
});

record!(UserParametersType {
    user_parameter_long,
    user_parameter_double,
    user_parameter_string,
    user_parameter_base64,
});

record!(WaveformInformationType { waveform_name, waveform_type, user_parameters });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mrd::binary::{Decode, Encode};

    #[test]
    fn enum_codes() {
        let mut buf = vec![];
        Trajectory::Spiral.encode(&mut buf).unwrap();
        PatientPosition::FFDL.encode(&mut buf).unwrap();
        assert_eq!(buf, [4, 7]);
        assert_eq!(DiffusionDimension::ALL.len(), 14);
        assert!(matches!(
            WaveformType::decode(&mut &[6u8][..]),
            Err(Error::UnknownEnumValue { kind: "WaveformType", .. })
        ));
    }

    #[test]
    fn header_encoding() {
        let header = Header {
            version: Some(2),
            subject_information: Some(SubjectInformationType {
                patient_birthdate: NaiveDate::from_ymd_opt(1980, 2, 29),
                patient_gender: Some(PatientGender::F),
                ..Default::default()
            }),
            experimental_conditions: ExperimentalConditionsType { h1resonance_frequency_hz: 123_200_000 },
            encoding: vec![EncodingType {
                encoded_space: EncodingSpaceType::default(),
                recon_space: EncodingSpaceType::default(),
                encoding_limits: EncodingLimitsType {
                    slice: Some(LimitType { minimum: 0, maximum: 3, center: 1 }),
                    user: vec![None, Some(LimitType::default())],
                    ..Default::default()
                },
                trajectory: Trajectory::Epi,
                trajectory_description: None,
                parallel_imaging: None,
                echo_train_length: Some(8),
            }],
            ..Default::default()
        };
        let mut buf = vec![];
        header.encode(&mut buf).unwrap();
        assert_eq!(&buf[..2], &[1, 4]);
        assert_eq!(Header::decode(&mut buf.as_slice()).unwrap(), header);
    }
}
