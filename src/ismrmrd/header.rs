//! The ISMRMRD XML header.
//!
//! Enumerated values (gender, patient position, trajectory, ...) are kept as the strings found in
//! the XML document. They are only checked against the set of legal values when the header is
//! converted, so that an unknown value is reported as such rather than as an XML parse failure.

/// Number of user-defined encoding dimensions.
pub const USER_LIMITS: usize = 8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IsmrmrdHeader {
    pub version: Option<i64>,
    pub subject_information: Option<SubjectInformation>,
    pub study_information: Option<StudyInformation>,
    pub measurement_information: Option<MeasurementInformation>,
    pub acquisition_system_information: Option<AcquisitionSystemInformation>,
    pub experimental_conditions: ExperimentalConditions,
    pub encoding: Vec<Encoding>,
    pub sequence_parameters: Option<SequenceParameters>,
    pub user_parameters: Option<UserParameters>,
    pub waveform_information: Vec<WaveformInformation>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectInformation {
    pub patient_name: Option<String>,
    pub patient_weight_kg: Option<f32>,
    pub patient_height_m: Option<f32>,
    pub patient_id: Option<String>,
    /// `YYYY-MM-DD`
    pub patient_birthdate: Option<String>,
    /// `M`, `F` or `O`
    pub patient_gender: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudyInformation {
    pub study_date: Option<String>,
    pub study_time: Option<String>,
    pub study_id: Option<String>,
    pub accession_number: Option<i64>,
    pub referring_physician_name: Option<String>,
    pub study_description: Option<String>,
    pub study_instance_uid: Option<String>,
    pub body_part_examined: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementDependency {
    pub dependency_type: String,
    pub measurement_id: String,
}

/// One entry of the referenced image sequence. ISMRMRD repeats the whole element per image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferencedImage {
    pub referenced_sop_instance_uid: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreeDimensionalFloat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementInformation {
    pub measurement_id: Option<String>,
    pub series_date: Option<String>,
    pub series_time: Option<String>,
    /// one of `HFP`, `HFS`, `HFDR`, `HFDL`, `FFP`, `FFS`, `FFDR`, `FFDL`
    pub patient_position: String,
    pub relative_table_position: Option<ThreeDimensionalFloat>,
    pub initial_series_number: Option<i64>,
    pub protocol_name: Option<String>,
    pub sequence_name: Option<String>,
    pub series_description: Option<String>,
    pub measurement_dependency: Vec<MeasurementDependency>,
    pub series_instance_uid_root: Option<String>,
    pub frame_of_reference_uid: Option<String>,
    pub referenced_image_sequence: Vec<ReferencedImage>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoilLabel {
    pub coil_number: u16,
    pub coil_name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AcquisitionSystemInformation {
    pub system_vendor: Option<String>,
    pub system_model: Option<String>,
    pub system_field_strength_t: Option<f32>,
    pub relative_receiver_noise_bandwidth: Option<f32>,
    pub receiver_channels: Option<u16>,
    pub coil_label: Vec<CoilLabel>,
    pub institution_name: Option<String>,
    pub station_name: Option<String>,
    pub device_id: Option<String>,
    pub device_serial_number: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExperimentalConditions {
    pub h1_resonance_frequency_hz: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatrixSize {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldOfView {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EncodingSpace {
    pub matrix_size: MatrixSize,
    pub field_of_view_mm: FieldOfView,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Limit {
    pub minimum: u16,
    pub maximum: u16,
    pub center: u16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodingLimits {
    pub kspace_encoding_step_0: Option<Limit>,
    pub kspace_encoding_step_1: Option<Limit>,
    pub kspace_encoding_step_2: Option<Limit>,
    pub average: Option<Limit>,
    pub slice: Option<Limit>,
    pub contrast: Option<Limit>,
    pub phase: Option<Limit>,
    pub repetition: Option<Limit>,
    pub set: Option<Limit>,
    pub segment: Option<Limit>,
    pub user: [Option<Limit>; USER_LIMITS],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterLong {
    pub name: String,
    pub value: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterDouble {
    pub name: String,
    pub value: f64,
}

/// Also used for base64 parameters, which ISMRMRD stores as plain strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameterString {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrajectoryDescription {
    pub identifier: String,
    pub user_parameter_long: Vec<UserParameterLong>,
    pub user_parameter_double: Vec<UserParameterDouble>,
    pub user_parameter_string: Vec<UserParameterString>,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccelerationFactor {
    pub kspace_encoding_step_1: u16,
    pub kspace_encoding_step_2: u16,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultibandSpacing {
    pub d_z: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Multiband {
    pub spacing: Vec<MultibandSpacing>,
    pub delta_kz: f32,
    pub multiband_factor: u32,
    /// `separable2D`, `full3D` or `other`
    pub calibration: String,
    pub calibration_encoding: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParallelImaging {
    pub acceleration_factor: AccelerationFactor,
    pub calibration_mode: Option<String>,
    pub interleaving_dimension: Option<String>,
    pub multiband: Option<Multiband>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoding {
    pub encoded_space: EncodingSpace,
    pub recon_space: EncodingSpace,
    pub encoding_limits: EncodingLimits,
    /// `cartesian`, `epi`, `radial`, `goldenangle`, `spiral` or `other`
    pub trajectory: String,
    pub trajectory_description: Option<TrajectoryDescription>,
    pub parallel_imaging: Option<ParallelImaging>,
    pub echo_train_length: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradientDirection {
    pub rl: f32,
    pub ap: f32,
    pub fh: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Diffusion {
    pub gradient_direction: GradientDirection,
    pub bvalue: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceParameters {
    pub tr: Vec<f32>,
    pub te: Vec<f32>,
    pub ti: Vec<f32>,
    pub flip_angle_deg: Vec<f32>,
    pub sequence_type: Option<String>,
    pub echo_spacing: Vec<f32>,
    pub diffusion_dimension: Option<String>,
    pub diffusion: Vec<Diffusion>,
    pub diffusion_scheme: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserParameters {
    pub user_parameter_long: Vec<UserParameterLong>,
    pub user_parameter_double: Vec<UserParameterDouble>,
    pub user_parameter_string: Vec<UserParameterString>,
    pub user_parameter_base64: Vec<UserParameterString>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveformInformation {
    pub waveform_name: String,
    /// `ecg`, `pulse`, `respiratory`, `trigger`, `gradientwaveform` or `other`
    pub waveform_type: String,
    pub user_parameters: Option<UserParameters>,
}
