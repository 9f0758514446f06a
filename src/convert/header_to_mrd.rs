//! ISMRMRD header -> MRD header.

use chrono::{NaiveDate, NaiveTime};

use super::counters::limits_to_mrd;
use super::enums::*;
use super::{DATE_FORMAT, TIME_FORMAT};
use crate::error::{Error, Result};
use crate::ismrmrd as src;
use crate::mrd as dst;

pub fn header_to_mrd(h: &src::IsmrmrdHeader) -> Result<dst::Header> {
    if h.encoding.is_empty() {
        return Err(Error::MissingEncoding);
    }
    Ok(dst::Header {
        version: h.version,
        subject_information: h.subject_information.as_ref().map(subject_information).transpose()?,
        study_information: h.study_information.as_ref().map(study_information).transpose()?,
        measurement_information: h
            .measurement_information
            .as_ref()
            .map(measurement_information)
            .transpose()?,
        acquisition_system_information: h
            .acquisition_system_information
            .as_ref()
            .map(acquisition_system_information),
        experimental_conditions: dst::ExperimentalConditionsType {
            h1resonance_frequency_hz: h.experimental_conditions.h1_resonance_frequency_hz,
        },
        encoding: h.encoding.iter().map(encoding).collect::<Result<_>>()?,
        sequence_parameters: h.sequence_parameters.as_ref().map(sequence_parameters).transpose()?,
        user_parameters: h.user_parameters.as_ref().map(user_parameters),
        waveform_information: h
            .waveform_information
            .iter()
            .map(waveform_information)
            .collect::<Result<_>>()?,
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| Error::InvalidTime(s.to_string()))
}

fn date(s: &Option<String>) -> Result<Option<NaiveDate>> {
    s.as_deref().map(parse_date).transpose()
}

fn time(s: &Option<String>) -> Result<Option<NaiveTime>> {
    s.as_deref().map(parse_time).transpose()
}

pub fn subject_information(s: &src::SubjectInformation) -> Result<dst::SubjectInformationType> {
    Ok(dst::SubjectInformationType {
        patient_name: s.patient_name.clone(),
        patient_weight_kg: s.patient_weight_kg,
        patient_height_m: s.patient_height_m,
        patient_id: s.patient_id.clone(),
        patient_birthdate: date(&s.patient_birthdate)?,
        patient_gender: s
            .patient_gender
            .as_deref()
            .map(|g| PATIENT_GENDER.to_mrd(g))
            .transpose()?,
    })
}

pub fn study_information(s: &src::StudyInformation) -> Result<dst::StudyInformationType> {
    Ok(dst::StudyInformationType {
        study_date: date(&s.study_date)?,
        study_time: time(&s.study_time)?,
        study_id: s.study_id.clone(),
        accession_number: s.accession_number,
        referring_physician_name: s.referring_physician_name.clone(),
        study_description: s.study_description.clone(),
        study_instance_uid: s.study_instance_uid.clone(),
        body_part_examined: s.body_part_examined.clone(),
    })
}

fn three_dimensional_float(v: &src::ThreeDimensionalFloat) -> dst::ThreeDimensionalFloat {
    dst::ThreeDimensionalFloat { x: v.x, y: v.y, z: v.z }
}

pub fn measurement_information(m: &src::MeasurementInformation) -> Result<dst::MeasurementInformationType> {
    // every legacy entry carries one UID; they are gathered into a single sequence
    let referenced_image_sequence = (!m.referenced_image_sequence.is_empty()).then(|| {
        dst::ReferencedImageSequenceType {
            referenced_sop_instance_uid: m
                .referenced_image_sequence
                .iter()
                .map(|r| r.referenced_sop_instance_uid.clone())
                .collect(),
        }
    });
    Ok(dst::MeasurementInformationType {
        measurement_id: m.measurement_id.clone(),
        series_date: date(&m.series_date)?,
        series_time: time(&m.series_time)?,
        patient_position: PATIENT_POSITION.to_mrd(m.patient_position.as_str())?,
        relative_table_position: m.relative_table_position.as_ref().map(three_dimensional_float),
        initial_series_number: m.initial_series_number,
        protocol_name: m.protocol_name.clone(),
        sequence_name: m.sequence_name.clone(),
        series_description: m.series_description.clone(),
        measurement_dependency: m
            .measurement_dependency
            .iter()
            .map(|d| dst::MeasurementDependencyType {
                dependency_type: d.dependency_type.clone(),
                measurement_id: d.measurement_id.clone(),
            })
            .collect(),
        series_instance_uid_root: m.series_instance_uid_root.clone(),
        frame_of_reference_uid: m.frame_of_reference_uid.clone(),
        referenced_image_sequence,
    })
}

pub fn acquisition_system_information(a: &src::AcquisitionSystemInformation) -> dst::AcquisitionSystemInformationType {
    dst::AcquisitionSystemInformationType {
        system_vendor: a.system_vendor.clone(),
        system_model: a.system_model.clone(),
        system_field_strength_t: a.system_field_strength_t,
        relative_receiver_noise_bandwidth: a.relative_receiver_noise_bandwidth,
        receiver_channels: a.receiver_channels.map(u32::from),
        coil_label: a
            .coil_label
            .iter()
            .map(|c| dst::CoilLabelType {
                coil_number: c.coil_number.into(),
                coil_name: c.coil_name.clone(),
            })
            .collect(),
        institution_name: a.institution_name.clone(),
        station_name: a.station_name.clone(),
        device_id: a.device_id.clone(),
        device_serial_number: a.device_serial_number.clone(),
    }
}

fn encoding_space(e: &src::EncodingSpace) -> dst::EncodingSpaceType {
    dst::EncodingSpaceType {
        matrix_size: dst::MatrixSizeType {
            x: e.matrix_size.x.into(),
            y: e.matrix_size.y.into(),
            z: e.matrix_size.z.into(),
        },
        field_of_view_mm: dst::FieldOfViewMm {
            x: e.field_of_view_mm.x,
            y: e.field_of_view_mm.y,
            z: e.field_of_view_mm.z,
        },
    }
}

fn user_parameter_long(p: &src::UserParameterLong) -> dst::UserParameterLongType {
    dst::UserParameterLongType {
        name: p.name.clone(),
        value: p.value,
    }
}

fn user_parameter_double(p: &src::UserParameterDouble) -> dst::UserParameterDoubleType {
    dst::UserParameterDoubleType {
        name: p.name.clone(),
        value: p.value,
    }
}

fn user_parameter_string(p: &src::UserParameterString) -> dst::UserParameterStringType {
    dst::UserParameterStringType {
        name: p.name.clone(),
        value: p.value.clone(),
    }
}

fn user_parameter_base64(p: &src::UserParameterString) -> dst::UserParameterBase64Type {
    dst::UserParameterBase64Type {
        name: p.name.clone(),
        value: p.value.clone(),
    }
}

pub fn trajectory_description(t: &src::TrajectoryDescription) -> dst::TrajectoryDescriptionType {
    dst::TrajectoryDescriptionType {
        identifier: t.identifier.clone(),
        user_parameter_long: t.user_parameter_long.iter().map(user_parameter_long).collect(),
        user_parameter_double: t.user_parameter_double.iter().map(user_parameter_double).collect(),
        user_parameter_string: t.user_parameter_string.iter().map(user_parameter_string).collect(),
        comment: t.comment.clone(),
    }
}

pub fn multiband(m: &src::Multiband) -> Result<dst::MultibandType> {
    Ok(dst::MultibandType {
        spacing: m
            .spacing
            .iter()
            .map(|s| dst::MultibandSpacingType { d_z: s.d_z.clone() })
            .collect(),
        delta_kz: m.delta_kz,
        multiband_factor: m.multiband_factor,
        calibration: MULTIBAND_CALIBRATION.to_mrd(m.calibration.as_str())?,
        calibration_encoding: m.calibration_encoding,
    })
}

pub fn parallel_imaging(p: &src::ParallelImaging) -> Result<dst::ParallelImagingType> {
    Ok(dst::ParallelImagingType {
        acceleration_factor: dst::AccelerationFactorType {
            kspace_encoding_step_1: p.acceleration_factor.kspace_encoding_step_1.into(),
            kspace_encoding_step_2: p.acceleration_factor.kspace_encoding_step_2.into(),
        },
        calibration_mode: p
            .calibration_mode
            .as_deref()
            .map(|m| CALIBRATION_MODE.to_mrd(m))
            .transpose()?,
        interleaving_dimension: p
            .interleaving_dimension
            .as_deref()
            .map(|d| INTERLEAVING_DIMENSION.to_mrd(d))
            .transpose()?,
        multiband: p.multiband.as_ref().map(multiband).transpose()?,
    })
}

pub fn encoding(e: &src::Encoding) -> Result<dst::EncodingType> {
    Ok(dst::EncodingType {
        encoded_space: encoding_space(&e.encoded_space),
        recon_space: encoding_space(&e.recon_space),
        encoding_limits: limits_to_mrd(&e.encoding_limits),
        trajectory: TRAJECTORY.to_mrd(e.trajectory.as_str())?,
        trajectory_description: e.trajectory_description.as_ref().map(trajectory_description),
        parallel_imaging: e.parallel_imaging.as_ref().map(parallel_imaging).transpose()?,
        echo_train_length: e.echo_train_length,
    })
}

pub fn sequence_parameters(s: &src::SequenceParameters) -> Result<dst::SequenceParametersType> {
    Ok(dst::SequenceParametersType {
        t_r: s.tr.clone(),
        t_e: s.te.clone(),
        t_i: s.ti.clone(),
        flip_angle_deg: s.flip_angle_deg.clone(),
        sequence_type: s.sequence_type.clone(),
        echo_spacing: s.echo_spacing.clone(),
        diffusion_dimension: s
            .diffusion_dimension
            .as_deref()
            .map(|d| DIFFUSION_DIMENSION.to_mrd(d))
            .transpose()?,
        diffusion: s
            .diffusion
            .iter()
            .map(|d| dst::DiffusionType {
                gradient_direction: dst::GradientDirectionType {
                    rl: d.gradient_direction.rl,
                    ap: d.gradient_direction.ap,
                    fh: d.gradient_direction.fh,
                },
                bvalue: d.bvalue,
            })
            .collect(),
        diffusion_scheme: s.diffusion_scheme.clone(),
    })
}

pub fn user_parameters(u: &src::UserParameters) -> dst::UserParametersType {
    dst::UserParametersType {
        user_parameter_long: u.user_parameter_long.iter().map(user_parameter_long).collect(),
        user_parameter_double: u.user_parameter_double.iter().map(user_parameter_double).collect(),
        user_parameter_string: u.user_parameter_string.iter().map(user_parameter_string).collect(),
        user_parameter_base64: u.user_parameter_base64.iter().map(user_parameter_base64).collect(),
    }
}

pub fn waveform_information(w: &src::WaveformInformation) -> Result<dst::WaveformInformationType> {
    Ok(dst::WaveformInformationType {
        waveform_name: w.waveform_name.clone(),
        waveform_type: WAVEFORM_TYPE.to_mrd(w.waveform_type.as_str())?,
        user_parameters: w.user_parameters.as_ref().map(user_parameters).unwrap_or_default(),
    })
}
