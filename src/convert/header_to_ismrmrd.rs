//! MRD header -> ISMRMRD header.

use super::counters::limits_to_ismrmrd;
use super::enums::*;
use super::{DATE_FORMAT, TIME_FORMAT};
use crate::error::{narrow, Error, Result};
use crate::ismrmrd as dst;
use crate::mrd as src;

pub fn header_to_ismrmrd(h: &src::Header) -> Result<dst::IsmrmrdHeader> {
    if h.encoding.is_empty() {
        return Err(Error::MissingEncoding);
    }
    Ok(dst::IsmrmrdHeader {
        version: h.version,
        subject_information: h.subject_information.as_ref().map(subject_information).transpose()?,
        study_information: h.study_information.as_ref().map(study_information),
        measurement_information: h
            .measurement_information
            .as_ref()
            .map(measurement_information)
            .transpose()?,
        acquisition_system_information: h
            .acquisition_system_information
            .as_ref()
            .map(acquisition_system_information)
            .transpose()?,
        experimental_conditions: dst::ExperimentalConditions {
            h1_resonance_frequency_hz: h.experimental_conditions.h1resonance_frequency_hz,
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

fn date(d: &Option<chrono::NaiveDate>) -> Option<String> {
    d.map(|d| d.format(DATE_FORMAT).to_string())
}

fn time(t: &Option<chrono::NaiveTime>) -> Option<String> {
    t.map(|t| t.format(TIME_FORMAT).to_string())
}

pub fn subject_information(s: &src::SubjectInformationType) -> Result<dst::SubjectInformation> {
    Ok(dst::SubjectInformation {
        patient_name: s.patient_name.clone(),
        patient_weight_kg: s.patient_weight_kg,
        patient_height_m: s.patient_height_m,
        patient_id: s.patient_id.clone(),
        patient_birthdate: date(&s.patient_birthdate),
        patient_gender: s
            .patient_gender
            .map(|g| PATIENT_GENDER.to_ismrmrd(g).map(str::to_string))
            .transpose()?,
    })
}

pub fn study_information(s: &src::StudyInformationType) -> dst::StudyInformation {
    dst::StudyInformation {
        study_date: date(&s.study_date),
        study_time: time(&s.study_time),
        study_id: s.study_id.clone(),
        accession_number: s.accession_number,
        referring_physician_name: s.referring_physician_name.clone(),
        study_description: s.study_description.clone(),
        study_instance_uid: s.study_instance_uid.clone(),
        body_part_examined: s.body_part_examined.clone(),
    }
}

pub fn measurement_information(m: &src::MeasurementInformationType) -> Result<dst::MeasurementInformation> {
    Ok(dst::MeasurementInformation {
        measurement_id: m.measurement_id.clone(),
        series_date: date(&m.series_date),
        series_time: time(&m.series_time),
        patient_position: PATIENT_POSITION.to_ismrmrd(m.patient_position)?.to_string(),
        relative_table_position: m.relative_table_position.map(|v| dst::ThreeDimensionalFloat {
            x: v.x,
            y: v.y,
            z: v.z,
        }),
        initial_series_number: m.initial_series_number,
        protocol_name: m.protocol_name.clone(),
        sequence_name: m.sequence_name.clone(),
        series_description: m.series_description.clone(),
        measurement_dependency: m
            .measurement_dependency
            .iter()
            .map(|d| dst::MeasurementDependency {
                dependency_type: d.dependency_type.clone(),
                measurement_id: d.measurement_id.clone(),
            })
            .collect(),
        series_instance_uid_root: m.series_instance_uid_root.clone(),
        frame_of_reference_uid: m.frame_of_reference_uid.clone(),
        // one legacy entry per referenced image
        referenced_image_sequence: m
            .referenced_image_sequence
            .iter()
            .flat_map(|seq| &seq.referenced_sop_instance_uid)
            .map(|uid| dst::ReferencedImage {
                referenced_sop_instance_uid: uid.clone(),
            })
            .collect(),
    })
}

pub fn acquisition_system_information(
    a: &src::AcquisitionSystemInformationType,
) -> Result<dst::AcquisitionSystemInformation> {
    Ok(dst::AcquisitionSystemInformation {
        system_vendor: a.system_vendor.clone(),
        system_model: a.system_model.clone(),
        system_field_strength_t: a.system_field_strength_t,
        relative_receiver_noise_bandwidth: a.relative_receiver_noise_bandwidth,
        receiver_channels: a.receiver_channels.map(|n| narrow("receiver channels", n)).transpose()?,
        coil_label: a
            .coil_label
            .iter()
            .map(|c| -> Result<dst::CoilLabel> {
                Ok(dst::CoilLabel {
                    coil_number: narrow("coil number", c.coil_number)?,
                    coil_name: c.coil_name.clone(),
                })
            })
            .collect::<Result<_>>()?,
        institution_name: a.institution_name.clone(),
        station_name: a.station_name.clone(),
        device_id: a.device_id.clone(),
        device_serial_number: a.device_serial_number.clone(),
    })
}

fn encoding_space(e: &src::EncodingSpaceType) -> Result<dst::EncodingSpace> {
    Ok(dst::EncodingSpace {
        matrix_size: dst::MatrixSize {
            x: narrow("matrix size x", e.matrix_size.x)?,
            y: narrow("matrix size y", e.matrix_size.y)?,
            z: narrow("matrix size z", e.matrix_size.z)?,
        },
        field_of_view_mm: dst::FieldOfView {
            x: e.field_of_view_mm.x,
            y: e.field_of_view_mm.y,
            z: e.field_of_view_mm.z,
        },
    })
}

fn user_parameter_long(p: &src::UserParameterLongType) -> dst::UserParameterLong {
    dst::UserParameterLong {
        name: p.name.clone(),
        value: p.value,
    }
}

fn user_parameter_double(p: &src::UserParameterDoubleType) -> dst::UserParameterDouble {
    dst::UserParameterDouble {
        name: p.name.clone(),
        value: p.value,
    }
}

fn user_parameter_string(p: &src::UserParameterStringType) -> dst::UserParameterString {
    dst::UserParameterString {
        name: p.name.clone(),
        value: p.value.clone(),
    }
}

fn user_parameter_base64(p: &src::UserParameterBase64Type) -> dst::UserParameterString {
    dst::UserParameterString {
        name: p.name.clone(),
        value: p.value.clone(),
    }
}

pub fn trajectory_description(t: &src::TrajectoryDescriptionType) -> dst::TrajectoryDescription {
    dst::TrajectoryDescription {
        identifier: t.identifier.clone(),
        user_parameter_long: t.user_parameter_long.iter().map(user_parameter_long).collect(),
        user_parameter_double: t.user_parameter_double.iter().map(user_parameter_double).collect(),
        user_parameter_string: t.user_parameter_string.iter().map(user_parameter_string).collect(),
        comment: t.comment.clone(),
    }
}

pub fn multiband(m: &src::MultibandType) -> Result<dst::Multiband> {
    Ok(dst::Multiband {
        spacing: m
            .spacing
            .iter()
            .map(|s| dst::MultibandSpacing { d_z: s.d_z.clone() })
            .collect(),
        delta_kz: m.delta_kz,
        multiband_factor: m.multiband_factor,
        calibration: MULTIBAND_CALIBRATION.to_ismrmrd(m.calibration)?.to_string(),
        calibration_encoding: m.calibration_encoding,
    })
}

pub fn parallel_imaging(p: &src::ParallelImagingType) -> Result<dst::ParallelImaging> {
    Ok(dst::ParallelImaging {
        acceleration_factor: dst::AccelerationFactor {
            kspace_encoding_step_1: narrow("acceleration factor", p.acceleration_factor.kspace_encoding_step_1)?,
            kspace_encoding_step_2: narrow("acceleration factor", p.acceleration_factor.kspace_encoding_step_2)?,
        },
        calibration_mode: p
            .calibration_mode
            .map(|m| CALIBRATION_MODE.to_ismrmrd(m).map(str::to_string))
            .transpose()?,
        interleaving_dimension: p
            .interleaving_dimension
            .map(|d| INTERLEAVING_DIMENSION.to_ismrmrd(d).map(str::to_string))
            .transpose()?,
        multiband: p.multiband.as_ref().map(multiband).transpose()?,
    })
}

pub fn encoding(e: &src::EncodingType) -> Result<dst::Encoding> {
    Ok(dst::Encoding {
        encoded_space: encoding_space(&e.encoded_space)?,
        recon_space: encoding_space(&e.recon_space)?,
        encoding_limits: limits_to_ismrmrd(&e.encoding_limits)?,
        trajectory: TRAJECTORY.to_ismrmrd(e.trajectory)?.to_string(),
        trajectory_description: e.trajectory_description.as_ref().map(trajectory_description),
        parallel_imaging: e.parallel_imaging.as_ref().map(parallel_imaging).transpose()?,
        echo_train_length: e.echo_train_length,
    })
}

pub fn sequence_parameters(s: &src::SequenceParametersType) -> Result<dst::SequenceParameters> {
    Ok(dst::SequenceParameters {
        tr: s.t_r.clone(),
        te: s.t_e.clone(),
        ti: s.t_i.clone(),
        flip_angle_deg: s.flip_angle_deg.clone(),
        sequence_type: s.sequence_type.clone(),
        echo_spacing: s.echo_spacing.clone(),
        diffusion_dimension: s
            .diffusion_dimension
            .map(|d| DIFFUSION_DIMENSION.to_ismrmrd(d).map(str::to_string))
            .transpose()?,
        diffusion: s
            .diffusion
            .iter()
            .map(|d| dst::Diffusion {
                gradient_direction: dst::GradientDirection {
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

pub fn user_parameters(u: &src::UserParametersType) -> dst::UserParameters {
    dst::UserParameters {
        user_parameter_long: u.user_parameter_long.iter().map(user_parameter_long).collect(),
        user_parameter_double: u.user_parameter_double.iter().map(user_parameter_double).collect(),
        user_parameter_string: u.user_parameter_string.iter().map(user_parameter_string).collect(),
        user_parameter_base64: u.user_parameter_base64.iter().map(user_parameter_base64).collect(),
    }
}

pub fn waveform_information(w: &src::WaveformInformationType) -> Result<dst::WaveformInformation> {
    Ok(dst::WaveformInformation {
        waveform_name: w.waveform_name.clone(),
        waveform_type: WAVEFORM_TYPE.to_ismrmrd(w.waveform_type)?.to_string(),
        user_parameters: Some(user_parameters(&w.user_parameters)),
    })
}
