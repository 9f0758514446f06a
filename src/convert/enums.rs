//! Lookup tables between the legacy XML spellings and the MRD enumerations.

use std::borrow::Borrow;

use crate::error::{Error, Result};
use crate::mrd::{
    Calibration, CalibrationMode, DiffusionDimension, ImageType, InterleavingDimension, PatientGender,
    PatientPosition, Trajectory, WaveformType,
};

/// A fixed bijection between legacy values `K` and MRD values `E`.
pub struct EnumTable<K: 'static, E: 'static> {
    pub kind: &'static str,
    pub entries: &'static [(K, E)],
}

impl<K: PartialEq + Copy, E: PartialEq + Copy> EnumTable<K, E> {
    pub fn to_mrd<Q>(&self, key: &Q) -> Result<E>
    where
        K: Borrow<Q>,
        Q: PartialEq + std::fmt::Display + ?Sized,
    {
        self.entries
            .iter()
            .find(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
            .map(|&(_, e)| e)
            .ok_or_else(|| Error::unknown(self.kind, key))
    }

    pub fn to_ismrmrd(&self, value: E) -> Result<K>
    where
        E: std::fmt::Debug,
    {
        self.entries
            .iter()
            .find(|(_, e)| *e == value)
            .map(|&(k, _)| k)
            .ok_or_else(|| Error::unknown(self.kind, format!("{value:?}")))
    }
}

pub const PATIENT_GENDER: EnumTable<&str, PatientGender> = EnumTable {
    kind: "patient gender",
    entries: &[("M", PatientGender::M), ("F", PatientGender::F), ("O", PatientGender::O)],
};

pub const PATIENT_POSITION: EnumTable<&str, PatientPosition> = EnumTable {
    kind: "patient position",
    entries: &[
        ("HFP", PatientPosition::HFP),
        ("HFS", PatientPosition::HFS),
        ("HFDR", PatientPosition::HFDR),
        ("HFDL", PatientPosition::HFDL),
        ("FFP", PatientPosition::FFP),
        ("FFS", PatientPosition::FFS),
        ("FFDR", PatientPosition::FFDR),
        ("FFDL", PatientPosition::FFDL),
    ],
};

pub const TRAJECTORY: EnumTable<&str, Trajectory> = EnumTable {
    kind: "trajectory",
    entries: &[
        ("cartesian", Trajectory::Cartesian),
        ("epi", Trajectory::Epi),
        ("radial", Trajectory::Radial),
        ("goldenangle", Trajectory::Goldenangle),
        ("spiral", Trajectory::Spiral),
        ("other", Trajectory::Other),
    ],
};

pub const CALIBRATION_MODE: EnumTable<&str, CalibrationMode> = EnumTable {
    kind: "calibration mode",
    entries: &[
        ("embedded", CalibrationMode::Embedded),
        ("interleaved", CalibrationMode::Interleaved),
        ("separate", CalibrationMode::Separate),
        ("external", CalibrationMode::External),
        ("other", CalibrationMode::Other),
    ],
};

pub const INTERLEAVING_DIMENSION: EnumTable<&str, InterleavingDimension> = EnumTable {
    kind: "interleaving dimension",
    entries: &[
        ("phase", InterleavingDimension::Phase),
        ("repetition", InterleavingDimension::Repetition),
        ("contrast", InterleavingDimension::Contrast),
        ("average", InterleavingDimension::Average),
        ("other", InterleavingDimension::Other),
    ],
};

pub const MULTIBAND_CALIBRATION: EnumTable<&str, Calibration> = EnumTable {
    kind: "multiband calibration",
    entries: &[
        ("separable2D", Calibration::Separable2d),
        ("full3D", Calibration::Full3d),
        ("other", Calibration::Other),
    ],
};

pub const DIFFUSION_DIMENSION: EnumTable<&str, DiffusionDimension> = EnumTable {
    kind: "diffusion dimension",
    entries: &[
        ("average", DiffusionDimension::Average),
        ("contrast", DiffusionDimension::Contrast),
        ("phase", DiffusionDimension::Phase),
        ("repetition", DiffusionDimension::Repetition),
        ("set", DiffusionDimension::Set),
        ("segment", DiffusionDimension::Segment),
        ("user_0", DiffusionDimension::User0),
        ("user_1", DiffusionDimension::User1),
        ("user_2", DiffusionDimension::User2),
        ("user_3", DiffusionDimension::User3),
        ("user_4", DiffusionDimension::User4),
        ("user_5", DiffusionDimension::User5),
        ("user_6", DiffusionDimension::User6),
        ("user_7", DiffusionDimension::User7),
    ],
};

pub const WAVEFORM_TYPE: EnumTable<&str, WaveformType> = EnumTable {
    kind: "waveform type",
    entries: &[
        ("ecg", WaveformType::Ecg),
        ("pulse", WaveformType::Pulse),
        ("respiratory", WaveformType::Respiratory),
        ("trigger", WaveformType::Trigger),
        ("gradientwaveform", WaveformType::Gradientwaveform),
        ("other", WaveformType::Other),
    ],
};

/// legacy image header codes
pub const IMAGE_TYPE: EnumTable<u16, ImageType> = EnumTable {
    kind: "image type",
    entries: &[
        (1, ImageType::Magnitude),
        (2, ImageType::Phase),
        (3, ImageType::Real),
        (4, ImageType::Imag),
        (5, ImageType::Complex),
    ],
};
