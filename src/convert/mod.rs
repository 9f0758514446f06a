//! Mapping between the legacy ISMRMRD model and the MRD model, one function per entity and direction.
//! Each item is mapped completely before anything is written, so a failing item leaves no
//! partial output behind.

pub mod counters;
pub mod enums;
pub mod header_to_ismrmrd;
pub mod header_to_mrd;
pub mod items;

pub use header_to_ismrmrd::header_to_ismrmrd;
pub use header_to_mrd::header_to_mrd;
pub use items::{
    acquisition_to_ismrmrd, acquisition_to_mrd, any_image_to_ismrmrd, any_image_to_mrd, waveform_to_ismrmrd,
    waveform_to_mrd,
};

/// xs:date
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// xs:time, fractional seconds only when present
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
