//! XML (de)serialization of the ISMRMRD header.
//!
//! Documents are parsed into a small element tree with `quick-xml` and the header structs are
//! mapped onto that tree field by field. Element order follows the ISMRMRD schema.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::header::*;
use crate::error::{Error, Result};

pub const ISMRMRD_NAMESPACE: &str = "http://www.ismrm.org/ISMRMRD";
const ROOT: &str = "ismrmrdHeader";

/// An element with its text content and child elements. Attributes are not retained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::MalformedXml(e.to_string())
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        XmlNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        XmlNode {
            name: name.into(),
            text: text.into(),
            children: vec![],
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a document into its root element; namespace prefixes are dropped. Text of leaf
    /// elements is kept verbatim, text between child elements is discarded.
    pub fn parse(xml: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlNode> = vec![];
        let mut root = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    stack.push(XmlNode::new(String::from_utf8_lossy(e.local_name().as_ref())));
                }
                Event::Empty(e) => {
                    let node = XmlNode::new(String::from_utf8_lossy(e.local_name().as_ref()));
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let mut node = stack.pop().ok_or_else(|| xml_error("unbalanced end tag"))?;
                    if !node.children.is_empty() {
                        node.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(xml_error)?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(xml_error("unexpected end of document"));
        }
        root.ok_or_else(|| xml_error("empty document"))
    }

    fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        } else if root.is_none() {
            *root = Some(node);
        } else {
            return Err(xml_error("more than one root element"));
        }
        Ok(())
    }

    /// serialize as a document, putting `attributes` on the root element
    pub fn to_document(&self, attributes: &[(&str, &str)]) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        self.write(&mut writer, attributes)?;
        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for &attr in attributes {
            start.push_attribute(attr);
        }
        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }
        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(xml_error)?;
        }
        for child in &self.children {
            child.write(writer, &[])?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

/// A value that maps onto one XML element.
pub(crate) trait XmlRecord: Sized {
    fn to_node(&self, name: &str) -> XmlNode;
    fn from_node(node: &XmlNode) -> Result<Self>;
}

macro_rules! xml_text {
    ($($t:ty),*) => {
        $(
            impl XmlRecord for $t {
                fn to_node(&self, name: &str) -> XmlNode {
                    XmlNode::leaf(name, self.to_string())
                }
                fn from_node(node: &XmlNode) -> Result<Self> {
                    node.text.trim().parse().map_err(|_| Error::InvalidValue {
                        element: node.name.clone(),
                        value: node.text.clone(),
                    })
                }
            }
        )*
    };
}

xml_text!(i64, u16, u32, u64, f32, f64);

impl XmlRecord for String {
    fn to_node(&self, name: &str) -> XmlNode {
        XmlNode::leaf(name, self.as_str())
    }
    fn from_node(node: &XmlNode) -> Result<Self> {
        Ok(node.text.clone())
    }
}

pub(crate) fn required<T: XmlRecord>(node: &XmlNode, element: &'static str) -> Result<T> {
    match node.child(element) {
        Some(child) => T::from_node(child),
        None => Err(Error::MissingElement {
            parent: node.name.clone(),
            element,
        }),
    }
}

pub(crate) fn optional<T: XmlRecord>(node: &XmlNode, element: &str) -> Result<Option<T>> {
    node.child(element).map(T::from_node).transpose()
}

pub(crate) fn repeated<T: XmlRecord>(node: &XmlNode, element: &str) -> Result<Vec<T>> {
    node.children_named(element).map(T::from_node).collect()
}

/// Implements [`XmlRecord`] for a struct from a list of `kind field: "element"` entries, where
/// kind is `req` (exactly one element), `opt` (zero or one) or `many` (zero or more). `uids` is
/// the referenced image sequence, read by [`referenced_images`].
macro_rules! xml_record {
    ($ty:ident { $($kind:ident $field:ident : $element:literal),* $(,)? }) => {
        impl XmlRecord for $ty {
            fn to_node(&self, name: &str) -> XmlNode {
                let mut node = XmlNode::new(name);
                $( xml_record!(@put $kind node, $element, &self.$field); )*
                node
            }
            fn from_node(node: &XmlNode) -> Result<Self> {
                Ok($ty {
                    $( $field: xml_record!(@get $kind node, $element), )*
                })
            }
        }
    };
    (@put req $node:ident, $element:literal, $value:expr) => {
        $node.children.push(XmlRecord::to_node($value, $element))
    };
    (@put opt $node:ident, $element:literal, $value:expr) => {
        if let Some(v) = $value {
            $node.children.push(XmlRecord::to_node(v, $element))
        }
    };
    (@put many $node:ident, $element:literal, $value:expr) => {
        for v in $value.iter() {
            $node.children.push(XmlRecord::to_node(v, $element))
        }
    };
    (@get req $node:ident, $element:literal) => { required($node, $element)? };
    (@get opt $node:ident, $element:literal) => { optional($node, $element)? };
    (@get many $node:ident, $element:literal) => { repeated($node, $element)? };
    (@put uids $node:ident, $element:literal, $value:expr) => {
        xml_record!(@put many $node, $element, $value)
    };
    (@get uids $node:ident, $element:literal) => { referenced_images($node, $element)? };
}

xml_record!(IsmrmrdHeader {
    opt version: "version",
    opt subject_information: "subjectInformation",
    opt study_information: "studyInformation",
    opt measurement_information: "measurementInformation",
    opt acquisition_system_information: "acquisitionSystemInformation",
    req experimental_conditions: "experimentalConditions",
    many encoding: "encoding",
    opt sequence_parameters: "sequenceParameters",
    opt user_parameters: "userParameters",
    many waveform_information: "waveformInformation",
});

xml_record!(SubjectInformation {
    opt patient_name: "patientName",
    opt patient_weight_kg: "patientWeight_kg",
    opt patient_height_m: "patientHeight_m",
    opt patient_id: "patientID",
    opt patient_birthdate: "patientBirthdate",
    opt patient_gender: "patientGender",
});

xml_record!(StudyInformation {
    opt study_date: "studyDate",
    opt study_time: "studyTime",
    opt study_id: "studyID",
    opt accession_number: "accessionNumber",
    opt referring_physician_name: "referringPhysicianName",
    opt study_description: "studyDescription",
    opt study_instance_uid: "studyInstanceUID",
    opt body_part_examined: "bodyPartExamined",
});

xml_record!(MeasurementDependency {
    req dependency_type: "dependencyType",
    req measurement_id: "measurementID",
});

xml_record!(ThreeDimensionalFloat {
    req x: "x",
    req y: "y",
    req z: "z",
});

xml_record!(MeasurementInformation {
    opt measurement_id: "measurementID",
    opt series_date: "seriesDate",
    opt series_time: "seriesTime",
    req patient_position: "patientPosition",
    opt relative_table_position: "relativeTablePosition",
    opt initial_series_number: "initialSeriesNumber",
    opt protocol_name: "protocolName",
    opt sequence_name: "sequenceName",
    opt series_description: "seriesDescription",
    many measurement_dependency: "measurementDependency",
    opt series_instance_uid_root: "seriesInstanceUIDRoot",
    opt frame_of_reference_uid: "frameOfReferenceUID",
    uids referenced_image_sequence: "referencedImageSequence",
});

xml_record!(CoilLabel {
    req coil_number: "coilNumber",
    req coil_name: "coilName",
});

xml_record!(AcquisitionSystemInformation {
    opt system_vendor: "systemVendor",
    opt system_model: "systemModel",
    opt system_field_strength_t: "systemFieldStrength_T",
    opt relative_receiver_noise_bandwidth: "relativeReceiverNoiseBandwidth",
    opt receiver_channels: "receiverChannels",
    many coil_label: "coilLabel",
    opt institution_name: "institutionName",
    opt station_name: "stationName",
    opt device_id: "deviceID",
    opt device_serial_number: "deviceSerialNumber",
});

xml_record!(ExperimentalConditions {
    req h1_resonance_frequency_hz: "H1resonanceFrequency_Hz",
});

xml_record!(MatrixSize {
    req x: "x",
    req y: "y",
    req z: "z",
});

xml_record!(FieldOfView {
    req x: "x",
    req y: "y",
    req z: "z",
});

xml_record!(EncodingSpace {
    req matrix_size: "matrixSize",
    req field_of_view_mm: "fieldOfView_mm",
});

xml_record!(Limit {
    req minimum: "minimum",
    req maximum: "maximum",
    req center: "center",
});

const USER_LIMIT_ELEMENTS: [&str; USER_LIMITS] =
    ["user_0", "user_1", "user_2", "user_3", "user_4", "user_5", "user_6", "user_7"];

// the user limits are an array on our side and eight distinct elements in the document
impl XmlRecord for EncodingLimits {
    fn to_node(&self, name: &str) -> XmlNode {
        let mut node = XmlNode::new(name);
        let named = [
            ("kspace_encoding_step_0", &self.kspace_encoding_step_0),
            ("kspace_encoding_step_1", &self.kspace_encoding_step_1),
            ("kspace_encoding_step_2", &self.kspace_encoding_step_2),
            ("average", &self.average),
            ("slice", &self.slice),
            ("contrast", &self.contrast),
            ("phase", &self.phase),
            ("repetition", &self.repetition),
            ("set", &self.set),
            ("segment", &self.segment),
        ];
        let user = USER_LIMIT_ELEMENTS.iter().copied().zip(self.user.iter());
        for (element, limit) in named.into_iter().chain(user) {
            if let Some(limit) = limit {
                node.children.push(limit.to_node(element));
            }
        }
        node
    }

    fn from_node(node: &XmlNode) -> Result<Self> {
        let mut user = [None; USER_LIMITS];
        for (slot, element) in user.iter_mut().zip(USER_LIMIT_ELEMENTS) {
            *slot = optional(node, element)?;
        }
        Ok(EncodingLimits {
            kspace_encoding_step_0: optional(node, "kspace_encoding_step_0")?,
            kspace_encoding_step_1: optional(node, "kspace_encoding_step_1")?,
            kspace_encoding_step_2: optional(node, "kspace_encoding_step_2")?,
            average: optional(node, "average")?,
            slice: optional(node, "slice")?,
            contrast: optional(node, "contrast")?,
            phase: optional(node, "phase")?,
            repetition: optional(node, "repetition")?,
            set: optional(node, "set")?,
            segment: optional(node, "segment")?,
            user,
        })
    }
}

xml_record!(UserParameterLong {
    req name: "name",
    req value: "value",
});

xml_record!(UserParameterDouble {
    req name: "name",
    req value: "value",
});

xml_record!(UserParameterString {
    req name: "name",
    req value: "value",
});

xml_record!(TrajectoryDescription {
    req identifier: "identifier",
    many user_parameter_long: "userParameterLong",
    many user_parameter_double: "userParameterDouble",
    many user_parameter_string: "userParameterString",
    opt comment: "comment",
});

xml_record!(AccelerationFactor {
    req kspace_encoding_step_1: "kspace_encoding_step_1",
    req kspace_encoding_step_2: "kspace_encoding_step_2",
});

xml_record!(MultibandSpacing {
    many d_z: "dZ",
});

xml_record!(Multiband {
    many spacing: "spacing",
    req delta_kz: "deltaKz",
    req multiband_factor: "multiband_factor",
    req calibration: "calibration",
    req calibration_encoding: "calibration_encoding",
});

xml_record!(ParallelImaging {
    req acceleration_factor: "accelerationFactor",
    opt calibration_mode: "calibrationMode",
    opt interleaving_dimension: "interleavingDimension",
    opt multiband: "multiband",
});

xml_record!(Encoding {
    req encoded_space: "encodedSpace",
    req recon_space: "reconSpace",
    req encoding_limits: "encodingLimits",
    req trajectory: "trajectory",
    opt trajectory_description: "trajectoryDescription",
    opt parallel_imaging: "parallelImaging",
    opt echo_train_length: "echoTrainLength",
});

xml_record!(GradientDirection {
    req rl: "rl",
    req ap: "ap",
    req fh: "fh",
});

xml_record!(Diffusion {
    req gradient_direction: "gradientDirection",
    req bvalue: "bvalue",
});

xml_record!(SequenceParameters {
    many tr: "TR",
    many te: "TE",
    many ti: "TI",
    many flip_angle_deg: "flipAngle_deg",
    opt sequence_type: "sequence_type",
    many echo_spacing: "echo_spacing",
    opt diffusion_dimension: "diffusionDimension",
    many diffusion: "diffusion",
    opt diffusion_scheme: "diffusionScheme",
});

xml_record!(UserParameters {
    many user_parameter_long: "userParameterLong",
    many user_parameter_double: "userParameterDouble",
    many user_parameter_string: "userParameterString",
    many user_parameter_base64: "userParameterBase64",
});

xml_record!(WaveformInformation {
    req waveform_name: "waveformName",
    req waveform_type: "waveformType",
    opt user_parameters: "userParameters",
});

impl XmlRecord for ReferencedImage {
    fn to_node(&self, name: &str) -> XmlNode {
        let mut node = XmlNode::new(name);
        node.children
            .push(self.referenced_sop_instance_uid.to_node("referencedSOPInstanceUID"));
        node
    }

    fn from_node(node: &XmlNode) -> Result<Self> {
        Ok(ReferencedImage {
            referenced_sop_instance_uid: required(node, "referencedSOPInstanceUID")?,
        })
    }
}

// A sequence element may hold zero or several UIDs even though ISMRMRD models one per element.
// Every UID becomes its own entry.
fn referenced_images(node: &XmlNode, element: &str) -> Result<Vec<ReferencedImage>> {
    node.children_named(element)
        .flat_map(|seq| seq.children_named("referencedSOPInstanceUID"))
        .map(|uid| {
            Ok(ReferencedImage {
                referenced_sop_instance_uid: String::from_node(uid)?,
            })
        })
        .collect()
}

impl IsmrmrdHeader {
    /// parse an `ismrmrdHeader` document
    pub fn from_xml(xml: &str) -> Result<IsmrmrdHeader> {
        let root = XmlNode::parse(xml)?;
        if root.name != ROOT {
            return Err(Error::MalformedXml(format!(
                "expected <{ROOT}> root element, found <{}>",
                root.name
            )));
        }
        IsmrmrdHeader::from_node(&root)
    }

    /// serialize as an `ismrmrdHeader` document
    pub fn to_xml(&self) -> Result<String> {
        self.to_node(ROOT).to_document(&[
            ("xmlns", ISMRMRD_NAMESPACE),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ("xmlns:xs", "http://www.w3.org/2001/XMLSchema"),
        ])
    }
}
