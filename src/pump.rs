//! Stream pumps: read one message, map it, write it, repeat.
//!
//! Nothing is written until the header has been mapped, so a header that fails to convert leaves
//! the output untouched. Items are mapped completely before they are written.

use std::fmt;
use std::io::{Read, Write};

use log::{debug, info, trace, warn};

use crate::convert;
use crate::error::{Error, Result};
use crate::ismrmrd::{MessageId, ProtocolReader, ProtocolWriter};
use crate::mrd::{MrdReader, MrdWriter, StreamItem};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PumpState {
    AwaitHeader,
    StreamingItems,
    Closed,
}

impl PumpState {
    fn enter(&mut self, next: PumpState) {
        debug!("{self:?} -> {next:?}");
        *self = next;
    }
}

/// What went through a pump.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub header: bool,
    pub acquisitions: usize,
    pub images: usize,
    pub waveforms: usize,
}

impl Stats {
    fn count(&mut self, item: &StreamItem) {
        match item {
            StreamItem::Acquisition(_) => self.acquisitions += 1,
            StreamItem::Image(_) => self.images += 1,
            StreamItem::Waveform(_) => self.waveforms += 1,
        }
        trace!("item {} converted", self.items());
    }

    pub fn items(&self) -> usize {
        self.acquisitions + self.images + self.waveforms
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} header, {} acquisitions, {} images, {} waveforms",
            if self.header { "with" } else { "no" },
            self.acquisitions,
            self.images,
            self.waveforms
        )
    }
}

/// Convert a legacy ISMRMRD stream into an MRD stream.
///
/// The legacy header is optional: a stream starting directly with a data item produces an MRD
/// stream with an absent header. Anything else in front of the first item is a
/// [`Error::MissingHeader`].
pub fn ismrmrd_to_mrd<R: Read, W: Write>(input: R, output: W) -> Result<Stats> {
    let mut reader = ProtocolReader::new(input);
    let mut state = PumpState::AwaitHeader;
    let mut stats = Stats::default();

    let header = match reader.peek()? {
        MessageId::Header => {
            let legacy = reader.read_header()?;
            debug!("legacy header with {} encoding(s)", legacy.encoding.len());
            Some(convert::header_to_mrd(&legacy)?)
        }
        id @ (MessageId::Acquisition | MessageId::Image | MessageId::Waveform) => {
            warn!("stream starts with {id} instead of a header, writing an absent header");
            None
        }
        id => return Err(Error::MissingHeader(id.code())),
    };
    stats.header = header.is_some();

    let mut writer = MrdWriter::new(output)?;
    writer.write_header(header.as_ref())?;
    state.enter(PumpState::StreamingItems);

    while state == PumpState::StreamingItems {
        let id = reader.peek()?;
        let item = match id {
            MessageId::Acquisition => StreamItem::Acquisition(convert::acquisition_to_mrd(&reader.read_acquisition()?)?),
            MessageId::Image => StreamItem::Image(convert::any_image_to_mrd(&reader.read_image()?)?),
            MessageId::Waveform => StreamItem::Waveform(convert::waveform_to_mrd(&reader.read_waveform()?)?),
            MessageId::Close => {
                reader.read_close()?;
                state.enter(PumpState::Closed);
                continue;
            }
            id => return Err(Error::UnsupportedMessage(id.code().into(), "ISMRMRD stream")),
        };
        trace!("{id} message");
        writer.write_data(&item)?;
        stats.count(&item);
    }

    writer.end_data()?;
    info!("ISMRMRD -> MRD: {stats}");
    Ok(stats)
}

/// Convert an MRD stream into a legacy ISMRMRD stream.
///
/// An absent MRD header produces a legacy stream without a header message.
pub fn mrd_to_ismrmrd<R: Read, W: Write>(input: R, output: W) -> Result<Stats> {
    let mut reader = MrdReader::new(input)?;
    let mut state = PumpState::AwaitHeader;
    let mut stats = Stats::default();

    let header = match reader.read_header()? {
        Some(header) => {
            debug!("MRD header with {} encoding(s)", header.encoding.len());
            Some(convert::header_to_ismrmrd(&header)?)
        }
        None => {
            warn!("MRD stream has no header, writing a legacy stream without one");
            None
        }
    };
    stats.header = header.is_some();

    let mut writer = ProtocolWriter::new(output);
    if let Some(header) = &header {
        writer.write_header(header)?;
    }
    state.enter(PumpState::StreamingItems);

    while state == PumpState::StreamingItems {
        let Some(item) = reader.read_data()? else {
            state.enter(PumpState::Closed);
            continue;
        };
        match &item {
            StreamItem::Acquisition(acq) => writer.write_acquisition(&convert::acquisition_to_ismrmrd(acq)?)?,
            StreamItem::Image(image) => writer.write_image(&convert::any_image_to_ismrmrd(image)?)?,
            StreamItem::Waveform(wav) => writer.write_waveform(&convert::waveform_to_ismrmrd(wav)?)?,
        }
        stats.count(&item);
    }

    writer.close()?;
    info!("MRD -> ISMRMRD: {stats}");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ismrmrd;

    fn legacy_stream(write: impl FnOnce(&mut ProtocolWriter<&mut Vec<u8>>)) -> Vec<u8> {
        let mut bytes = vec![];
        let mut writer = ProtocolWriter::new(&mut bytes);
        write(&mut writer);
        writer.close().unwrap();
        bytes
    }

    #[test]
    fn close_first_is_missing_header() {
        let input = legacy_stream(|_| {});
        let mut out = vec![];
        assert!(matches!(
            ismrmrd_to_mrd(input.as_slice(), &mut out),
            Err(Error::MissingHeader(4))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn text_first_is_missing_header() {
        let mut input = vec![];
        input.extend_from_slice(&MessageId::Text.code().to_le_bytes());
        let mut out = vec![];
        assert!(matches!(
            ismrmrd_to_mrd(input.as_slice(), &mut out),
            Err(Error::MissingHeader(5))
        ));
    }

    #[test]
    fn unknown_message_while_streaming() {
        let mut input = legacy_stream(|w| w.write_acquisition(&ismrmrd::Acquisition::default()).unwrap());
        // swap the close message for an unknown id
        let n = input.len();
        input[n - 2..].copy_from_slice(&999u16.to_le_bytes());
        let mut out = vec![];
        assert!(matches!(
            ismrmrd_to_mrd(input.as_slice(), &mut out),
            Err(Error::UnsupportedMessage(999, _))
        ));
    }

    #[test]
    fn truncated_input_is_an_io_error() {
        let mut input = legacy_stream(|w| w.write_acquisition(&ismrmrd::Acquisition::default()).unwrap());
        input.truncate(input.len() - 2);
        assert!(matches!(ismrmrd_to_mrd(input.as_slice(), vec![]), Err(Error::Io(_))));
    }

    #[test]
    fn headerless_streams_both_ways() {
        let input = legacy_stream(|w| {
            w.write_acquisition(&ismrmrd::Acquisition::default()).unwrap();
            w.write_waveform(&ismrmrd::Waveform::default()).unwrap();
        });
        let mut mrd_bytes = vec![];
        let stats = ismrmrd_to_mrd(input.as_slice(), &mut mrd_bytes).unwrap();
        assert_eq!(
            stats,
            Stats {
                header: false,
                acquisitions: 1,
                images: 0,
                waveforms: 1
            }
        );
        let mut legacy = vec![];
        let back = mrd_to_ismrmrd(mrd_bytes.as_slice(), &mut legacy).unwrap();
        assert_eq!(back, stats);
        let mut reader = ProtocolReader::new(legacy.as_slice());
        assert_eq!(reader.peek().unwrap(), MessageId::Acquisition);
    }

    #[test]
    fn stats_display() {
        let stats = Stats {
            header: true,
            acquisitions: 3,
            images: 2,
            waveforms: 0,
        };
        assert_eq!(stats.items(), 5);
        assert_eq!(stats.to_string(), "with header, 3 acquisitions, 2 images, 0 waveforms");
    }
}
