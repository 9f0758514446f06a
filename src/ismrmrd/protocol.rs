//! Message framing of the ISMRMRD stream.
//!
//! Every message is a little-endian `u16` id followed by its body. The header body is a `u32`
//! length and the XML document; item bodies are described in the item modules.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{Acquisition, AnyImage, IsmrmrdHeader, Waveform};
use crate::element::read_bytes;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageId {
    Header,
    Close,
    Text,
    Acquisition,
    Image,
    Waveform,
    Unknown(u16),
}

impl MessageId {
    pub fn from_code(code: u16) -> Self {
        match code {
            3 => MessageId::Header,
            4 => MessageId::Close,
            5 => MessageId::Text,
            1008 => MessageId::Acquisition,
            1022 => MessageId::Image,
            1026 => MessageId::Waveform,
            c => MessageId::Unknown(c),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            MessageId::Header => 3,
            MessageId::Close => 4,
            MessageId::Text => 5,
            MessageId::Acquisition => 1008,
            MessageId::Image => 1022,
            MessageId::Waveform => 1026,
            MessageId::Unknown(c) => c,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Reads messages one at a time. The id of the next message can be inspected with
/// [`ProtocolReader::peek`] before deciding how to read it.
pub struct ProtocolReader<R> {
    reader: R,
    next: Option<MessageId>,
}

impl<R: Read> ProtocolReader<R> {
    pub fn new(reader: R) -> Self {
        ProtocolReader { reader, next: None }
    }

    pub fn peek(&mut self) -> Result<MessageId> {
        if let Some(id) = self.next {
            return Ok(id);
        }
        let id = MessageId::from_code(self.reader.read_u16::<LittleEndian>()?);
        self.next = Some(id);
        Ok(id)
    }

    fn expect(&mut self, expected: MessageId) -> Result<()> {
        let id = self.peek()?;
        if id != expected {
            return Err(Error::UnsupportedMessage(id.code().into(), "ISMRMRD stream"));
        }
        self.next = None;
        Ok(())
    }

    pub fn read_header(&mut self) -> Result<IsmrmrdHeader> {
        self.expect(MessageId::Header)?;
        let len = self.reader.read_u32::<LittleEndian>()? as usize;
        let mut bytes = read_bytes(&mut self.reader, len)?;
        // some writers include the C string terminator
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        let xml = String::from_utf8(bytes).map_err(|e| Error::MalformedXml(e.to_string()))?;
        IsmrmrdHeader::from_xml(&xml)
    }

    pub fn read_acquisition(&mut self) -> Result<Acquisition> {
        self.expect(MessageId::Acquisition)?;
        Acquisition::read(&mut self.reader)
    }

    pub fn read_image(&mut self) -> Result<AnyImage> {
        self.expect(MessageId::Image)?;
        AnyImage::read(&mut self.reader)
    }

    pub fn read_waveform(&mut self) -> Result<Waveform> {
        self.expect(MessageId::Waveform)?;
        Waveform::read(&mut self.reader)
    }

    pub fn read_close(&mut self) -> Result<()> {
        self.expect(MessageId::Close)
    }
}

/// Writes messages. [`ProtocolWriter::close`] writes the close message and flushes.
pub struct ProtocolWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProtocolWriter<W> {
    pub fn new(writer: W) -> Self {
        ProtocolWriter { writer }
    }

    fn id(&mut self, id: MessageId) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(id.code())?;
        Ok(())
    }

    pub fn write_header(&mut self, header: &IsmrmrdHeader) -> Result<()> {
        let xml = header.to_xml()?;
        let len = u32::try_from(xml.len()).map_err(|_| Error::Overflow {
            field: "header length",
            value: xml.len() as i128,
            target: "u32",
        })?;
        self.id(MessageId::Header)?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    pub fn write_acquisition(&mut self, acq: &Acquisition) -> Result<()> {
        self.id(MessageId::Acquisition)?;
        acq.write(&mut self.writer)
    }

    pub fn write_image(&mut self, image: &AnyImage) -> Result<()> {
        self.id(MessageId::Image)?;
        image.write(&mut self.writer)
    }

    pub fn write_waveform(&mut self, waveform: &Waveform) -> Result<()> {
        self.id(MessageId::Waveform)?;
        waveform.write(&mut self.writer)
    }

    pub fn close(mut self) -> Result<W> {
        self.id(MessageId::Close)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
