//! MRD stream framing: preamble, header step and the data step.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use super::binary::{read_len, read_varint, write_len, write_varint, Decode, Encode};
use super::{Header, StreamItem};
use crate::element::read_bytes;
use crate::error::{Error, Result};

const MAGIC: &[u8; 5] = b"yardl";
pub const FORMAT_VERSION: u32 = 1;
const PROTOCOL_NAME: &str = "Mrd";

/// The JSON schema descriptor that follows the magic bytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Schema {
    protocol: ProtocolSchema,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ProtocolSchema {
    name: String,
    sequence: Vec<StepSchema>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StepSchema {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

impl Schema {
    fn mrd() -> Schema {
        Schema {
            protocol: ProtocolSchema {
                name: PROTOCOL_NAME.to_string(),
                sequence: vec![
                    StepSchema {
                        name: "header".to_string(),
                        ty: "Header?".to_string(),
                    },
                    StepSchema {
                        name: "data".to_string(),
                        ty: "StreamItem!*".to_string(),
                    },
                ],
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Header,
    Data,
    Done,
}

pub struct MrdWriter<W: Write> {
    writer: W,
    step: Step,
}

impl<W: Write> MrdWriter<W> {
    /// start a stream, writing the preamble
    pub fn new(mut writer: W) -> Result<Self> {
        let schema = serde_json::to_string(&Schema::mrd())
            .map_err(|e| Error::SchemaMismatch(e.to_string()))?;
        writer.write_all(MAGIC)?;
        writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        write_len(&mut writer, schema.len())?;
        writer.write_all(schema.as_bytes())?;
        Ok(MrdWriter {
            writer,
            step: Step::Header,
        })
    }

    pub fn write_header(&mut self, header: Option<&Header>) -> Result<()> {
        if self.step != Step::Header {
            return Err(Error::OutOfOrder("header"));
        }
        match header {
            Some(h) => {
                self.writer.write_u8(1)?;
                h.encode(&mut self.writer)?;
            }
            None => self.writer.write_u8(0)?,
        }
        self.step = Step::Data;
        Ok(())
    }

    /// write one item as a block of its own
    pub fn write_data(&mut self, item: &StreamItem) -> Result<()> {
        if self.step != Step::Data {
            return Err(Error::OutOfOrder("stream item"));
        }
        write_varint(&mut self.writer, 1)?;
        item.encode(&mut self.writer)
    }

    /// terminate the data step and flush
    pub fn end_data(mut self) -> Result<W> {
        if self.step != Step::Data {
            return Err(Error::OutOfOrder("end of data"));
        }
        write_varint(&mut self.writer, 0)?;
        self.step = Step::Done;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

pub struct MrdReader<R: Read> {
    reader: R,
    step: Step,
    remaining: u64,
}

impl<R: Read> MrdReader<R> {
    /// open a stream, checking the preamble
    pub fn new(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 5];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(Error::BadMagic);
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let len = read_len(&mut reader)?;
        let schema = read_bytes(&mut reader, len)?;
        let schema: Schema =
            serde_json::from_slice(&schema).map_err(|e| Error::SchemaMismatch(e.to_string()))?;
        if schema != Schema::mrd() {
            return Err(Error::SchemaMismatch(format!(
                "expected protocol {PROTOCOL_NAME}, found {}",
                schema.protocol.name
            )));
        }
        Ok(MrdReader {
            reader,
            step: Step::Header,
            remaining: 0,
        })
    }

    pub fn read_header(&mut self) -> Result<Option<Header>> {
        if self.step != Step::Header {
            return Err(Error::OutOfOrder("header"));
        }
        let header = Option::<Header>::decode(&mut self.reader)?;
        self.step = Step::Data;
        Ok(header)
    }

    /// the next item, or `None` once the data step has ended
    pub fn read_data(&mut self) -> Result<Option<StreamItem>> {
        match self.step {
            Step::Header => return Err(Error::OutOfOrder("stream item")),
            Step::Done => return Ok(None),
            Step::Data => {}
        }
        if self.remaining == 0 {
            self.remaining = read_varint(&mut self.reader)?;
            if self.remaining == 0 {
                self.step = Step::Done;
                return Ok(None);
            }
        }
        self.remaining -= 1;
        StreamItem::decode(&mut self.reader).map(Some)
    }
}
