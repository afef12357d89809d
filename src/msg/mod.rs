//! # Messaging Protocol - Snapshot Framing
//!
//! The engine streams snapshots as framed binary messages. Every message
//! starts with a header of one flag octet and zero to eight payload octets,
//! followed by a one-byte message kind and the message body. The header
//! states the priority, the integer endianness of the frame, and how the
//! message is delimited: size-prefixed (SP) with an explicit body size, or
//! literal-terminated (LT) with a fixed sentinel pattern.
//!
//! ## Header layout
//!
//! The flag octet is, from the most significant bit down:
//!
//! ```text
//! bit 7      priority (0 = low, 1 = high)
//! bits 6..4  endianness selector (bit 4: 0 = little, 1 = big; rest reserved)
//! bit 3      variability (0 = size fixed into bits 0..2, 1 = variable)
//! bit 2      tag when variable (0 = size-prefixed, 1 = literal-terminated)
//! bits 0..2  size when fixed
//! bits 0..1  length exponent when variable
//! ```
//!
//! Small size-prefixed messages (size below 8) fit entirely into the flag
//! octet. Larger ones set the variability bit and carry the size in
//! `2^e` following octets with `e` in the two low bits; literal-terminated
//! messages carry their `2^e`-octet sentinel pattern the same way.
//!
//! ## Submodules
//!
//! - [`tests`]: Round-trip tests over the full header space

// Unit tests
pub mod tests;

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

const MASK_PRIO: u8 = 1 << 7;
const MASK_ENDIAN: u8 = 1 << 4;
const MASK_VAR: u8 = 1 << 3;
const MASK_TAG: u8 = 1 << 2;
const MASK_FIXSIZE: u8 = 0b111;
const MASK_VARSIZE: u8 = 0b11;

/// Message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgPrio {
    Low,
    High,
}

/// Integer endianness of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgEndian {
    Little,
    Big,
}

/// How a message is delimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgBody {
    /// The header states the body size in octets.
    SizePrefixed(u64),
    /// The body runs until the sentinel pattern; the pattern length must be
    /// a power of two between 1 and 8.
    LiteralTerminated(Vec<u8>),
}

/// A message header: what kind of frame follows and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsgSpec {
    pub prio: MsgPrio,
    pub endian: MsgEndian,
    pub body: MsgBody,
}

impl Default for MsgSpec {
    fn default() -> Self {
        MsgSpec {
            prio: MsgPrio::Low,
            endian: MsgEndian::Little,
            body: MsgBody::SizePrefixed(0),
        }
    }
}

impl MsgSpec {
    /// Smallest exponent `e` such that `size` fits into `2^e` octets.
    fn size_exponent(size: u64) -> u8 {
        match size {
            s if s < 1u64 << 8 => 0,
            s if s < 1u64 << 16 => 1,
            s if s < 1u64 << 32 => 2,
            _ => 3,
        }
    }

    /// Writes the header to `sink`.
    ///
    /// # Errors
    ///
    /// Fails on sink errors, or with a bad-parameter error when a
    /// literal-terminated pattern does not have a power-of-two length
    /// between 1 and 8 octets.
    pub fn write(&self, sink: &mut dyn Write) -> Result<()> {
        let mut flags = 0u8;

        if self.prio == MsgPrio::High {
            flags |= MASK_PRIO;
        }
        if self.endian == MsgEndian::Big {
            flags |= MASK_ENDIAN;
        }

        match &self.body {
            MsgBody::SizePrefixed(size) if *size < 8 => {
                // The whole size fits into the flag octet
                flags |= *size as u8 & MASK_FIXSIZE;
                sink.write_all(&[flags])?;
            }
            MsgBody::SizePrefixed(size) => {
                let e = Self::size_exponent(*size);
                flags |= MASK_VAR | (e & MASK_VARSIZE);
                sink.write_all(&[flags])?;

                let n = 1 << e;
                match self.endian {
                    MsgEndian::Little => sink.write_all(&size.to_le_bytes()[..n])?,
                    MsgEndian::Big => sink.write_all(&size.to_be_bytes()[8 - n..])?,
                }
            }
            MsgBody::LiteralTerminated(pattern) => {
                let e = match pattern.len() {
                    1 => 0,
                    2 => 1,
                    4 => 2,
                    8 => 3,
                    n => {
                        return Err(SimError::BadParameter(format!(
                            "sentinel pattern length {n} is not a power of two up to 8"
                        )));
                    }
                };

                flags |= MASK_VAR | MASK_TAG | e;
                sink.write_all(&[flags])?;
                sink.write_all(pattern)?;
            }
        }

        Ok(())
    }

    /// Reads a header from `source`.
    ///
    /// # Errors
    ///
    /// Fails on source errors or on a flag octet with reserved bits set.
    pub fn read(source: &mut dyn Read) -> Result<Self> {
        let mut flags = [0u8; 1];
        source.read_exact(&mut flags)?;
        let flags = flags[0];

        let prio = if flags & MASK_PRIO != 0 {
            MsgPrio::High
        } else {
            MsgPrio::Low
        };
        let endian = if flags & MASK_ENDIAN != 0 {
            MsgEndian::Big
        } else {
            MsgEndian::Little
        };

        if flags & 0b0110_0000 != 0 {
            return Err(SimError::MalformedHeader);
        }

        let body = if flags & MASK_VAR == 0 {
            MsgBody::SizePrefixed(u64::from(flags & MASK_FIXSIZE))
        } else if flags & MASK_TAG == 0 {
            let n = 1 << (flags & MASK_VARSIZE);
            let mut buf = [0u8; 8];

            match endian {
                MsgEndian::Little => {
                    source.read_exact(&mut buf[..n])?;
                    MsgBody::SizePrefixed(u64::from_le_bytes(buf))
                }
                MsgEndian::Big => {
                    source.read_exact(&mut buf[8 - n..])?;
                    MsgBody::SizePrefixed(u64::from_be_bytes(buf))
                }
            }
        } else {
            let n = 1 << (flags & MASK_VARSIZE);
            let mut pattern = vec![0u8; n];
            source.read_exact(&mut pattern)?;
            MsgBody::LiteralTerminated(pattern)
        };

        Ok(MsgSpec { prio, endian, body })
    }
}

/// One-byte message kinds of the snapshot stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MsgKind {
    /// No operation.
    Nop = 0,
    /// Timekeeping record: step counter and current time.
    Istep = 60,
    /// Particle count alone.
    Npart = 142,
    /// Full particle table.
    Parts = 144,
    /// Neighbor cache and bond lists.
    Neigh = 168,
}

/// Writes the one-byte kind tag of a message.
pub fn write_kind(kind: MsgKind, sink: &mut dyn Write) -> Result<()> {
    sink.write_all(&[kind as u8])?;
    Ok(())
}

/// Reads a one-byte kind tag.
///
/// # Errors
///
/// An id outside the enumerated set is an unsupported-message error.
pub fn read_kind(source: &mut dyn Read) -> Result<MsgKind> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;

    match buf[0] {
        0 => Ok(MsgKind::Nop),
        60 => Ok(MsgKind::Istep),
        142 => Ok(MsgKind::Npart),
        144 => Ok(MsgKind::Parts),
        168 => Ok(MsgKind::Neigh),
        num => Err(SimError::UnsupportedMessage(num)),
    }
}
