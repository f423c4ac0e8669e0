use crate::tag::Tag;
use std::fmt::{Display, Formatter, self};

#[derive(Debug, PartialEq)]
pub struct DecoderError {
    inner: DecodeError,
    at: usize,
}

impl DecoderError {
    pub fn into_inner(self) -> DecodeError {
        self.inner
    }

    pub fn position(&self) -> usize {
        self.at
    }
}

impl std::error::Error for DecoderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for DecoderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    Eof,
    Utf8(std::str::Utf8Error),
    Tag(u8),
    Unsupported(Tag),
    Length(i32),
    Bool(u8),
    Terminator,
}

impl DecodeError {
    pub fn at(self, at: usize) -> DecoderError {
        DecoderError { inner: self, at }
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> DecodeError {
        DecodeError::Utf8(e)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::Eof => f.write_str("Unexpected end of buffer while decoding"),
            DecodeError::Utf8(e) => write!(f, "String slice was not valid Utf-8: {}", e),
            DecodeError::Tag(byte) => write!(f, "Unknown tag byte 0x{:02x}", byte),
            DecodeError::Unsupported(tag) => write!(f, "No payload layout is implemented for {} elements", tag.name()),
            DecodeError::Length(value) => write!(f, "Declared length {} is inconsistent with the buffer bounds", value),
            DecodeError::Bool(byte) => write!(f, "Invalid boolean payload byte 0x{:02x}", byte),
            DecodeError::Terminator => f.write_str("Missing NUL terminator"),
        }
    }
}

#[derive(Debug)]
pub enum EncodeError {
    Io(std::io::Error),
    Key(String),
    Length(usize),
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> EncodeError {
        EncodeError::Io(e)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::Io(e) => write!(f, "IO error {}", e),
            EncodeError::Key(key) => write!(f, "Key {:?} contains a NUL byte", key),
            EncodeError::Length(value) => write!(f, "Length {} exceeds maximum {}", value, i32::MAX),
        }
    }
}

/// Returned when a payload accessor is used against the wrong kind of
/// [Value](crate::Value).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AccessError {
    pub expected: Tag,
    pub actual: Tag,
}

impl std::error::Error for AccessError {}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Expected {} but found {}", self.expected.name(), self.actual.name())
    }
}
