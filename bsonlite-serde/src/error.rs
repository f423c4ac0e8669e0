use std;
use std::fmt::{self, Display};
use serde::{de, ser};
use bsonlite::{DecodeError, EncodeError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct DeserializationError {
    inner: Error,
    at: usize,
}

impl DeserializationError {
    pub fn into_inner(self) -> Error {
        self.inner
    }
}

impl std::error::Error for DeserializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl Display for DeserializationError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum Error {
    // Decode
    Decode(DecodeError),
    Trailing,
    UnexpectedTag(&'static [&'static str], &'static str),
    Int,
    Variant,
    // Encode
    Encode(EncodeError),
    KeyType,
    TopLevel(&'static str),
    // Both
    Unsupported(&'static str),
    Message(String),
}

impl Error {
    pub fn at(self, at: usize) -> DeserializationError {
        DeserializationError { inner: self, at }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => fmt.write_str(msg),
            Error::Encode(e) => write!(fmt, "Encoding error: {}", e),
            Error::Decode(e) => write!(fmt, "Decoding error: {}", e),
            Error::KeyType => write!(fmt, "Map key must be convertible to a string. Maybe use crate `serde_with` to transform the map into a vec of tuples"),
            Error::Trailing => fmt.write_str("Trailing characters in input"),
            Error::UnexpectedTag(expected, actual) => write!(fmt, "Unexpected element type: expected one of ({}), found {}", expected.join(", "), actual),
            Error::Int => fmt.write_str("Integer didn't fit into target type"),
            Error::Variant => fmt.write_str("Enum variants need a document with exactly one element"),
            Error::TopLevel(actual) => write!(fmt, "The top level of a message must be a document, found {}", actual),
            Error::Unsupported(what) => write!(fmt, "No payload layout is implemented for {}", what),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Error {
        Error::Encode(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Error {
        Error::Decode(e)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_e: std::num::TryFromIntError) -> Error {
        Error::Int
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Error {
        Error::Decode(DecodeError::Utf8(e))
    }
}

impl std::error::Error for Error {}
