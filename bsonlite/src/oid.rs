//! BSON object ids: twelve raw bytes, conventionally rendered as 24 lowercase
//! hex characters. The codec treats the bytes as opaque; id generation
//! (timestamp, machine and counter fields) is the caller's concern.

use std::fmt::{Debug, Display, Formatter, self};
use std::str::FromStr;
use hex::FromHex;

/// A 12-byte BSON object id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { bytes }
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Parses the 24-character hex representation. Both cases are accepted.
    pub fn parse_str(s: &str) -> Result<Self, ParseObjectIdError> {
        Ok(Self { bytes: <[u8; 12]>::from_hex(s)? })
    }

    /// The 24-character lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "ObjectId(\"{}\")", self)
    }
}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

#[derive(Debug, PartialEq)]
pub struct ParseObjectIdError(hex::FromHexError);

impl From<hex::FromHexError> for ParseObjectIdError {
    fn from(e: hex::FromHexError) -> ParseObjectIdError {
        ParseObjectIdError(e)
    }
}

impl std::error::Error for ParseObjectIdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl Display for ParseObjectIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Invalid object id: {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectId;

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_bytes([0x50, 0x7f, 0x19, 0x16, 0xe0, 0xc4, 0x4d, 0x77, 0x8b, 0xaa, 0x08, 0x71]);
        assert_eq!("507f1916e0c44d778baa0871", id.to_hex());
        assert_eq!(id, ObjectId::parse_str(&id.to_hex()).unwrap());
    }

    #[test]
    fn uppercase_is_accepted() {
        let id = ObjectId::parse_str("507F1916E0C44D778BAA0871").unwrap();
        assert_eq!("507f1916e0c44d778baa0871", id.to_hex());
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert!(ObjectId::parse_str("").is_err());
        assert!(ObjectId::parse_str("507f1916e0c44d778baa08").is_err());
        assert!(ObjectId::parse_str("507f1916e0c44d778baa087100").is_err());
    }

    #[test]
    fn non_hex_is_rejected() {
        assert!(ObjectId::parse_str("507f1916e0c44d778baa08zz").is_err());
    }

    #[test]
    fn debug_shows_the_hex_form() {
        let id = ObjectId::from_bytes([0xde; 12]);
        assert_eq!("ObjectId(\"dededededededededededede\")", format!("{:?}", id));
    }

}
