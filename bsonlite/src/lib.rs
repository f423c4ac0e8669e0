//! All encoding functions take a document and a writer and return the amount
//! of written bytes. All decoding functions take a buffer and return the
//! document and the number of consumed bytes.
//!
//! # A note on lengths
//!
//! BSON length prefixes are signed 32-bit integers, so no single document,
//! array or string frame may exceed `i32::MAX` bytes even on 64-bit
//! architectures. An `EncodeError::Length` is raised when a tree does not fit.
//! The decoder validates every declared length against the actual buffer
//! bounds before reading payloads and raises a `DecodeError::Length` on any
//! disagreement, so a hostile length field can never cause reads outside the
//! buffer or oversized allocations.
//!
//! # A note on field order
//!
//! Documents are ordered sequences of elements, not maps: field order is
//! preserved end-to-end and duplicate keys are kept as-is. This is why
//! `Document` wraps a `Vec` of elements instead of a standard library map.
//!
//! # Examples
//!
//! ```
//! use bsonlite::*;
//!
//! let document = Document::new().append("hello", "world");
//! let mut buf = Vec::new();
//! Encoder::encode(&document, &mut buf).unwrap();
//! assert_eq!(buf, [
//!     0x16, 0x00, 0x00, 0x00, // total length: 22 bytes
//!     0x02,                   // String tag
//!     0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, // "hello"
//!     0x06, 0x00, 0x00, 0x00, // string length: 5 content bytes plus NUL
//!     0x77, 0x6f, 0x72, 0x6c, 0x64, 0x00, // "world"
//!     0x00,                   // terminator
//! ]);
//! let (decoded, consumed) = Decoder::decode(&buf).unwrap();
//! assert_eq!(document, decoded);
//! assert_eq!(22, consumed);
//! ```

mod error;
mod oid;
mod tag;
mod value;

pub use error::*;
pub use oid::*;
pub use tag::*;
pub use value::*;
