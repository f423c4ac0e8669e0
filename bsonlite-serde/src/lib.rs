//! Conveniently serialize and deserialize your Rust data structures into the BSON wire format.
//!
//! # Mapping
//!
//! Structs and maps become documents and sequences become arrays, so the top
//! level of a message must be a struct or map: BSON bytes always form a
//! document. Map keys must be strings. Integers keep their declared width:
//! `i8` through `u16` travel as Int32, `i64` as Int64, `u32` widens to Int64
//! only when it must and `u64` is rejected once it exceeds the Int64 range.
//! Unit variants are encoded as plain strings; data-carrying variants as
//! single-element documents keyed by the variant name. Byte buffers are
//! rejected: the binary element type is an extension point without an
//! implemented payload layout.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Reading<'a> {
//!     station: &'a str,
//!     celsius: f64,
//!     samples: Vec<i32>,
//! }
//!
//! let reading = Reading { station: "Spitsbergen", celsius: -13.25, samples: vec![7, 12] };
//! let bytes = bsonlite_serde::to_bytes(&reading).unwrap();
//! let decoded: Reading = bsonlite_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(reading, decoded);
//! ```

mod de;
mod error;
mod ser;

pub use de::{from_bytes, Deserializer};
pub use error::{DeserializationError, Error, Result};
pub use ser::{to_bytes, to_writer, Serializer};
