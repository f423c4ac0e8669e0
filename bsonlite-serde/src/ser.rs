use serde::{ser, Serialize};
use serde::ser::Impossible;
use bsonlite::{EncodeError, Tag};
use std::io::Write;

use crate::error::{Error, Result};

/// Serializes into a growing byte buffer. A BSON frame is prefixed with its
/// byte length, which is only known once the frame is finished, so container
/// starts reserve the prefix and `finish` patches it. The tag byte of an
/// element precedes its key but depends on the value's type, so the key is
/// parked until the value arrives.
pub struct Serializer {
    output: Vec<u8>,
    key: Option<String>,
}

pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut serializer = Serializer { output: Vec::new(), key: None };
    value.serialize(&mut serializer)?;
    Ok(serializer.output)
}

pub fn to_writer<T: Serialize, W: Write>(mut writer: W, value: &T) -> Result<()> {
    let bytes = to_bytes(value)?;
    writer.write_all(&bytes).map_err(EncodeError::from)?;
    Ok(())
}

impl Serializer {

    /// Writes the tag byte and the parked key of the element under
    /// construction. Scalars cannot occur at the top level, where no key is
    /// parked: the root of every message is a document.
    fn element(&mut self, tag: Tag) -> Result<()> {
        match self.key.take() {
            Some(key) => {
                self.output.push(tag as u8);
                if key.bytes().any(|b| b == 0x00) {
                    return Err(Error::Encode(EncodeError::Key(key)));
                }
                self.output.extend_from_slice(key.as_bytes());
                self.output.push(0x00);
                Ok(())
            },
            None => Err(Error::TopLevel(tag.name())),
        }
    }

    /// Like `element` for documents and arrays. Only documents may form the
    /// top level: an array would lose its tag there and decode as a document
    /// with decimal keys. Returns the position of the reserved length prefix.
    fn begin(&mut self, tag: Tag) -> Result<usize> {
        if self.key.is_some() {
            self.element(tag)?;
        } else if tag == Tag::Array {
            return Err(Error::TopLevel(tag.name()));
        }
        let start = self.output.len();
        self.output.extend_from_slice(&[0x00; 4]);
        Ok(start)
    }

    fn finish(&mut self, start: usize) -> Result<()> {
        self.output.push(0x00);
        let length = self.output.len() - start;
        let length = i32::try_from(length).map_err(|_| Error::Encode(EncodeError::Length(length)))?;
        self.output[start..start + 4].copy_from_slice(&length.to_le_bytes());
        Ok(())
    }

}

impl<'a> ser::Serializer for &'a mut Serializer {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = Compound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.element(Tag::Bool)?;
        self.output.push(v as u8);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.element(Tag::Int32)?;
        self.output.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.element(Tag::Int64)?;
        self.output.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        match i32::try_from(v) {
            Ok(v) => self.serialize_i32(v),
            Err(_) => self.serialize_i64(i64::from(v)),
        }
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.serialize_i64(i64::try_from(v)?)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.element(Tag::Double)?;
        self.output.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.element(Tag::String)?;
        let length = v.len() + 1;
        let length = i32::try_from(length).map_err(|_| Error::Encode(EncodeError::Length(length)))?;
        self.output.extend_from_slice(&length.to_le_bytes());
        self.output.extend_from_slice(v.as_bytes());
        self.output.push(0x00);
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(Error::Unsupported("byte buffers"))
    }

    fn serialize_none(self) -> Result<()> {
        self.element(Tag::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.element(Tag::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, variant: &'static str, value: &T) -> Result<()> {
        let start = self.begin(Tag::Document)?;
        self.key = Some(variant.to_owned());
        value.serialize(&mut *self)?;
        self.finish(start)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        let start = self.begin(Tag::Array)?;
        Ok(Compound { ser: self, start, outer: None, index: 0 })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        let outer = self.begin(Tag::Document)?;
        self.key = Some(variant.to_owned());
        let start = self.begin(Tag::Array)?;
        Ok(Compound { ser: self, start, outer: Some(outer), index: 0 })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let start = self.begin(Tag::Document)?;
        Ok(Compound { ser: self, start, outer: None, index: 0 })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        let start = self.begin(Tag::Document)?;
        Ok(Compound { ser: self, start, outer: None, index: 0 })
    }

    fn serialize_struct_variant(self, _name: &'static str, _index: u32, variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        let outer = self.begin(Tag::Document)?;
        self.key = Some(variant.to_owned());
        let start = self.begin(Tag::Document)?;
        Ok(Compound { ser: self, start, outer: Some(outer), index: 0 })
    }

}

/// An unfinished document or array frame. Variant frames carry the enclosing
/// single-element document, which `end` closes after the inner frame.
pub struct Compound<'a> {
    ser: &'a mut Serializer,
    start: usize,
    outer: Option<usize>,
    index: usize,
}

impl<'a> Compound<'a> {

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.ser.key = Some(self.index.to_string());
        self.index += 1;
        value.serialize(&mut *self.ser)
    }

    fn end_inner(self) -> Result<()> {
        self.ser.finish(self.start)?;
        match self.outer {
            Some(outer) => self.ser.finish(outer),
            None => Ok(()),
        }
    }

}

impl<'a> ser::SerializeSeq for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }

}

impl<'a> ser::SerializeTuple for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }
}

impl<'a> ser::SerializeTupleStruct for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }
}

impl<'a> ser::SerializeTupleVariant for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }
}

impl<'a> ser::SerializeMap for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        key.serialize(MapKeySerializer { ser: &mut *self.ser })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }

}

impl<'a> ser::SerializeStruct for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.ser.key = Some(key.to_owned());
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }

}

impl<'a> ser::SerializeStructVariant for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.ser.key = Some(key.to_owned());
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.end_inner()
    }

}

/// BSON field names are strings, so only string-shaped keys can pass.
struct MapKeySerializer<'a> {
    ser: &'a mut Serializer,
}

impl<'a> ser::Serializer for MapKeySerializer<'a> {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_str(self, v: &str) -> Result<()> {
        self.ser.key = Some(v.to_owned());
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.ser.key = Some(v.to_string());
        Ok(())
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_bool(self, _v: bool) -> Result<()> { Err(Error::KeyType) }
    fn serialize_i8(self, _v: i8) -> Result<()> { Err(Error::KeyType) }
    fn serialize_i16(self, _v: i16) -> Result<()> { Err(Error::KeyType) }
    fn serialize_i32(self, _v: i32) -> Result<()> { Err(Error::KeyType) }
    fn serialize_i64(self, _v: i64) -> Result<()> { Err(Error::KeyType) }
    fn serialize_u8(self, _v: u8) -> Result<()> { Err(Error::KeyType) }
    fn serialize_u16(self, _v: u16) -> Result<()> { Err(Error::KeyType) }
    fn serialize_u32(self, _v: u32) -> Result<()> { Err(Error::KeyType) }
    fn serialize_u64(self, _v: u64) -> Result<()> { Err(Error::KeyType) }
    fn serialize_f32(self, _v: f32) -> Result<()> { Err(Error::KeyType) }
    fn serialize_f64(self, _v: f64) -> Result<()> { Err(Error::KeyType) }
    fn serialize_bytes(self, _v: &[u8]) -> Result<()> { Err(Error::KeyType) }
    fn serialize_none(self) -> Result<()> { Err(Error::KeyType) }
    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<()> { Err(Error::KeyType) }
    fn serialize_unit(self) -> Result<()> { Err(Error::KeyType) }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> { Err(Error::KeyType) }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> { value.serialize(self) }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, _variant: &'static str, _value: &T) -> Result<()> { Err(Error::KeyType) }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> { Err(Error::KeyType) }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> { Err(Error::KeyType) }
    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> { Err(Error::KeyType) }
    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> { Err(Error::KeyType) }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> { Err(Error::KeyType) }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> { Err(Error::KeyType) }
    fn serialize_struct_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> { Err(Error::KeyType) }

}
