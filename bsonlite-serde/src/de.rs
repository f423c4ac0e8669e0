use serde::Deserialize;
use serde::de::{self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::value::StrDeserializer;
use bsonlite::{DecodeError, ObjectId, Tag};
use std::str::from_utf8;

use crate::error::{DeserializationError, Error, Result};

pub struct Deserializer<'de> {
    input: &'de [u8],
    pos: usize,
    /// Tag of the pending value, parked when an element header has been read.
    /// Empty at the top level, where the root document carries no tag.
    tag: Option<Tag>,
}

impl<'de> Deserializer<'de> {
    pub fn from_bytes(input: &'de [u8]) -> Self {
        Deserializer { input, pos: 0, tag: None }
    }
}

pub fn from_bytes<'a, T: Deserialize<'a>>(s: &'a [u8]) -> std::result::Result<T, DeserializationError> {
    let mut deserializer = Deserializer::from_bytes(s);
    let t = T::deserialize(&mut deserializer).map_err(|e| e.at(deserializer.pos))?;
    if deserializer.input[deserializer.pos..].is_empty() {
        Ok(t)
    } else {
        Err(Error::Trailing.at(deserializer.pos))
    }
}

impl<'de> Deserializer<'de> {

    fn tag(&mut self) -> Tag {
        self.tag.take().unwrap_or(Tag::Document)
    }

    fn slice(&mut self, len: usize) -> Result<&'de [u8]> {
        if self.input[self.pos..].len() < len {
            Err(Error::Decode(DecodeError::Eof))
        } else {
            self.pos += len;
            Ok(&self.input[self.pos - len .. self.pos])
        }
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.slice(1)?[0])
    }

    fn int32(&mut self) -> Result<i32> {
        Ok(<i32>::from_le_bytes(self.slice(4)?.try_into().unwrap()))
    }

    fn int64(&mut self) -> Result<i64> {
        Ok(<i64>::from_le_bytes(self.slice(8)?.try_into().unwrap()))
    }

    fn double(&mut self) -> Result<f64> {
        Ok(<f64>::from_le_bytes(self.slice(8)?.try_into().unwrap()))
    }

    fn cstr(&mut self) -> Result<&'de str> {
        let length = self.input[self.pos..].iter().position(|b| *b == 0x00).ok_or(Error::Decode(DecodeError::Eof))?;
        let content = from_utf8(&self.input[self.pos .. self.pos + length])?;
        self.pos += length + 1;
        Ok(content)
    }

    fn str_value(&mut self) -> Result<&'de str> {
        let declared = self.int32()?;
        if declared < 1 {
            return Err(Error::Decode(DecodeError::Length(declared)));
        }
        let bytes = self.slice(declared as usize)?;
        match bytes.split_last() {
            Some((&0x00, content)) => Ok(from_utf8(content)?),
            _ => Err(Error::Decode(DecodeError::Terminator)),
        }
    }

    /// Reads the pending numeric value, whatever its width.
    fn integer(&mut self) -> Result<i64> {
        match self.tag() {
            Tag::Int32 => Ok(i64::from(self.int32()?)),
            Tag::Int64 => self.int64(),
            other => Err(Error::UnexpectedTag(&["Int32", "Int64"], other.name())),
        }
    }

    /// Validates a document header against the remaining buffer and returns
    /// the end position of the frame along with its declared length.
    fn begin_document(&mut self) -> Result<(usize, i32)> {
        let start = self.pos;
        let declared = self.int32()?;
        if declared < 5 || self.input.len() - start < declared as usize {
            return Err(Error::Decode(DecodeError::Length(declared)));
        }
        Ok((start + declared as usize, declared))
    }

    /// Reads the next element header inside a document frame: parks the
    /// value's tag and returns the key, or `None` at the terminator.
    fn next_element(&mut self, end: usize, declared: i32) -> Result<Option<&'de str>> {
        if self.pos >= end {
            return Err(Error::Decode(DecodeError::Terminator));
        }
        let byte = self.byte()?;
        if byte == 0x00 {
            return if self.pos == end {
                Ok(None)
            } else {
                Err(Error::Decode(DecodeError::Length(declared)))
            };
        }
        let tag = Tag::try_from(byte).map_err(|()| Error::Decode(DecodeError::Tag(byte)))?;
        let key = self.cstr()?;
        self.tag = Some(tag);
        Ok(Some(key))
    }

    fn visit_document<V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        let (end, declared) = self.begin_document()?;
        visitor.visit_map(DocumentAccess { de: self, end, declared })
    }

    fn visit_array<V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        let (end, declared) = self.begin_document()?;
        visitor.visit_seq(DocumentAccess { de: self, end, declared })
    }

}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {

    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Double => visitor.visit_f64(self.double()?),
            Tag::String => visitor.visit_borrowed_str(self.str_value()?),
            Tag::Document => self.visit_document(visitor),
            Tag::Array => self.visit_array(visitor),
            Tag::Undefined | Tag::Null => visitor.visit_unit(),
            Tag::ObjectId => {
                let id = ObjectId::from_bytes(self.slice(12)?.try_into().unwrap());
                visitor.visit_string(id.to_hex())
            },
            Tag::Bool => match self.byte()? {
                0x00 => visitor.visit_bool(false),
                0x01 => visitor.visit_bool(true),
                byte => Err(Error::Decode(DecodeError::Bool(byte))),
            },
            Tag::Int32 => visitor.visit_i32(self.int32()?),
            Tag::Int64 => visitor.visit_i64(self.int64()?),
            other => Err(Error::Decode(DecodeError::Unsupported(other))),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Bool => match self.byte()? {
                0x00 => visitor.visit_bool(false),
                0x01 => visitor.visit_bool(true),
                byte => Err(Error::Decode(DecodeError::Bool(byte))),
            },
            other => Err(Error::UnexpectedTag(&["Bool"], other.name())),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(i8::try_from(self.integer()?)?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(i16::try_from(self.integer()?)?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(i32::try_from(self.integer()?)?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.integer()?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(u8::try_from(self.integer()?)?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(u16::try_from(self.integer()?)?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(u32::try_from(self.integer()?)?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(u64::try_from(self.integer()?)?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Double => visitor.visit_f32(self.double()? as f32),
            other => Err(Error::UnexpectedTag(&["Double"], other.name())),
        }
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Double => visitor.visit_f64(self.double()?),
            other => Err(Error::UnexpectedTag(&["Double"], other.name())),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::String => visitor.visit_borrowed_str(self.str_value()?),
            other => Err(Error::UnexpectedTag(&["String"], other.name())),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("byte buffers"))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Some(Tag::Null) | Some(Tag::Undefined) => {
                self.tag = None;
                visitor.visit_none()
            },
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Null | Tag::Undefined => visitor.visit_unit(),
            other => Err(Error::UnexpectedTag(&["Null", "Undefined"], other.name())),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Array => self.visit_array(visitor),
            other => Err(Error::UnexpectedTag(&["Array"], other.name())),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag() {
            Tag::Document => self.visit_document(visitor),
            other => Err(Error::UnexpectedTag(&["Document"], other.name())),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(self, _name: &'static str, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.tag() {
            // unit variants are encoded as plain strings
            Tag::String => visitor.visit_enum(self.str_value()?.into_deserializer()),
            // everything else as a document with a single element
            Tag::Document => {
                let (end, declared) = self.begin_document()?;
                let variant = self.next_element(end, declared)?.ok_or(Error::Variant)?;
                let value = visitor.visit_enum(Enum { de: &mut *self, variant })?;
                match self.next_element(end, declared)? {
                    None => Ok(value),
                    Some(_) => Err(Error::Variant),
                }
            },
            other => Err(Error::UnexpectedTag(&["String", "Document"], other.name())),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }

}

struct DocumentAccess<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    end: usize,
    declared: i32,
}

impl<'de, 'a> MapAccess<'de> for DocumentAccess<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.de.next_element(self.end, self.declared)? {
            None => Ok(None),
            Some(key) => {
                let key: StrDeserializer<Error> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            },
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }

}

impl<'de, 'a> SeqAccess<'de> for DocumentAccess<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.de.next_element(self.end, self.declared)? {
            // the decimal keys only repeat the positions
            None => Ok(None),
            Some(_) => seed.deserialize(&mut *self.de).map(Some),
        }
    }

}

struct Enum<'a, 'de: 'a> {
    de: &'a mut Deserializer<'de>,
    variant: &'de str,
}

impl<'de, 'a> EnumAccess<'de> for Enum<'a, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant: StrDeserializer<Error> = self.variant.into_deserializer();
        let value = seed.deserialize(variant)?;
        Ok((value, self))
    }

}

impl<'de, 'a> VariantAccess<'de> for Enum<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.de.tag() {
            Tag::Null => Ok(()),
            other => Err(Error::UnexpectedTag(&["Null"], other.name())),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_map(self.de, visitor)
    }

}
