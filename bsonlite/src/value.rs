//! The atom of a BSON document is the `Element`: a field name paired with a
//! `Value`. Documents are ordered sequences of elements; arrays are documents
//! whose keys are the decimal positions of their entries, so the wire layout of
//! both is identical up to the tag byte on the parent field. Field order is
//! preserved end-to-end and duplicate keys are kept as-is, which is why the
//! model stores elements in a `Vec` instead of a standard library map.

use crate::error::{AccessError, DecodeError, DecoderError, EncodeError};
use crate::oid::ObjectId;
use crate::tag::{Tag, TERMINATOR};
use std::borrow::Cow;
use std::io::Write;
use std::str::from_utf8;

/// The possible values according to the implemented subset of the BSON data
/// model. Tags whose payload layout is not implemented cannot enter a tree:
/// the decoder rejects them and no constructor produces them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Double(f64),
    String(Cow<'a, str>),
    Document(Document<'a>),
    Array(Vec<Value<'a>>),
    Undefined,
    ObjectId(ObjectId),
    Bool(bool),
    Null,
    Int32(i32),
    Int64(i64),
}

/// A single field of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    pub key: Cow<'a, str>,
    pub value: Value<'a>,
}

/// An ordered sequence of elements. The root of every BSON byte sequence is a
/// document; it carries no key of its own.
///
/// The builder methods consume `self` and return the extended document, so a
/// previously cloned tree can never observe a later append.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document<'a> {
    elements: Vec<Element<'a>>,
}

impl<'a> Document<'a> {

    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Returns the document extended by `value` under `key`, appended after
    /// the existing elements. Appending the same key twice yields two
    /// elements; nothing is deduplicated or reordered.
    pub fn append<K, V>(mut self, key: K, value: V) -> Self
    where K: Into<Cow<'a, str>>, V: Into<Value<'a>> {
        self.elements.push(Element { key: key.into(), value: value.into() });
        self
    }

    /// Collects `values` into an array in input order and appends it under
    /// `key`. The entries' wire keys are their decimal positions and are
    /// assigned by the encoder, never by the caller.
    pub fn append_array<K, I, V>(self, key: K, values: I) -> Self
    where K: Into<Cow<'a, str>>, I: IntoIterator<Item = V>, V: Into<Value<'a>> {
        self.append(key, Value::Array(values.into_iter().map(Into::into).collect()))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element<'a>] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<'a>> {
        self.elements.iter()
    }

    /// The value of the first element with the given key, if any.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.elements.iter().find(|element| element.key.as_ref() == key).map(|element| &element.value)
    }

}

impl<'a> Value<'a> {

    /// The wire tag of this value.
    pub fn tag(&self) -> Tag {
        match *self {
            Value::Double(_)   => Tag::Double,
            Value::String(_)   => Tag::String,
            Value::Document(_) => Tag::Document,
            Value::Array(_)    => Tag::Array,
            Value::Undefined   => Tag::Undefined,
            Value::ObjectId(_) => Tag::ObjectId,
            Value::Bool(_)     => Tag::Bool,
            Value::Null        => Tag::Null,
            Value::Int32(_)    => Tag::Int32,
            Value::Int64(_)    => Tag::Int64,
        }
    }

    fn mismatch<T>(&self, expected: Tag) -> Result<T, AccessError> {
        Err(AccessError { expected, actual: self.tag() })
    }

    pub fn as_f64(&self) -> Result<f64, AccessError> {
        match *self { Value::Double(v) => Ok(v), _ => self.mismatch(Tag::Double) }
    }

    pub fn as_str(&self) -> Result<&str, AccessError> {
        match self { Value::String(v) => Ok(v), _ => self.mismatch(Tag::String) }
    }

    pub fn as_document(&self) -> Result<&Document<'a>, AccessError> {
        match self { Value::Document(v) => Ok(v), _ => self.mismatch(Tag::Document) }
    }

    pub fn as_array(&self) -> Result<&[Value<'a>], AccessError> {
        match self { Value::Array(v) => Ok(v), _ => self.mismatch(Tag::Array) }
    }

    pub fn as_object_id(&self) -> Result<ObjectId, AccessError> {
        match *self { Value::ObjectId(v) => Ok(v), _ => self.mismatch(Tag::ObjectId) }
    }

    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match *self { Value::Bool(v) => Ok(v), _ => self.mismatch(Tag::Bool) }
    }

    pub fn as_i32(&self) -> Result<i32, AccessError> {
        match *self { Value::Int32(v) => Ok(v), _ => self.mismatch(Tag::Int32) }
    }

    pub fn as_i64(&self) -> Result<i64, AccessError> {
        match *self { Value::Int64(v) => Ok(v), _ => self.mismatch(Tag::Int64) }
    }

}

impl<'a> From<f64> for Value<'a> {
    fn from(v: f64) -> Self { Value::Double(v) }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self { Value::String(Cow::Borrowed(v)) }
}

impl<'a> From<String> for Value<'a> {
    fn from(v: String) -> Self { Value::String(Cow::Owned(v)) }
}

impl<'a> From<ObjectId> for Value<'a> {
    fn from(v: ObjectId) -> Self { Value::ObjectId(v) }
}

impl<'a> From<bool> for Value<'a> {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl<'a> From<i32> for Value<'a> {
    fn from(v: i32) -> Self { Value::Int32(v) }
}

impl<'a> From<i64> for Value<'a> {
    fn from(v: i64) -> Self { Value::Int64(v) }
}

impl<'a> From<Document<'a>> for Value<'a> {
    fn from(v: Document<'a>) -> Self { Value::Document(v) }
}

impl<'a> From<Vec<Value<'a>>> for Value<'a> {
    fn from(v: Vec<Value<'a>>) -> Self { Value::Array(v) }
}

fn escape(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

impl<'a> std::fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Double(v)      => write!(f, "{:?}", v),
            Value::String(v)      => write!(f, "\"{}\"", escape(v)),
            Value::Document(v)    => write!(f, "{}", v),
            Value::Array(v) if v.is_empty()
                                  => f.write_str("[]"),
            Value::Array(v)       => write!(f, "[\n{}\n]", v.iter()
                .flat_map(|e| format!("{},", e).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
                .collect::<Vec<String>>().join("\n")),
            Value::Undefined      => f.write_str("undefined"),
            Value::ObjectId(v)    => write!(f, "ObjectId(\"{}\")", v),
            Value::Bool(true)     => f.write_str("true"),
            Value::Bool(false)    => f.write_str("false"),
            Value::Null           => f.write_str("null"),
            Value::Int32(v)       => write!(f, "{}", v),
            Value::Int64(v)       => write!(f, "{}", v),
        }
    }
}

impl<'a> std::fmt::Display for Element<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\": {}", escape(&self.key), self.value)
    }
}

impl<'a> std::fmt::Display for Document<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.elements.is_empty() {
            f.write_str("{}")
        } else {
            write!(f, "{{\n{}\n}}", self.elements.iter()
                .flat_map(|e| format!("{},", e).lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
                .collect::<Vec<String>>().join("\n"))
        }
    }
}

/// Encodes documents into the BSON wire format. A frame's length prefix is
/// only known once its body has been serialized, so bodies are built in
/// scratch buffers and framed afterwards; the writer sees one finished
/// document.
pub struct Encoder<'w, W: Write> {
    writer: &'w mut W,
}

impl<'w, W: Write> Encoder<'w, W> {

    /// Encode a document to the given writer. The resulting `usize` is the
    /// amount of bytes that got written. Nothing is written unless the whole
    /// tree serializes.
    pub fn encode(document: &Document, writer: &'w mut W) -> Result<usize, EncodeError> {
        Self { writer }.encode_inner(document)
    }

    fn encode_inner(&mut self, document: &Document) -> Result<usize, EncodeError> {
        let frame = Self::document(document)?;
        self.writer.write_all(&frame)?;
        Ok(frame.len())
    }

    fn document(document: &Document) -> Result<Vec<u8>, EncodeError> {
        let mut body = Vec::new();
        for element in document.elements.iter() {
            body.push(element.value.tag() as u8);
            Self::key(&mut body, &element.key)?;
            Self::value(&mut body, &element.value)?;
        }
        Self::frame(body)
    }

    fn array(values: &[Value]) -> Result<Vec<u8>, EncodeError> {
        let mut body = Vec::new();
        for (index, value) in values.iter().enumerate() {
            body.push(value.tag() as u8);
            Self::key(&mut body, &index.to_string())?;
            Self::value(&mut body, value)?;
        }
        Self::frame(body)
    }

    fn key(out: &mut Vec<u8>, key: &str) -> Result<(), EncodeError> {
        if key.bytes().any(|b| b == TERMINATOR) {
            return Err(EncodeError::Key(key.to_owned()));
        }
        out.extend_from_slice(key.as_bytes());
        out.push(TERMINATOR);
        Ok(())
    }

    fn value(out: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::String(v) => {
                // the stored length counts the content bytes plus the NUL
                let length = Self::length(v.len() + 1)?;
                out.extend_from_slice(&length.to_le_bytes());
                out.extend_from_slice(v.as_bytes());
                out.push(TERMINATOR);
            },
            Value::Document(v) => out.extend_from_slice(&Self::document(v)?),
            Value::Array(v) => out.extend_from_slice(&Self::array(v)?),
            Value::Undefined | Value::Null => {},
            Value::ObjectId(v) => out.extend_from_slice(&v.bytes()),
            Value::Bool(v) => out.push(*v as u8),
            Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
        Ok(())
    }

    fn frame(body: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        // the prefix covers itself, the body and the terminator
        let length = Self::length(body.len() + 5)?;
        let mut frame = Vec::with_capacity(body.len() + 5);
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&body);
        frame.push(TERMINATOR);
        Ok(frame)
    }

    fn length(value: usize) -> Result<i32, EncodeError> {
        i32::try_from(value).map_err(|_| EncodeError::Length(value))
    }

}

/// Decodes BSON documents from a byte buffer. Field names and string values
/// are borrowed from the buffer instead of copied, so the decoded document may
/// only live as long as the buffer does. Containers need their own heap space.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {

    /// Decode a single document from the front of the buffer. The resulting
    /// `usize` is the amount of consumed bytes; the caller decides what any
    /// trailing bytes mean. On failure no partial document is returned.
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &'a B) -> Result<(Document<'a>, usize), DecoderError> {
        let mut decoder = Self { buf: buf.as_ref(), pos: 0 };
        let document = decoder.decode_document().map_err(|e| e.at(decoder.pos))?;
        Ok((document, decoder.pos))
    }

    fn decode_document(&mut self) -> Result<Document<'a>, DecodeError> {
        let start = self.pos;
        let declared = self.decode_i32()?;
        if declared < 5 || self.buf.len() - start < declared as usize {
            return Err(DecodeError::Length(declared));
        }
        let end = start + declared as usize;
        let mut elements = Vec::new();
        loop {
            if self.pos >= end {
                // the declared range ran out before a terminator appeared
                return Err(DecodeError::Length(declared));
            }
            let byte = self.decode_u8()?;
            if byte == TERMINATOR {
                break;
            }
            let tag = Tag::try_from(byte).map_err(|()| DecodeError::Tag(byte))?;
            let key = self.decode_cstring()?;
            let value = self.decode_value(tag)?;
            elements.push(Element { key: Cow::Borrowed(key), value });
        }
        if self.pos != end {
            return Err(DecodeError::Length(declared));
        }
        Ok(Document { elements })
    }

    fn decode_value(&mut self, tag: Tag) -> Result<Value<'a>, DecodeError> {
        match tag {
            Tag::Double => Ok(Value::Double(<f64>::from_le_bytes(self.decode_slice(8)?.try_into().unwrap()))),
            Tag::String => Ok(Value::String(Cow::Borrowed(self.decode_string()?))),
            Tag::Document => Ok(Value::Document(self.decode_document()?)),
            Tag::Array => {
                // identical layout; the decimal keys only repeat the positions
                let document = self.decode_document()?;
                Ok(Value::Array(document.elements.into_iter().map(|element| element.value).collect()))
            },
            Tag::Undefined => Ok(Value::Undefined),
            Tag::ObjectId => Ok(Value::ObjectId(ObjectId::from_bytes(self.decode_slice(12)?.try_into().unwrap()))),
            Tag::Bool => match self.decode_u8()? {
                0x00 => Ok(Value::Bool(false)),
                0x01 => Ok(Value::Bool(true)),
                byte => Err(DecodeError::Bool(byte)),
            },
            Tag::Null => Ok(Value::Null),
            Tag::Int32 => Ok(Value::Int32(<i32>::from_le_bytes(self.decode_slice(4)?.try_into().unwrap()))),
            Tag::Int64 => Ok(Value::Int64(<i64>::from_le_bytes(self.decode_slice(8)?.try_into().unwrap()))),
            other => Err(DecodeError::Unsupported(other)),
        }
    }

    fn decode_string(&mut self) -> Result<&'a str, DecodeError> {
        let declared = self.decode_i32()?;
        if declared < 1 {
            return Err(DecodeError::Length(declared));
        }
        let bytes = self.decode_slice(declared as usize)?;
        match bytes.split_last() {
            Some((&TERMINATOR, content)) => Ok(from_utf8(content)?),
            _ => Err(DecodeError::Terminator),
        }
    }

    fn decode_cstring(&mut self) -> Result<&'a str, DecodeError> {
        let length = self.buf[self.pos..].iter().position(|b| *b == TERMINATOR).ok_or(DecodeError::Eof)?;
        let content = from_utf8(&self.buf[self.pos..self.pos + length])?;
        self.pos += length + 1;
        Ok(content)
    }

    fn decode_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(<i32>::from_le_bytes(self.decode_slice(4)?.try_into().unwrap()))
    }

    fn decode_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.decode_slice(1)?[0])
    }

    fn decode_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.buf[self.pos..].len() < len {
            Err(DecodeError::Eof)
        } else {
            self.pos += len;
            Ok(&self.buf[self.pos - len .. self.pos])
        }
    }

}

#[cfg(test)]
mod test {
    use super::{Decoder, Document, Encoder, Value};
    use crate::error::{DecodeError, EncodeError};
    use crate::oid::ObjectId;
    use crate::tag::Tag;
    use std::borrow::Cow;

    #[test]
    fn empty_document() {
        let mut buf = Vec::new();
        let written = Encoder::encode(&Document::new(), &mut buf).unwrap();
        assert_eq!(buf, [0x05, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(5, written);
        let wire = [0x05u8, 0x00, 0x00, 0x00, 0x00];
        let (document, consumed) = Decoder::decode(&wire).unwrap();
        assert_eq!(0, document.len());
        assert_eq!(5, consumed);
    }

    #[test]
    fn simple_values() {
        assert_roundtrip(Document::new()
            .append("null", Value::Null)
            .append("undefined", Value::Undefined)
            .append("yes", true)
            .append("no", false));
    }

    #[test]
    fn integer_extremes() {
        assert_roundtrip(Document::new()
            .append("a", i32::MIN)
            .append("b", i32::MAX)
            .append("c", i64::MIN)
            .append("d", i64::MAX)
            .append("e", 0i32)
            .append("f", 0i64));
    }

    #[test]
    fn doubles() {
        assert_roundtrip(Document::new()
            .append("max", f64::MAX)
            .append("min", f64::MIN)
            .append("pi", std::f64::consts::PI)
            .append("inf", f64::INFINITY)
            .append("neg", f64::NEG_INFINITY)
            .append("zero", -0.0f64));
    }

    #[test]
    fn strings() {
        assert_roundtrip(Document::new()
            .append("empty", "")
            .append("umlaut", "Üben von Xylophon und Querflöte ist ja zweckmäßig.")
            .append("nul", "strings may contain \0 bytes"));
    }

    #[test]
    fn object_ids() {
        assert_roundtrip(Document::new().append("_id", ObjectId::from_bytes([0xde; 12])));
    }

    #[test]
    fn width_fidelity() {
        let mut buf = Vec::new();
        Encoder::encode(&Document::new().append("i", 7i32), &mut buf).unwrap();
        assert_eq!(0x10, buf[4]);
        let (document, _) = Decoder::decode(&buf).unwrap();
        assert_eq!(Some(&Value::Int32(7)), document.get("i"));

        buf.clear();
        Encoder::encode(&Document::new().append("i", 7i64), &mut buf).unwrap();
        assert_eq!(0x12, buf[4]);
        let (document, _) = Decoder::decode(&buf).unwrap();
        assert_eq!(Some(&Value::Int64(7)), document.get("i"));
    }

    #[test]
    fn arrays() {
        assert_roundtrip(Document::new().append_array("fib", vec![1i32, 1, 2, 3, 5, 8]));
        assert_roundtrip(Document::new().append("empty", Value::Array(Vec::new())));
        assert_roundtrip(Document::new().append("mixed", vec![
                Value::Int32(1),
                Value::String(Cow::Borrowed("two")),
                Value::Null,
                Value::Bool(true),
        ]));
    }

    #[test]
    fn array_reuses_document_layout() {
        let mut array = Vec::new();
        Encoder::encode(&Document::new().append_array("v", vec![7i32, 8, 9]), &mut array).unwrap();
        let mut document = Vec::new();
        Encoder::encode(&Document::new().append("v", Document::new()
                .append("0", 7i32)
                .append("1", 8i32)
                .append("2", 9i32)), &mut document).unwrap();
        // the encodings differ in the tag byte on the parent field, nowhere else
        assert_eq!(0x04, array[4]);
        assert_eq!(0x03, document[4]);
        assert_eq!(array[..4], document[..4]);
        assert_eq!(array[5..], document[5..]);
    }

    #[test]
    fn nested() {
        assert_roundtrip(Document::new()
            .append("outer", Document::new()
                .append("inner", Document::new().append_array("leaf", vec![1i64, 2]))
                .append("sibling", "s"))
            .append_array("matrix", vec![
                Value::Array(vec![Value::Int32(1), Value::Int32(2)]),
                Value::Array(vec![Value::Int32(3), Value::Int32(4)]),
            ]));
    }

    #[test]
    fn duplicate_keys() {
        let document = Document::new().append("k", 1i32).append("k", 2i32).append("k", "three");
        let mut buf = Vec::new();
        Encoder::encode(&document, &mut buf).unwrap();
        let (decoded, _) = Decoder::decode(&buf).unwrap();
        assert_eq!(document, decoded);
        assert_eq!(3, decoded.len());
        assert_eq!(Some(&Value::Int32(1)), decoded.get("k"));
    }

    #[test]
    fn length_prefix_is_exact() {
        let document = Document::new()
            .append("a", 1i32)
            .append("b", Document::new().append("c", "d"))
            .append_array("e", vec![true, false]);
        let mut buf = Vec::new();
        let written = Encoder::encode(&document, &mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(buf.len(), <i32>::from_le_bytes(buf[..4].try_into().unwrap()) as usize);
    }

    #[test]
    fn trailing_bytes_are_reported_not_consumed() {
        let mut buf = Vec::new();
        Encoder::encode(&Document::new().append("n", Value::Null), &mut buf).unwrap();
        let length = buf.len();
        buf.extend_from_slice(&[0xaa, 0xbb]);
        let (_, consumed) = Decoder::decode(&buf).unwrap();
        assert_eq!(length, consumed);
    }

    #[test]
    fn append_leaves_clones_alone() {
        let one = Document::new().append("a", 1i32);
        let two = one.clone().append("b", 2i32);
        assert_eq!(1, one.len());
        assert_eq!(2, two.len());
        assert_eq!(None, one.get("b"));
    }

    #[test]
    fn access() {
        let value = Value::Int32(5);
        assert_eq!(5, value.as_i32().unwrap());
        let error = value.as_str().unwrap_err();
        assert_eq!(Tag::String, error.expected);
        assert_eq!(Tag::Int32, error.actual);
        assert!(Value::Null.as_document().is_err());
        assert!(Value::Bool(true).as_i64().is_err());
    }

    #[test]
    fn encode_rejects_nul_in_keys() {
        let mut buf = Vec::new();
        let result = Encoder::encode(&Document::new().append("bad\0key", 1i32), &mut buf);
        assert!(matches!(result, Err(EncodeError::Key(_))));
    }

    #[test]
    fn errors() {
        let buf = [];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Eof));
        // declared length exceeds the buffer
        let buf = [0x10, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Length(16)));
        // declared length below the minimal frame
        let buf = [0x04, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Length(4)));
        // unknown tag byte
        let buf = [0x08, 0x00, 0x00, 0x00, 0xab, 0x78, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Tag(0xab)));
        // recognized tags without an implemented layout
        let buf = [0x08, 0x00, 0x00, 0x00, 0x05, 0x78, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Unsupported(Tag::Binary)));
        let buf = [0x08, 0x00, 0x00, 0x00, 0x0b, 0x78, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Unsupported(Tag::Regex)));
        // boolean payload out of range
        let buf = [0x09, 0x00, 0x00, 0x00, 0x08, 0x78, 0x00, 0x02, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Bool(0x02)));
        // string payload without its NUL
        let buf = [0x0d, 0x00, 0x00, 0x00, 0x02, 0x78, 0x00, 0x01, 0x00, 0x00, 0x00, 0x41, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Terminator));
        // invalid utf-8 in a string
        let buf = [0x0e, 0x00, 0x00, 0x00, 0x02, 0x78, 0x00, 0x02, 0x00, 0x00, 0x00, 0xc3, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Utf8(_)));
        // terminator before the declared end
        let buf = [0x07, 0x00, 0x00, 0x00, 0x0a, 0x78, 0x00, 0x00];
        assert!(matches!(Decoder::decode(&buf).unwrap_err().into_inner(), DecodeError::Length(7)));
    }

    #[test]
    fn no_partial_document_on_any_prefix() {
        let mut buf = Vec::new();
        Encoder::encode(&Document::new().append("a", 1i32).append("b", 2i32), &mut buf).unwrap();
        for cut in 0..buf.len() {
            assert!(Decoder::decode(&buf[..cut]).is_err());
        }
    }

    #[test]
    fn display() {
        let document = Document::new()
            .append("name", "Jessica\n\"the fishing cat\"")
            .append("age", 4i32)
            .append("weights", vec![Value::Double(7.5), Value::Double(8.25)])
            .append("id", ObjectId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]))
            .append("den", Document::new()
                .append("lat", 52.52)
                .append("tags", Value::Array(Vec::new())));
        let expected = concat!(
            "{\n",
            "  \"name\": \"Jessica\\n\\\"the fishing cat\\\"\",\n",
            "  \"age\": 4,\n",
            "  \"weights\": [\n",
            "    7.5,\n",
            "    8.25,\n",
            "  ],\n",
            "  \"id\": ObjectId(\"0102030405060708090a0b0c\"),\n",
            "  \"den\": {\n",
            "    \"lat\": 52.52,\n",
            "    \"tags\": [],\n",
            "  },\n",
            "}");
        assert_eq!(expected, format!("{}", &document));
        assert_eq!("{}", format!("{}", &Document::new()));
    }

    fn assert_roundtrip(document: Document) {
        let mut buf = Vec::new();
        let _ = Encoder::encode(&document, &mut buf);
        let (decoded, consumed) = Decoder::decode(&buf).unwrap();
        assert_eq!(document, decoded);
        assert_eq!(buf.len(), consumed);
    }

}
