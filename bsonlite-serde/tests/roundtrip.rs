use serde::{Deserialize, Serialize};
use bsonlite::{Decoder, Document, Encoder, Value};
use bsonlite_serde::{from_bytes, to_bytes, Error};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
enum Status {
    Active,
    Dormant,
    Lost,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct Probe<'a> {
    name: &'a str,
    launched: i64,
    fuel: f64,
    status: Status,
    notes: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct Fleet<'a> {
    version: u32,
    #[serde(borrow)]
    probes: Vec<Probe<'a>>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
enum Command {
    Halt,
    Burn(f64),
    Vector(f64, f64, f64),
    Align { target: String, tolerance: f64 },
}

fn assert_roundtrip<'a, T: Serialize + Deserialize<'a> + PartialEq + std::fmt::Debug>(value: &T, buf: &'a mut Vec<u8>) {
    *buf = to_bytes(value).unwrap();
    let decoded: T = from_bytes(&*buf).unwrap();
    assert_eq!(*value, decoded);
}

#[test]
fn structs() {
    let mut buf = Vec::new();
    assert_roundtrip(&Fleet {
        version: 3,
        probes: vec![
            Probe { name: "Aniara", launched: 1_234_567_890_123, fuel: 0.71, status: Status::Active, notes: None },
            Probe { name: "Beagle", launched: -1, fuel: 0.0, status: Status::Lost, notes: Some("last contact 2003".to_owned()) },
        ],
    }, &mut buf);
}

#[test]
fn enums() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Plan {
        steps: Vec<Command>,
    }
    let mut buf = Vec::new();
    assert_roundtrip(&Plan { steps: vec![
        Command::Halt,
        Command::Burn(2.5),
        Command::Vector(0.0, 1.0, -1.0),
        Command::Align { target: "Deneb".to_owned(), tolerance: 0.05 },
    ]}, &mut buf);
}

#[test]
fn maps() {
    let mut counts = HashMap::new();
    counts.insert("alpha".to_owned(), 1i32);
    counts.insert("beta".to_owned(), -2);
    let mut buf = Vec::new();
    assert_roundtrip(&counts, &mut buf);
}

#[test]
fn integer_widths() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Widths {
        a: i8,
        b: u8,
        c: i16,
        d: u16,
        e: i32,
        f: u32,
        g: i64,
        h: u64,
    }
    let mut buf = Vec::new();
    assert_roundtrip(&Widths {
        a: -8,
        b: 200,
        c: -30_000,
        d: 60_000,
        e: i32::MIN,
        f: 3_000_000_000, // wider than Int32, travels as Int64
        g: i64::MAX,
        h: 18_000_000_000,
    }, &mut buf);
}

#[test]
fn options_and_units() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sparse {
        present: Option<i32>,
        absent: Option<i32>,
        unit: (),
    }
    let mut buf = Vec::new();
    assert_roundtrip(&Sparse { present: Some(4), absent: None, unit: () }, &mut buf);
}

#[test]
fn chars_and_floats() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Mixed {
        initial: char,
        ratio: f32,
    }
    let mut buf = Vec::new();
    assert_roundtrip(&Mixed { initial: 'ß', ratio: 0.25 }, &mut buf);
}

#[test]
fn u64_overflow_is_rejected() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Big {
        x: u64,
    }
    assert!(matches!(to_bytes(&Big { x: u64::MAX }), Err(Error::Int)));
}

#[test]
fn non_document_top_level_is_rejected() {
    assert!(matches!(to_bytes(&5i32), Err(Error::TopLevel(_))));
    assert!(matches!(to_bytes(&"loose string"), Err(Error::TopLevel(_))));
    assert!(matches!(to_bytes(&vec![1i32, 2]), Err(Error::TopLevel(_))));
}

#[test]
fn non_string_map_keys_are_rejected() {
    let mut map = HashMap::new();
    map.insert(1i32, "one");
    assert!(matches!(to_bytes(&map), Err(Error::KeyType)));
}

#[test]
fn trailing_input_is_rejected() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Empty {}
    let mut bytes = to_bytes(&Empty {}).unwrap();
    bytes.push(0xff);
    let result: Result<Empty, _> = from_bytes(&bytes);
    assert!(matches!(result.unwrap_err().into_inner(), Error::Trailing));
}

#[test]
fn width_overflow_on_read_is_rejected() {
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wide {
        x: i64,
    }
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Narrow {
        x: i8,
    }
    let bytes = to_bytes(&Wide { x: 1 << 20 }).unwrap();
    let result: Result<Narrow, _> = from_bytes(&bytes);
    assert!(matches!(result.unwrap_err().into_inner(), Error::Int));
}

#[test]
fn output_decodes_with_the_core_decoder() {
    let probe = Probe { name: "Aniara", launched: 42, fuel: 0.5, status: Status::Dormant, notes: None };
    let bytes = to_bytes(&probe).unwrap();
    let (document, consumed) = Decoder::decode(&bytes).unwrap();
    assert_eq!(bytes.len(), consumed);
    assert_eq!(Some(&Value::String("Aniara".into())), document.get("name"));
    assert_eq!(Some(&Value::Int64(42)), document.get("launched"));
    assert_eq!(Some(&Value::Double(0.5)), document.get("fuel"));
    assert_eq!(Some(&Value::String("Dormant".into())), document.get("status"));
    assert_eq!(Some(&Value::Null), document.get("notes"));
}

#[test]
fn core_encoder_output_deserializes() {
    let document = Document::new()
        .append("name", "Cassini")
        .append("launched", 883_612_800_000i64)
        .append("fuel", 0.04)
        .append("status", "Active")
        .append("notes", Value::Null);
    let mut bytes = Vec::new();
    Encoder::encode(&document, &mut bytes).unwrap();
    let probe: Probe = from_bytes(&bytes).unwrap();
    assert_eq!(Probe {
        name: "Cassini",
        launched: 883_612_800_000,
        fuel: 0.04,
        status: Status::Active,
        notes: None,
    }, probe);
}
