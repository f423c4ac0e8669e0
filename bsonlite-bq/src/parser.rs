use nom::{
    Finish,
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while_m_n},
    character::complete::{char, digit1, none_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
};
use bsonlite::{Document, ObjectId, Value};
use anyhow::{Result, anyhow};

const WHITESPACE: &str = " \t\r\n";

fn white(i: &str) -> IResult<&str, &str> {
    take_while(move |c| WHITESPACE.contains(c))(i)
}

fn keyword(i: &str) -> IResult<&str, Value<'static>> {
    alt((
            value(Value::Null, tag("null")),
            value(Value::Undefined, tag("undefined")),
            value(Value::Bool(true), tag("true")),
            value(Value::Bool(false), tag("false")),
    ))(i)
}

fn double(i: &str) -> IResult<&str, f64> {
    map_res(recognize(tuple((opt(tag("-")), digit1, tag("."), digit1))), |n: &str| n.parse())(i)
}

/// Integer literals become Int32 when they fit, Int64 otherwise. The textual
/// form is diagnostic and does not preserve the width of the original.
fn integer(i: &str) -> IResult<&str, Value<'static>> {
    map(map_res(recognize(tuple((opt(tag("-")), digit1))), |n: &str| n.parse::<i64>()), |n| {
        match i32::try_from(n) {
            Ok(n) => Value::Int32(n),
            Err(_) => Value::Int64(n),
        }
    })(i)
}

fn object_id(i: &str) -> IResult<&str, ObjectId> {
    map_res(
            delimited(tag("ObjectId(\""), take_while_m_n(24, 24, |c: char| c.is_ascii_hexdigit()), tag("\")")),
            ObjectId::parse_str,
    )(i)
}

fn string(i: &str) -> IResult<&str, String> {
    delimited(
            tag("\""),
            map(opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                        value("\\", tag("\\")),
                        value("\"", tag("\"")),
                        value("\n", tag("n")),
                )))), |c| c.unwrap_or_default()),
            tag("\""),
    )(i)
}

fn bson_value(i: &str) -> IResult<&str, Value<'static>> {
    preceded(white, alt((
        map(string, Value::from),
        map(object_id, Value::from),
        map(double, Value::from),
        integer,
        keyword,
        map(document, Value::from),
        map(array, Value::Array),
    )))(i)
}

fn array(i: &str) -> IResult<&str, Vec<Value<'static>>> {
    delimited(
            char('['),
            terminated(separated_list0(preceded(white, char(',')), bson_value), opt(preceded(white, char(',')))),
            preceded(white, char(']')),
    )(i)
}

fn pair(i: &str) -> IResult<&str, (String, Value<'static>)> {
    separated_pair(preceded(white, string), preceded(white, char(':')), bson_value)(i)
}

fn document(i: &str) -> IResult<&str, Document<'static>> {
    map(delimited(
            preceded(white, char('{')),
            terminated(separated_list0(preceded(white, char(',')), pair), opt(preceded(white, char(',')))),
            preceded(white, char('}')),
    ), |pairs| pairs.into_iter().fold(Document::new(), |document, (key, value)| document.append(key, value)))(i)
}

pub fn parse(i: &str) -> Result<Document<'static>> {
    Ok(all_consuming(terminated(document, white))(i).finish().map_err(|e| anyhow!("{}", e))?.1)
}
