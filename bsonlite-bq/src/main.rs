mod parser;

use bsonlite::{Decoder, Encoder};
use std::io::{self, Read, Write};
use anyhow::{Context, Result};
use structopt::StructOpt;

/// Decode and print BSON documents
#[derive(StructOpt)]
#[structopt(name = "bq")]
struct Opt {
    /// parse a textual representation and encode it into a binary document instead
    #[structopt(short, long)]
    encode: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    if opt.encode {
        encode(&buffer)
    } else {
        print(&buffer)
    }
}

fn print(buffer: &[u8]) -> Result<()> {
    let (document, _) = Decoder::decode(buffer).context("Decoding error")?;
    println!("{}", &document);
    Ok(())
}

fn encode(buffer: &[u8]) -> Result<()> {
    let string = std::str::from_utf8(buffer).context("input is not utf-8")?;
    let document = parser::parse(string)?;
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    Encoder::encode(&document, &mut lock).context("Encoding error")?;
    lock.flush()?;
    Ok(())
}
