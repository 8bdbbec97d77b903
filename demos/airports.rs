//! Decoding a legacy airport table and re-encoding it.
//!
//! Run with: RUST_LOG=toon_legend=trace cargo run --example airports

use std::error::Error;
use toon_legend::{decode, encode, Value};
use tracing_subscriber::{fmt, EnvFilter};

const PAYLOAD: &str = include_str!("../tests/fixtures/airports_legacy.toon");

fn main() -> Result<(), Box<dyn Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let doc = decode(PAYLOAD)?;
    let airports = doc
        .pointer("airports")
        .and_then(Value::as_array)
        .ok_or("payload has no airports table")?;
    println!("Decoded {} airports", airports.len());

    let missing_iata = airports
        .iter()
        .filter(|a| a.pointer("iata").is_some_and(Value::is_null))
        .count();
    println!("  without an IATA code: {}", missing_iata);

    if let Some(city) = airports
        .iter()
        .find(|a| a.pointer("icao").and_then(Value::as_str) == Some("VODX"))
        .and_then(|a| a.pointer("city"))
        .and_then(Value::as_str)
    {
        println!("  VODX city: {}", city);
    }

    let text = encode(&doc)?;
    println!("\nRe-encoded:\n{}\n", text);

    let json = serde_json::to_string(&serde_json::to_value(&doc)?)?;
    println!("TOON: {} bytes", text.len());
    println!("JSON: {} bytes", json.len());

    assert_eq!(decode(&text)?, doc);
    println!("✓ Round-trip successful");
    Ok(())
}
