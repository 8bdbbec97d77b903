//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use std::error::Error;
use toon_legend::{decode, to_string_pretty, to_value, toon, Value};

#[derive(Debug, Serialize, Deserialize)]
struct Airport {
    icao: String,
    city: String,
    iata: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build a document dynamically with the toon! macro
    let station = toon!({
        "stationICAO": "VABB",
        "hasMetarData": true,
        "visibility": 3000,
        "cloudLayers": ["FEW018", "SCT100"],
        "weatherConditions": null
    });

    println!("Station as TOON:\n{}\n", station);

    // Access values dynamically
    if let Some(icao) = station.pointer("stationICAO").and_then(Value::as_str) {
        println!("Accessing field 'stationICAO': {}", icao);
    }
    if let Some(visibility) = station.pointer("visibility").and_then(Value::as_i64) {
        println!("Accessing field 'visibility': {}", visibility);
    }
    if let Some(layers) = station.pointer("cloudLayers").and_then(Value::as_array) {
        println!("Accessing field 'cloudLayers': {} items\n", layers.len());
    }

    // Convert existing structs to Value
    let airports = vec![
        Airport {
            icao: "VABB".to_string(),
            city: "Mumbai".to_string(),
            iata: Some("BOM".to_string()),
        },
        Airport {
            icao: "VAJJ".to_string(),
            city: "Mumbai".to_string(),
            iata: None,
        },
    ];
    let value = to_value(&airports)?;
    let text = to_string_pretty(&value)?;
    println!("Airports as TOON:\n{}\n", text);

    // Decoded text is a Value again
    let back = decode(&text)?;
    println!("Type checks:");
    println!("  is_array:  {}", back.is_array());
    println!("  second iata is null: {}", back.pointer("1.iata").is_some_and(Value::is_null));

    Ok(())
}
