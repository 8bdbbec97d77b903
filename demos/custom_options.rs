//! Customizing TOON output with ToonOptions.
//!
//! Run with: cargo run --example custom_options

use serde::{Deserialize, Serialize};
use std::error::Error;
use toon_legend::{to_string_with_options, ToonOptions};

#[derive(Debug, Serialize, Deserialize)]
struct Airport {
    icao: String,
    iata: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Region {
    name: String,
    airports: Vec<Airport>,
    notes: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let region = Region {
        name: "West".to_string(),
        airports: vec![
            Airport {
                icao: "VABB".to_string(),
                iata: Some("BOM".to_string()),
            },
            Airport {
                icao: "VAAM".to_string(),
                iata: None,
            },
        ],
        notes: vec!["NOTAM VABB RWY 09/27".to_string()],
    };

    // Default: 2-space indent, column legend
    println!("Default:");
    println!("{}\n", toon_legend::to_string(&region)?);

    // Full column keys in every header
    println!("Without legend:");
    let options = ToonOptions::new().with_legend(false);
    println!("{}\n", to_string_with_options(&region, options)?);

    // Wider indentation
    println!("Four-space indent:");
    println!("{}\n", toon_legend::to_string_pretty(&region)?);

    // A tight depth bound rejects the table's records
    println!("Depth bound of 1:");
    let options = ToonOptions::new().with_max_depth(1);
    match to_string_with_options(&region, options) {
        Ok(text) => println!("{}", text),
        Err(e) => println!("rejected: {}", e),
    }

    Ok(())
}
