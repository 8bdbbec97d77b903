//! Encoding a type-schema document and a station report that follows it.
//!
//! Run with: cargo run --example metar_schema

use serde::{Deserialize, Serialize};
use std::error::Error;
use toon_legend::{decode, encode, from_str, to_string, toon};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Observation {
    wind_speed: Option<u16>,
    wind_direction: Option<u16>,
    weather_conditions: Option<String>,
    cloud_layers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Report {
    #[serde(rename = "stationICAO")]
    station_icao: String,
    has_metar_data: bool,
    raw_data: String,
    observation: Observation,
}

fn main() -> Result<(), Box<dyn Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let schema = toon!({
        "_id": "ObjectId",
        "stationICAO": "String",
        "hasMetarData": "Boolean",
        "metar": {
            "updatedTime": "DateTime (ISO 8601)",
            "decodedData": {
                "observation": {
                    "windSpeed": "String",
                    "weatherConditions": "Null",
                    "cloudLayers": ["String"]
                },
                "tempoSection": { "type": "Null", "visibility": "Null" }
            }
        },
        "tafor": { "rawData": "String", "updatedTime": "Null" }
    });

    let schema_text = encode(&schema)?;
    println!("Schema:\n{}\n", schema_text);
    assert_eq!(decode(&schema_text)?, schema);

    let report = Report {
        station_icao: "VABB".to_string(),
        has_metar_data: true,
        raw_data: "METAR VABB 190630Z 27010KT 3000 HZ FEW018 SCT100 31/24 Q1008 NOSIG".to_string(),
        observation: Observation {
            wind_speed: Some(10),
            wind_direction: Some(270),
            weather_conditions: None,
            cloud_layers: vec!["FEW018".to_string(), "SCT100".to_string()],
        },
    };

    let report_text = to_string(&report)?;
    println!("Report:\n{}\n", report_text);
    assert_eq!(from_str::<Report>(&report_text)?, report);
    println!("✓ Round-trip successful");
    Ok(())
}
