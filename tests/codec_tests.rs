use serde_json::json;
use toon_legend::legend::build_legend;
use toon_legend::{
    decode, decode_with_options, encode, encode_with_options, from_str_with_options, to_value, toon,
    Error, ToonMap, ToonOptions, Value,
};

const LEGACY_AIRPORTS: &str = include_str!("fixtures/airports_legacy.toon");

fn roundtrip(doc: &Value) -> String {
    let text = encode(doc).unwrap();
    let back = decode(&text).unwrap_or_else(|e| panic!("decode failed: {}\n{}", e, text));
    assert_eq!(&back, doc, "text was:\n{}", text);
    text
}

fn airports() -> Value {
    toon!({
        "airports": [
            { "icao": "VABB", "city": "Mumbai", "airport_name": "Chhatrapati Shivaji Maharaj International Airport", "iata": "BOM" },
            { "icao": "VAAM", "city": "Amravati", "airport_name": "Amravati Airport", "iata": null },
            { "icao": "VODX", "city": "Shibpur (Diglipur, A&N Islands)", "airport_name": "INS Kohassa (Shibpur Airstrip)", "iata": null }
        ]
    })
}

fn metar_schema() -> Value {
    to_value(&json!({
        "_id": "ObjectId",
        "stationICAO": "String",
        "stationIATA": "String",
        "hasMetarData": "Boolean",
        "hasTaforData": "Boolean",
        "metar": {
            "updatedTime": "DateTime (ISO 8601)",
            "firRegion": "String",
            "rawData": "String",
            "decodedData": {
                "observation": {
                    "observationTimeUTC": "DateTime (ISO 8601)",
                    "observationTimeIST": "DateTime (ISO 8601)",
                    "windSpeed": "String",
                    "windDirection": "String",
                    "horizontalVisibility": "String",
                    "weatherConditions": "Null",
                    "cloudLayers": ["String"],
                    "airTemperature": "String",
                    "dewpointTemperature": "String",
                    "observedQNH": "String",
                    "runwayVisualRange": "Null",
                    "windShear": "Null",
                    "runwayConditions": "Null"
                },
                "additionalInformation": {
                    "weatherTrend": "Null",
                    "forecastWeather": "Null"
                },
                "tempoSection": {
                    "type": "Null",
                    "timePeriod": "Null",
                    "windSpeed": "Null",
                    "windDirection": "Null",
                    "visibility": "Null",
                    "weatherConditions": "Null"
                }
            }
        },
        "tafor": {
            "rawData": "String",
            "updatedTime": "Null",
            "timestamp": "DateTime (ISO 8601)"
        }
    }))
    .unwrap()
}

fn metar_report() -> Value {
    to_value(&json!({
        "stationICAO": "VABB",
        "stationIATA": "BOM",
        "hasMetarData": true,
        "hasTaforData": false,
        "metar": {
            "updatedTime": "2025-10-19T06:30:00Z",
            "firRegion": "Mumbai",
            "rawData": "METAR VABB 190630Z 27010KT 3000 HZ FEW018 SCT100 31/24 Q1008 NOSIG",
            "decodedData": {
                "observation": {
                    "observationTimeUTC": "2025-10-19T06:30:00Z",
                    "windSpeed": 10,
                    "windDirection": 270,
                    "horizontalVisibility": 3000,
                    "weatherConditions": null,
                    "cloudLayers": ["FEW018", "SCT100"],
                    "airTemperature": 31,
                    "dewpointTemperature": 24,
                    "observedQNH": 1008.0,
                    "runwayVisualRange": null
                },
                "additionalInformation": {
                    "weatherTrend": "NOSIG",
                    "forecastWeather": null
                },
                "tempoSection": {
                    "type": null,
                    "timePeriod": null,
                    "visibility": null
                }
            }
        },
        "tafor": null
    }))
    .unwrap()
}

#[test]
fn test_homogeneous_records_become_one_table() {
    let text = roundtrip(&airports());
    assert_eq!(text.matches("airports[3]{").count(), 1);
    assert!(text.contains("airports[3]{i,c,a,ia}:"));
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn test_trailing_empty_field_is_null() {
    let doc = decode("legend:{i:icao,c:city,a:airport_name,t:iata}\nairports[1]{i,c,a,t}:\nVAAM,Amravati,Amravati Airport,").unwrap();
    let record = doc.pointer("airports.0").and_then(Value::as_object).unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(record.get("iata"), Some(&Value::Null));
}

#[test]
fn test_delimiter_inside_value() {
    let text = roundtrip(&airports());
    assert!(text.contains("VODX,\"Shibpur (Diglipur, A&N Islands)\",INS Kohassa (Shibpur Airstrip),"));
}

#[test]
fn test_empty_string_differs_from_null() {
    let doc = toon!([{ "a": "", "b": null }, { "a": null, "b": "" }]);
    let text = roundtrip(&doc);
    assert!(text.ends_with("\"\",\n,\"\""));
}

#[test]
fn test_row_count_mismatch() {
    let err = decode("airports[3]{icao,iata}:\nVABB,BOM\nVAAM,").unwrap_err();
    assert!(matches!(
        err,
        Error::RowCountMismatch { ref path, line: 1, expected: 3, found: 2 } if path == "airports"
    ));

    // Rows stop at the next keyed line.
    let err = decode("airports[3]{icao,iata}:\nVABB,BOM\nVAAM,\ncount:2").unwrap_err();
    assert!(matches!(err, Error::RowCountMismatch { found: 2, .. }));
}

#[test]
fn test_column_count_mismatch() {
    let err = decode("[2]{a,b}:\n1,2\n3").unwrap_err();
    assert!(matches!(
        err,
        Error::ColumnCountMismatch { line: 3, expected: 2, found: 1, .. }
    ));

    // A trailing delimiter is one more empty field, not nothing.
    let err = decode("[1]{a,b}:\n1,2,").unwrap_err();
    assert!(matches!(err, Error::ColumnCountMismatch { found: 3, .. }));

    let err = decode("layers[3]:FEW018,SCT100").unwrap_err();
    assert!(matches!(err, Error::ColumnCountMismatch { expected: 3, found: 2, .. }));
}

#[test]
fn test_colliding_first_letters_get_distinct_aliases() {
    let legend = build_legend(&airports());
    let icao = legend.alias_for("icao");
    let iata = legend.alias_for("iata");
    assert_ne!(icao, iata);

    let mut seen = std::collections::HashSet::new();
    for (alias, key) in legend.iter() {
        assert!(seen.insert(alias), "alias {} reused", alias);
        assert!(key.starts_with(alias));
    }
}

#[test]
fn test_heterogeneous_arrays_fall_back() {
    let docs = [
        toon!([{ "a": 1 }, { "b": 2 }]),
        toon!([{ "a": 1, "b": 2 }, { "b": 3, "a": 4 }]),
        toon!([{ "a": 1 }, { "a": [1, 2] }]),
        toon!([{ "a": 1 }, 2]),
        toon!([{}, {}]),
    ];
    for doc in &docs {
        let text = roundtrip(doc);
        assert!(!text.contains('{') || text.contains(":{}"), "unexpected table:\n{}", text);
        assert!(!text.starts_with("legend:"));
    }
}

#[test]
fn test_key_order_is_part_of_equality() {
    assert_ne!(toon!({ "a": 1, "b": 2 }), toon!({ "b": 2, "a": 1 }));

    let same_order = toon!([{ "a": 1, "b": 2 }, { "a": 3, "b": 4 }]);
    let mixed_order = toon!([{ "a": 1, "b": 2 }, { "b": 4, "a": 3 }]);
    assert_ne!(same_order, mixed_order);

    let table = roundtrip(&same_order);
    let indexed = roundtrip(&mixed_order);
    assert_eq!(table, "legend:{a:a,b:b}\n[2]{a,b}:\n1,2\n3,4");
    assert!(indexed.starts_with("[2]:\n  0:\n"));

    let back = decode(&indexed).unwrap();
    let second = back.pointer("1").and_then(Value::as_object).unwrap();
    let keys: Vec<&str> = second.keys().map(String::as_str).collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn test_records_with_nested_cells_fall_back() {
    let doc = toon!({
        "observations": [
            { "station": "VABB", "cloudLayers": ["FEW018", "SCT100"] },
            { "station": "VOBL", "cloudLayers": ["BKN250"] }
        ]
    });
    let text = roundtrip(&doc);
    assert!(!text.starts_with("legend:"));
    assert!(!text.contains("]{"), "unexpected table:\n{}", text);
    assert!(text.starts_with("observations[2]:\n  0:\n    station:VABB\n    cloudLayers[2]:FEW018,SCT100"));
}

#[test]
fn test_legacy_payload_decodes() {
    let doc = decode(LEGACY_AIRPORTS).unwrap();
    let airports = doc.pointer("airports").and_then(Value::as_array).unwrap();
    assert_eq!(airports.len(), 12);

    let vodx = airports
        .iter()
        .find(|a| a.pointer("icao").and_then(Value::as_str) == Some("VODX"))
        .unwrap();
    assert_eq!(
        vodx.pointer("city").and_then(Value::as_str),
        Some("Shibpur (Diglipur, A&N Islands)")
    );
    assert_eq!(vodx.pointer("iata"), Some(&Value::Null));

    // Re-encoding quotes the comma instead of escaping it.
    let text = roundtrip(&doc);
    assert!(text.contains("\"Shibpur (Diglipur, A&N Islands)\""));
}

#[test]
fn test_legacy_payload_with_crlf() {
    let crlf = LEGACY_AIRPORTS.replace('\n', "\r\n");
    assert_eq!(decode(&crlf).unwrap(), decode(LEGACY_AIRPORTS).unwrap());
}

#[test]
fn test_type_schema_round_trip() {
    let schema = metar_schema();
    let text = roundtrip(&schema);
    assert!(!text.starts_with("legend:"));
    assert!(text.starts_with("_id:ObjectId\nstationICAO:String\n"));
    assert!(text.contains("\n  updatedTime:DateTime (ISO 8601)\n"));
    assert!(text.contains("\n      weatherConditions:Null\n"));
    assert!(text.contains("\n      cloudLayers[1]:String\n"));
    assert!(text.ends_with("tafor:\n  rawData:String\n  updatedTime:Null\n  timestamp:DateTime (ISO 8601)"));

    // Leaves stay strings, never null or bool.
    let back = decode(&text).unwrap();
    assert_eq!(
        back.pointer("metar.decodedData.tempoSection.type"),
        Some(&Value::from("Null"))
    );
}

#[test]
fn test_report_round_trip() {
    let report = metar_report();
    let text = roundtrip(&report);
    assert!(text.contains("\n      weatherConditions:\n"));
    assert!(text.contains("\n      cloudLayers[2]:FEW018,SCT100\n"));
    assert!(text.contains("\n      observedQNH:1008.0\n"));
    assert!(text.contains("updatedTime:\"2025-10-19T06:30:00Z\""));
    assert!(text.ends_with("\ntafor:"));
}

#[test]
fn test_reports_in_a_list() {
    let mut second = metar_report();
    if let Value::Object(map) = &mut second {
        map.insert("stationICAO".to_string(), Value::from("VOBL"));
        map.insert("hasMetarData".to_string(), Value::Bool(false));
        map.insert("metar".to_string(), Value::Null);
    }
    let doc = Value::Array(vec![metar_report(), second]);
    let text = roundtrip(&doc);
    assert!(text.starts_with("[2]:\n  0:\n    stationICAO:VABB"));
}

#[test]
fn test_malformed_row() {
    let err = decode("[1]{a,b}:\n\"x\"y,1").unwrap_err();
    assert!(matches!(err, Error::MalformedRow { line: 2, .. }));

    let err = decode("station:\n  name:\"open").unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedRow { ref path, line: 2, .. } if path == "station.name"
    ));
}

#[test]
fn test_unknown_alias() {
    let err = decode("legend:{i:icao}\n[1]{i,x}:\nVABB,1").unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownAlias { ref alias, line: 2 } if alias == "x"
    ));
}

#[test]
fn test_indentation_errors() {
    let err = decode("metar:\n  firRegion:Mumbai\n    rawData:x").unwrap_err();
    assert!(matches!(
        err,
        Error::IndentationError { line: 3, expected: 2, found: 4, .. }
    ));

    let err = decode("metar:\n\tfirRegion:Mumbai").unwrap_err();
    assert!(matches!(err, Error::IndentationError { line: 2, .. }));

    let err = decode("  stationICAO:VABB").unwrap_err();
    assert!(matches!(err, Error::IndentationError { expected: 0, found: 2, .. }));
}

#[test]
fn test_unterminated_block() {
    let err = decode("mixed[3]:\n  0:1\n  1:\n    a:2").unwrap_err();
    assert!(matches!(
        err,
        Error::UnterminatedBlock { ref path, line: 1, expected: 3, found: 2 } if path == "mixed"
    ));

    let err = decode("mixed[2]:").unwrap_err();
    assert!(matches!(err, Error::UnterminatedBlock { found: 0, .. }));
}

#[test]
fn test_errors_report_lines() {
    let cases = [
        ("a:1\nrows[2]{x}:\n1", 2),
        ("legend:{i:icao}\nrows[1]{q}:\n1", 2),
        ("a:\n  b:1\n   c:2", 3),
    ];
    for (text, line) in cases {
        let err = decode(text).unwrap_err();
        assert_eq!(err.line(), Some(line), "{}", err);
    }
}

fn nested(levels: usize) -> Value {
    let mut doc = Value::from("leaf");
    for _ in 0..levels {
        let mut map = ToonMap::new();
        map.insert("n".to_string(), doc);
        doc = Value::Object(map);
    }
    doc
}

#[test]
fn test_depth_bound_rejects_runaway_nesting() {
    let err = encode(&nested(500)).unwrap_err();
    assert!(matches!(err, Error::CyclicStructure { depth: 128 }));

    let options = ToonOptions::new().with_max_depth(600);
    let text = encode_with_options(&nested(500), options).unwrap();
    assert!(decode(&text).is_err());

    assert!(encode(&nested(100)).is_ok());
}

#[test]
fn test_decode_honours_configured_depth() {
    let doc = nested(200);
    let options = ToonOptions::new().with_max_depth(300);
    let text = encode_with_options(&doc, options.clone()).unwrap();

    assert!(matches!(decode(&text), Err(Error::Syntax { .. })));
    assert_eq!(decode_with_options(&text, options.clone()).unwrap(), doc);

    let back: Value = from_str_with_options(&text, options).unwrap();
    assert_eq!(back, doc);

    let shallow = ToonOptions::new().with_max_depth(3);
    let text = encode(&nested(5)).unwrap();
    assert!(decode_with_options(&text, shallow).is_err());
}

#[test]
fn test_indent_width_does_not_matter_to_decode() {
    let report = metar_report();
    for indent in [1, 2, 4, 8] {
        let text = encode_with_options(&report, ToonOptions::new().with_indent(indent)).unwrap();
        assert_eq!(decode(&text).unwrap(), report);
    }
}

#[test]
fn test_legend_can_be_turned_off() {
    let text = encode_with_options(&airports(), ToonOptions::new().with_legend(false)).unwrap();
    assert!(text.starts_with("airports[3]{icao,city,airport_name,iata}:"));
    assert_eq!(decode(&text).unwrap(), airports());
}

#[test]
fn test_key_named_legend() {
    roundtrip(&toon!({ "legend": {} }));
    roundtrip(&toon!({ "legend": {}, "rows": [{ "a": 1 }] }));
    roundtrip(&toon!({ "legend": "{i:icao}" }));
}

#[test]
fn test_single_column_tables_with_nulls() {
    roundtrip(&toon!([{ "a": 1 }, { "a": null }]));
    roundtrip(&toon!({ "t": [{ "a": null }, { "a": 2 }], "after": true }));
    roundtrip(&toon!({ "outer": { "t": [{ "a": null }] }, "after": 1 }));
}

#[test]
fn test_scalar_edge_cases() {
    let doc = toon!({
        "empty": "",
        "spaced": " pad ",
        "numeric": "1008",
        "boolish": "true",
        "time": "06:30",
        "quote": "say \"hi\"",
        "path": "C:\\data",
        "multi": "line one\nline two",
        "unicode": "Mumbai मुंबई",
        "brace": "{x}",
        "negative": (-12),
        "float": 0.1,
        "big": 1e21,
        "huge": 123456789012345678901234567890u128
    });
    roundtrip(&doc);
}

#[test]
fn test_nested_tables() {
    let doc = toon!({
        "regions": [
            { "name": "west", "airports": [{ "icao": "VABB" }, { "icao": "VAAH" }] },
            { "name": "south", "airports": [{ "icao": "VOBL" }] }
        ]
    });
    let text = roundtrip(&doc);
    assert!(text.contains("airports[2]{i}:"));
    assert!(text.contains("airports[1]{i}:"));
}
