//! The [`toon!`](crate::toon) macro for building documents inline.

/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Object keys must be literals; every value is a single token tree, so a
/// negative number goes in parentheses. Any other expression is converted
/// through [`to_value`](crate::to_value), falling back to `Null` when it
/// cannot be serialized.
///
/// ```rust
/// use toon_legend::{toon, Value};
///
/// let station = toon!({
///     "stationICAO": "VABB",
///     "hasMetarData": true,
///     "temperature": (-2),
///     "weather": null,
///     "cloudLayers": ["FEW018", "SCT100"],
///     "remarks": {}
/// });
///
/// assert_eq!(station.pointer("cloudLayers.1"), Some(&Value::from("SCT100")));
/// assert_eq!(station.pointer("temperature"), Some(&Value::from(-2)));
/// ```
#[macro_export]
macro_rules! toon {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Value::Array(::std::vec![$($crate::toon!($elem)),+])
    };

    ({}) => {
        $crate::Value::Object($crate::ToonMap::new())
    };

    ({ $($key:literal : $value:tt),+ $(,)? }) => {{
        let mut object = $crate::ToonMap::new();
        $(
            object.insert(::std::string::ToString::to_string(&$key), $crate::toon!($value));
        )+
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}
