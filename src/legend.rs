//! Column legend: short aliases for table column keys.
//!
//! A document's legend is built once per encoding. Only keys that end up in a
//! tabular header are aliased; every other key is written in full. The legend
//! is emitted as the first line of the text:
//!
//! ```text
//! legend:{i:icao,c:city,a:airport_name,ia:iata}
//! airports[2]{i,c,a,ia}:
//! VABB,Mumbai,Chhatrapati Shivaji Maharaj International Airport,BOM
//! VOBL,Bengaluru,Kempegowda International Airport,BLR
//! ```
//!
//! ## Alias rule
//!
//! Keys are visited depth-first in document order. Each column key gets the
//! shortest prefix of itself (counted in characters) that is not already an
//! alias, not another column key, and not an ordinary object key in the same
//! document. Column keys never claim each other, so the longest prefix, the
//! key itself, is always free.
//!
//! ```rust
//! use toon_legend::{legend::build_legend, toon};
//!
//! let doc = toon!({
//!     "airports": [
//!         { "icao": "VABB", "iata": "BOM" },
//!         { "icao": "VOBL", "iata": "BLR" }
//!     ]
//! });
//!
//! let legend = build_legend(&doc);
//! assert_eq!(legend.alias_for("icao"), "i");
//! assert_eq!(legend.alias_for("iata"), "ia");
//! ```

use crate::scalar::{find_unquoted, parse_quoted, split_fields, write_key, KEY_SEPARATOR};
use crate::tabular::is_tabular;
use crate::{Error, Result, Value};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use tracing::trace;

const LEGEND_PREFIX: &str = "legend:{";

/// Alias table for one encoded document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
    aliases: IndexMap<String, String>,
    by_key: HashMap<String, String>,
}

impl Legend {
    /// Creates an empty legend. Ids resolve to themselves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aliased keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns `true` when nothing is aliased.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Iterates `(alias, key)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, k)| (a.as_str(), k.as_str()))
    }

    /// The id to write in a header for `key`: its alias, or the key itself.
    #[must_use]
    pub fn alias_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.by_key.get(key).map_or(key, String::as_str)
    }

    /// Adds an alias.
    ///
    /// # Errors
    ///
    /// Returns a message if the alias or the key is already present.
    fn insert(&mut self, alias: String, key: String) -> std::result::Result<(), String> {
        if self.aliases.contains_key(&alias) {
            return Err(format!("duplicate alias '{}' in legend", alias));
        }
        if self.by_key.contains_key(&key) {
            return Err(format!("key '{}' is aliased twice in legend", key));
        }
        self.by_key.insert(key.clone(), alias.clone());
        self.aliases.insert(alias, key);
        Ok(())
    }

    /// Maps a header id back to its full key.
    ///
    /// An empty legend resolves every id to itself. Otherwise the id must be
    /// an alias or a full key listed in the legend.
    ///
    /// ```rust
    /// use toon_legend::legend::Legend;
    ///
    /// let legend = Legend::parse("legend:{i:icao,c:city}", 1).unwrap();
    /// assert_eq!(legend.resolve("i", 2).unwrap(), "icao");
    /// assert_eq!(legend.resolve("city", 2).unwrap(), "city");
    /// assert!(legend.resolve("x", 2).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAlias`] for an id the legend does not know.
    pub fn resolve(&self, id: &str, line: usize) -> Result<String> {
        if self.is_empty() {
            return Ok(id.to_string());
        }
        if let Some(key) = self.aliases.get(id) {
            return Ok(key.clone());
        }
        if self.by_key.contains_key(id) {
            return Ok(id.to_string());
        }
        Err(Error::UnknownAlias {
            alias: id.to_string(),
            line,
        })
    }

    /// Returns `true` if `text` is a non-empty legend line.
    ///
    /// `legend:{}` is an ordinary key holding an empty object.
    #[must_use]
    pub fn is_legend_line(text: &str) -> bool {
        text.starts_with(LEGEND_PREFIX) && text.trim_end() != "legend:{}"
    }

    /// Parses a `legend:{alias:key,...}` line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for a malformed line or a duplicate alias.
    pub fn parse(text: &str, line: usize) -> Result<Legend> {
        let fail = |msg: &str| Error::syntax_with_context(line, 1, msg, text, None);

        let body = text
            .trim_end()
            .strip_prefix(LEGEND_PREFIX)
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| fail("expected 'legend:{alias:key,...}'"))?;
        if body.trim().is_empty() {
            return Err(fail("legend line declares no aliases"));
        }

        let mut legend = Legend::new();
        for pair in split_fields(body) {
            let sep = find_unquoted(pair, KEY_SEPARATOR)
                .ok_or_else(|| fail(&format!("legend entry '{}' has no ':'", pair.trim())))?;
            let alias = parse_id(&pair[..sep]).map_err(|msg| fail(&msg))?;
            let key = parse_id(&pair[sep + 1..]).map_err(|msg| fail(&msg))?;
            legend.insert(alias, key).map_err(|msg| fail(&msg))?;
        }
        Ok(legend)
    }

    /// Appends the legend line (without newline).
    pub fn write(&self, out: &mut String) {
        out.push_str(LEGEND_PREFIX);
        for (i, (alias, key)) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_key(out, alias);
            out.push(KEY_SEPARATOR);
            write_key(out, key);
        }
        out.push('}');
    }
}

/// Parses a key or column id, quoted or bare.
pub(crate) fn parse_id(token: &str) -> std::result::Result<String, String> {
    let token = token.trim();
    if token.starts_with('"') {
        let (id, used) = parse_quoted(token)?;
        if used != token.len() {
            return Err(format!("unexpected text after quoted id '{}'", token));
        }
        Ok(id)
    } else if token.is_empty() {
        Err("empty id".to_string())
    } else {
        Ok(token.to_string())
    }
}

/// Builds the legend for a document.
///
/// Traversal is iterative, so arbitrarily deep input cannot overflow the
/// stack here; depth is bounded later by the encoder.
#[must_use]
pub fn build_legend(doc: &Value) -> Legend {
    let mut columns: IndexSet<&str> = IndexSet::new();
    let mut plain: HashSet<&str> = HashSet::new();

    let mut stack = vec![doc];
    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) => {
                plain.extend(map.keys().map(String::as_str));
                stack.extend(map.values().rev());
            }
            Value::Array(items) => {
                if is_tabular(items) {
                    if let Some(Value::Object(first)) = items.first() {
                        columns.extend(first.keys().map(String::as_str));
                    }
                } else {
                    stack.extend(items.iter().rev());
                }
            }
            _ => {}
        }
    }

    let mut legend = Legend::new();
    for &key in &columns {
        let taken = |candidate: &str| {
            legend.aliases.contains_key(candidate)
                || (candidate != key && (plain.contains(candidate) || columns.contains(candidate)))
        };

        let alias = key
            .char_indices()
            .map(|(idx, ch)| &key[..idx + ch.len_utf8()])
            .find(|candidate| !taken(*candidate))
            .unwrap_or(key)
            .to_string();

        trace!(alias = %alias, key = %key, "legend alias");
        legend.by_key.insert(key.to_string(), alias.clone());
        legend.aliases.insert(alias, key.to_string());
    }
    legend
}
