//! Configuration options for TOON encoding.
//!
//! [`ToonOptions`] controls how a document is laid out; decoding needs no
//! configuration because indentation width is inferred from the input and the
//! legend travels with the text.
//!
//! ## Examples
//!
//! ```rust
//! use toon_legend::{encode_with_options, toon, ToonOptions};
//!
//! let doc = toon!({ "station": { "icao": "VABB" } });
//!
//! let options = ToonOptions::new().with_indent(4);
//! let text = encode_with_options(&doc, options).unwrap();
//! assert_eq!(text, "station:\n    icao:VABB");
//! ```

/// Default bound on nesting depth, shared by the encoder, the decoder and
/// the serde value serializer.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for TOON encoding.
///
/// # Examples
///
/// ```rust
/// use toon_legend::ToonOptions;
///
/// // Defaults: 2-space indent, legend on
/// let options = ToonOptions::new();
/// assert_eq!(options.indent, 2);
/// assert!(options.legend);
///
/// // Full keys in every table header
/// let options = ToonOptions::new().with_legend(false);
/// assert!(!options.legend);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ToonOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Alias table columns through a `legend:{…}` line.
    pub legend: bool,
    /// Nesting bound; deeper input is rejected as cyclic.
    pub max_depth: usize,
}

impl Default for ToonOptions {
    fn default() -> Self {
        ToonOptions {
            indent: 2,
            legend: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ToonOptions {
    /// Creates default options (2-space indent, legend on, depth bound 128).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-space indentation, the smallest layout the decoder accepts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::ToonOptions;
    ///
    /// assert_eq!(ToonOptions::compact().indent, 1);
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        ToonOptions {
            indent: 1,
            ..Default::default()
        }
    }

    /// Four-space indentation for human review of prompt payloads.
    #[must_use]
    pub fn pretty() -> Self {
        ToonOptions {
            indent: 4,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// A width of zero would flatten nesting, so it is clamped to one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::ToonOptions;
    ///
    /// assert_eq!(ToonOptions::new().with_indent(0).indent, 1);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }

    /// Enables or disables the column legend.
    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Sets the nesting bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
