//! Error types for TOON encoding and decoding.
//!
//! Decoding never guesses: every malformed construct is reported to the
//! caller with the block path and the 1-based line where it was found.
//!
//! ## Error Categories
//!
//! - **Row errors**: [`Error::MalformedRow`], [`Error::ColumnCountMismatch`]
//! - **Block errors**: [`Error::RowCountMismatch`], [`Error::UnterminatedBlock`]
//! - **Legend errors**: [`Error::UnknownAlias`]
//! - **Layout errors**: [`Error::IndentationError`], [`Error::Syntax`]
//! - **Encoding errors**: [`Error::CyclicStructure`]
//!
//! ## Examples
//!
//! ```rust
//! use toon_legend::{decode, Error};
//!
//! let result = decode("rows[3]{a,b}:\n1,2\n3,4");
//! assert!(matches!(result, Err(Error::RowCountMismatch { expected: 3, found: 2, .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding TOON text.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A field has an unescaped delimiter or broken quoting
    #[error("Malformed field in '{path}' at line {line}: {msg}")]
    MalformedRow {
        path: String,
        line: usize,
        msg: String,
    },

    /// A block declared more rows than are available before the next block
    #[error("Block '{path}' at line {line} declares {expected} rows, found {found}")]
    RowCountMismatch {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A row does not split into the declared number of fields
    #[error("Row in '{path}' at line {line} has {found} fields, expected {expected}")]
    ColumnCountMismatch {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A column identifier is neither a legend alias nor a legend key
    #[error("Unknown alias '{alias}' at line {line}\nHelp: every column must be declared in the legend line")]
    UnknownAlias { alias: String, line: usize },

    /// Indentation error in nested structures
    #[error("Indentation error at line {line}, column {col}:\n{context}\nExpected {expected} spaces, found {found} spaces")]
    IndentationError {
        line: usize,
        col: usize,
        expected: usize,
        found: usize,
        context: String,
    },

    /// A block ended before its declared element count was reached
    #[error("Block '{path}' at line {line} declares {expected} elements, found {found} before the block ended")]
    UnterminatedBlock {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Nesting exceeded the configured depth bound
    #[error("Structure nests deeper than {depth} levels; cyclic input is not representable")]
    CyclicStructure { depth: usize },

    /// Syntax error with detailed context
    #[error("Syntax error at line {line}, column {col}:\n{context}\n{msg}{suggestion}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        context: String,
        suggestion: String,
    },

    /// A scalar did not have the requested kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Unsupported type for the requested operation
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),

    /// Generic message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: String::new(),
            suggestion: String::new(),
        }
    }

    /// Creates a syntax error with the offending line and an optional suggestion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::Error;
    ///
    /// let err = Error::syntax_with_context(
    ///     3,
    ///     1,
    ///     "missing ':' after key",
    ///     "name Alice",
    ///     Some("write 'name:Alice'"),
    /// );
    /// assert!(err.to_string().contains("Help:"));
    /// ```
    pub fn syntax_with_context(
        line: usize,
        col: usize,
        msg: &str,
        context: &str,
        suggestion: Option<&str>,
    ) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
            suggestion: suggestion
                .map(|s| format!("\nHelp: {}", s))
                .unwrap_or_default(),
        }
    }

    /// Creates a malformed-field error for the block at `path`.
    pub fn malformed_row(path: &str, line: usize, msg: &str) -> Self {
        Error::MalformedRow {
            path: path.to_string(),
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates an indentation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::Error;
    ///
    /// let err = Error::indentation_error(8, 1, 2, 4, "    name:Alice");
    /// assert!(err.to_string().contains("Expected 2 spaces"));
    /// ```
    pub fn indentation_error(
        line: usize,
        col: usize,
        expected: usize,
        found: usize,
        context: &str,
    ) -> Self {
        Error::IndentationError {
            line,
            col,
            expected,
            found,
            context: context.to_string(),
        }
    }

    /// Creates a type mismatch error for scalar decoding with an expected kind.
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_legend::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the 1-based input line the error points at, when it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedRow { line, .. }
            | Error::RowCountMismatch { line, .. }
            | Error::ColumnCountMismatch { line, .. }
            | Error::UnknownAlias { line, .. }
            | Error::IndentationError { line, .. }
            | Error::UnterminatedBlock { line, .. }
            | Error::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
