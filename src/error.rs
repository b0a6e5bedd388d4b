use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! configuration_error {
    ($fmt:expr) => {
        crate::Error::Configuration($fmt.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Configuration(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors are always local to a single generation request. A failing request never produces
/// partial output, and never prevents other, independent requests from completing.
///
/// # Error Categories
///
/// ## Request Errors
/// - [`Error::Configuration`] - The generation request is incomplete or malformed
/// - [`Error::Request`] - Wraps any failure with the configuration source it belongs to
///
/// ## Synthesis Errors
/// - [`Error::Resolution`] - A reflected type has no equivalent in the target symbol space
/// - [`Error::Arity`] - A callback needs a delegate larger than the platform provides
///
/// ## Type System Errors
/// - [`Error::TypeNotFound`] - Requested type not found in a type universe
/// - [`Error::TypeError`] - General type system operation error
/// - [`Error::RecursionLimit`] - A base-type chain is deeper than allowed (or cyclic)
/// - [`Error::Malformed`] - Inconsistent metadata handed to a builder
///
/// # Examples
///
/// ```rust,no_run
/// use hubscope::{Error, prelude::*};
///
/// # fn run(universe: &TypeRegistry, symbols: std::sync::Arc<SymbolTable>) {
/// let generator = HubProxyGenerator::new(symbols);
/// let request = GenerationRequest::new("Chat.Server.dll");
///
/// match generator.generate(&request, universe) {
///     Ok(source) => println!("{}", source.text),
///     Err(Error::Resolution { name }) => eprintln!("missing type: {}", name),
///     Err(Error::Arity { method, .. }) => eprintln!("too many parameters on {}", method),
///     Err(e) => eprintln!("generation failed: {}", e),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The generation request could not be validated.
    ///
    /// Raised eagerly at the start of a request, e.g. for a missing hub assembly path or a
    /// type name format that does not contain exactly one `{0}` placeholder.
    #[error("Invalid generation request - {0}")]
    Configuration(String),

    /// A reflected type has no equivalent in the target symbol space.
    ///
    /// Type identity between the reflected universe and the target symbol space is established
    /// purely by canonical full name. This error names the canonical name that could not be found.
    #[error("Cannot find an equivalent for \"{name}\" in the target symbol space")]
    Resolution {
        /// Canonical name (or description) of the type that could not be resolved
        name: String,
    },

    /// A client callback requires a delegate type beyond the platform ceiling.
    ///
    /// # Fields
    ///
    /// * `hub` - The hub whose synthesis was aborted
    /// * `method` - The offending client method
    /// * `arity` - The generic arity that would have been required
    /// * `max` - The largest arity the delegate family provides
    #[error("The method \"{method}\" of hub \"{hub}\" requires a delegate of arity {arity}, but at most {max} is supported")]
    Arity {
        /// The hub whose synthesis was aborted
        hub: String,
        /// The offending method name
        method: String,
        /// The required delegate arity
        arity: usize,
        /// The supported ceiling
        max: usize,
    },

    /// A generation request failed.
    ///
    /// Associates the underlying failure with the configuration source (the hub assembly path)
    /// of the request it belongs to.
    #[error("Generation for \"{source_name}\" failed - {source}")]
    Request {
        /// The hub assembly path of the failed request
        source_name: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },

    /// Failed to find a type in a type universe.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// General error during type universe usage.
    #[error("{0}")]
    TypeError(String),

    /// Recursion limit reached.
    ///
    /// Base-type chains are walked with a bounded depth, which also protects against cyclic
    /// inheritance in inconsistent metadata. The associated value is the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The metadata handed to the library is inconsistent.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that occur while planning which assemblies to load.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

impl Error {
    /// Wrap this error with the configuration source of the request it belongs to.
    #[must_use]
    pub fn in_request(self, source_name: impl Into<String>) -> Self {
        Error::Request {
            source_name: source_name.into(),
            source: Box::new(self),
        }
    }
}
