//! Generation request configuration.
//!
//! A [`GenerationRequest`] is an explicit record with documented defaults. It is validated
//! eagerly, before any type is looked at, so malformed configuration never produces output.

use std::path::PathBuf;

use strum::{Display, EnumIter, EnumString};

use crate::Result;

/// Default proxy name format
pub const DEFAULT_TYPE_NAME_FORMAT: &str = "{0}Proxy";
/// File name of the core runtime library, excluded from loading by default
pub const CORE_LIBRARY_FILE_NAME: &str = "System.Private.CoreLib.dll";

/// How client callbacks are surfaced on generated proxies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ClientCallbackMode {
    /// No callback members are generated
    None,
    /// `event Func<.., Task>` fields with a protected raiser
    #[default]
    Event,
    /// A `partial` raiser the user implements
    PartialMethod,
    /// Synchronous `Action<..>` fields
    Delegate,
    /// Plain `Func<.., Task>` fields
    AsyncDelegate,
}

/// One unit of work: a hub assembly and how to generate proxies for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Path of the assembly containing the hubs (required)
    pub hub_assembly_path: PathBuf,
    /// Further directories searched for reference assemblies
    pub additional_search_directories: Vec<PathBuf>,
    /// Assembly file names never loaded, compared case-insensitively
    pub excluded_file_names: Vec<String>,
    /// Namespace wrapping the generated classes; `None` emits into the global namespace
    pub root_namespace: Option<String>,
    /// Proxy class name format, `{0}` is replaced by the hub name
    pub type_name_format: String,
    /// Callback surface style
    pub client_callback_mode: ClientCallbackMode,
    /// Canonical name of a client interface overriding the one resolved from the hub
    pub explicit_client_type: Option<String>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            hub_assembly_path: PathBuf::new(),
            additional_search_directories: Vec::new(),
            excluded_file_names: vec![CORE_LIBRARY_FILE_NAME.to_string()],
            root_namespace: None,
            type_name_format: DEFAULT_TYPE_NAME_FORMAT.to_string(),
            client_callback_mode: ClientCallbackMode::default(),
            explicit_client_type: None,
        }
    }
}

impl GenerationRequest {
    /// Create a request for `hub_assembly_path` with default settings
    #[must_use]
    pub fn new(hub_assembly_path: impl Into<PathBuf>) -> Self {
        GenerationRequest {
            hub_assembly_path: hub_assembly_path.into(),
            ..Self::default()
        }
    }

    /// Set the root namespace
    #[must_use]
    pub fn with_root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.root_namespace = Some(namespace.into());
        self
    }

    /// Set the proxy class name format
    #[must_use]
    pub fn with_type_name_format(mut self, format: impl Into<String>) -> Self {
        self.type_name_format = format.into();
        self
    }

    /// Set the callback generation mode
    #[must_use]
    pub fn with_client_callback_mode(mut self, mode: ClientCallbackMode) -> Self {
        self.client_callback_mode = mode;
        self
    }

    /// Override the client interface of every hub
    #[must_use]
    pub fn with_explicit_client_type(mut self, canonical_name: impl Into<String>) -> Self {
        self.explicit_client_type = Some(canonical_name.into());
        self
    }

    /// Add a reference search directory
    #[must_use]
    pub fn with_additional_search_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.additional_search_directories.push(directory.into());
        self
    }

    /// Replace the exclusion list
    #[must_use]
    pub fn with_excluded_file_names(mut self, names: Vec<String>) -> Self {
        self.excluded_file_names = names;
        self
    }

    /// Name of the configuration source, used to attribute errors
    #[must_use]
    pub fn source_name(&self) -> String {
        self.hub_assembly_path.display().to_string()
    }

    /// Check the request before any generation work starts
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if the hub assembly path is empty, the root
    /// namespace is not a dotted identifier, or the type name format is malformed.
    pub fn validate(&self) -> Result<()> {
        if self.hub_assembly_path.as_os_str().is_empty() {
            return Err(configuration_error!("The hub assembly path must be specified"));
        }

        if let Some(namespace) = &self.root_namespace {
            if !namespace.split('.').all(is_identifier) {
                return Err(configuration_error!(
                    "The root namespace '{}' is not a valid namespace name",
                    namespace
                ));
            }
        }

        if let Some(client) = &self.explicit_client_type {
            if client.trim().is_empty() {
                return Err(configuration_error!(
                    "The explicit client type must not be empty"
                ));
            }
        }

        self.proxy_name("Hub").map(|_| ())
    }

    /// Apply the type name format to a hub name
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if the format does not contain exactly one `{0}`,
    /// contains any other placeholder or an unbalanced brace, or produces an invalid identifier.
    pub fn proxy_name(&self, hub_name: &str) -> Result<String> {
        let format = &self.type_name_format;
        let mut result = String::with_capacity(format.len() + hub_name.len());
        let mut placeholders = 0;
        let mut chars = format.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    result.push('{');
                }
                '{' => {
                    let mut placeholder = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(inner) => placeholder.push(inner),
                            None => {
                                return Err(configuration_error!(
                                    "The type name format '{}' contains an unclosed placeholder",
                                    format
                                ))
                            }
                        }
                    }
                    if placeholder != "0" {
                        return Err(configuration_error!(
                            "The type name format '{}' contains the unsupported placeholder '{{{}}}'",
                            format,
                            placeholder
                        ));
                    }
                    placeholders += 1;
                    result.push_str(hub_name);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    result.push('}');
                }
                '}' => {
                    return Err(configuration_error!(
                        "The type name format '{}' contains an unmatched '}}'",
                        format
                    ))
                }
                c => result.push(c),
            }
        }

        if placeholders != 1 {
            return Err(configuration_error!(
                "The type name format '{}' must contain exactly one {{0}} placeholder, found {}",
                format,
                placeholders
            ));
        }

        if !is_identifier(&result) {
            return Err(configuration_error!(
                "The type name format '{}' produces the invalid class name '{}'",
                format,
                result
            ));
        }

        Ok(result)
    }
}

/// Whether `name` is a valid C# identifier (without the `@` prefix)
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
