//! The target symbol space generated code is compiled against.
//!
//! Reflected types live in an isolated universe; generated source must reference the types the
//! *client* compilation sees. A [`SymbolTable`] is the lookup table between the two, keyed purely
//! by canonical metadata name. It is populated before generation starts and is only read while
//! requests are running.
//!
//! # Examples
//!
//! ```rust
//! use hubscope::codegen::symbols::{SymbolResolver, SymbolTable};
//!
//! let symbols = SymbolTable::platform();
//! let task = symbols.resolve_symbol("System.Threading.Tasks.Task`1").unwrap();
//! assert_eq!(task.arity, 1);
//! assert_eq!(task.qualified_name(), "global::System.Threading.Tasks.Task");
//!
//! let int = symbols.resolve_symbol("System.Int32").unwrap();
//! assert_eq!(int.to_string(), "int");
//! ```

use std::{fmt, sync::Arc};

use dashmap::DashMap;
use strum::IntoEnumIterator;

use crate::metadata::typesystem::{PrimitiveKind, TypeUniverse};

/// `System.Threading.Tasks.Task`
pub const TASK: &str = "System.Threading.Tasks.Task";
/// ``System.Threading.Tasks.Task`1``
pub const TASK_OF: &str = "System.Threading.Tasks.Task`1";
/// `System.Threading.Tasks.ValueTask`
pub const VALUE_TASK: &str = "System.Threading.Tasks.ValueTask";
/// `System.Threading.CancellationToken`
pub const CANCELLATION_TOKEN: &str = "System.Threading.CancellationToken";
/// `System.Type`
pub const SYSTEM_TYPE: &str = "System.Type";
/// `System.IDisposable`
pub const DISPOSABLE: &str = "System.IDisposable";
/// `System.IAsyncDisposable`
pub const ASYNC_DISPOSABLE: &str = "System.IAsyncDisposable";
/// `System.ComponentModel.ISupportInitialize`
pub const SUPPORT_INITIALIZE: &str = "System.ComponentModel.ISupportInitialize";
/// ``System.Collections.Generic.ICollection`1``
pub const COLLECTION_OF: &str = "System.Collections.Generic.ICollection`1";
/// ``System.Collections.Generic.List`1``
pub const LIST_OF: &str = "System.Collections.Generic.List`1";
/// `System.InvalidOperationException`
pub const INVALID_OPERATION: &str = "System.InvalidOperationException";
/// `System.ArgumentNullException`
pub const ARGUMENT_NULL: &str = "System.ArgumentNullException";
/// `System.NonSerializedAttribute`
pub const NON_SERIALIZED: &str = "System.NonSerializedAttribute";
/// `Microsoft.AspNetCore.SignalR.Client.HubConnection`
pub const HUB_CONNECTION: &str = "Microsoft.AspNetCore.SignalR.Client.HubConnection";

/// Namespace of the delegate families
const DELEGATE_NAMESPACE: &str = "System";
/// Largest `Action` arity the platform provides
const MAX_ACTION_ARITY: usize = 16;
/// Largest `Func` arity the platform provides
const MAX_FUNC_ARITY: usize = 17;

/// Non-generic, non-delegate platform types generated code refers to
const PLATFORM_TYPES: &[&str] = &[
    TASK,
    TASK_OF,
    VALUE_TASK,
    CANCELLATION_TOKEN,
    SYSTEM_TYPE,
    DISPOSABLE,
    ASYNC_DISPOSABLE,
    SUPPORT_INITIALIZE,
    COLLECTION_OF,
    LIST_OF,
    INVALID_OPERATION,
    ARGUMENT_NULL,
    NON_SERIALIZED,
    HUB_CONNECTION,
];

/// Reference to a `Symbol`
pub type SymbolRc = Arc<Symbol>;

/// A type as the target compilation knows it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Canonical metadata name (``System.Collections.Generic.List`1``, `Outer+Inner`)
    pub metadata_name: String,
    /// Namespace, empty for the global namespace
    pub namespace: String,
    /// Source-level name: arity suffixes stripped, nesting separated by `.`
    pub name: String,
    /// Number of generic parameters
    pub arity: usize,
    /// Language keyword aliasing this type (`int`, `string`, ...)
    pub keyword: Option<&'static str>,
}

impl Symbol {
    /// Describe a symbol from its canonical metadata name
    ///
    /// ## Arguments
    /// * '`metadata_name`' - e.g. ``System.Func`3`` or `Chat.Messages+Envelope`
    #[must_use]
    pub fn from_metadata_name(metadata_name: &str) -> Self {
        let outermost_end = metadata_name.find('+').unwrap_or(metadata_name.len());
        let (namespace, rest) = match metadata_name[..outermost_end].rfind('.') {
            Some(split) => (&metadata_name[..split], &metadata_name[split + 1..]),
            None => ("", metadata_name),
        };

        let mut arity = 0;
        let segments: Vec<&str> = rest
            .split('+')
            .map(|segment| match segment.split_once('`') {
                Some((name, count)) => {
                    arity = count.parse().unwrap_or(0);
                    name
                }
                None => {
                    arity = 0;
                    segment
                }
            })
            .collect();

        Symbol {
            metadata_name: metadata_name.to_string(),
            namespace: namespace.to_string(),
            name: segments.join("."),
            arity,
            keyword: PrimitiveKind::from_fullname(metadata_name).and_then(|kind| kind.keyword()),
        }
    }

    /// The fully qualified source name (`global::Ns.Name`), ignoring any keyword alias
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            format!("global::{}", self.name)
        } else {
            format!("global::{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword {
            Some(keyword) => write!(f, "{}", keyword),
            None => write!(f, "{}", self.qualified_name()),
        }
    }
}

/// Lookup of target symbols by canonical metadata name
pub trait SymbolResolver: Send + Sync {
    /// Find the symbol equivalent to `metadata_name`, if the target knows it
    fn resolve_symbol(&self, metadata_name: &str) -> Option<SymbolRc>;
}

/// Concurrent symbol table keyed by canonical metadata name
#[derive(Default)]
pub struct SymbolTable {
    symbols: DashMap<String, SymbolRc>,
}

impl SymbolTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the platform types generated proxies depend on: the primitives,
    /// task and cancellation types, collection and exception types, both delegate families and
    /// the client `HubConnection`.
    #[must_use]
    pub fn platform() -> Self {
        let table = Self::new();

        for kind in PrimitiveKind::iter() {
            table.define(&kind.fullname());
        }
        for name in PLATFORM_TYPES {
            table.define(name);
        }

        table.define(&format!("{}.Action", DELEGATE_NAMESPACE));
        for arity in 1..=MAX_ACTION_ARITY {
            table.define(&format!("{}.Action`{}", DELEGATE_NAMESPACE, arity));
        }
        for arity in 1..=MAX_FUNC_ARITY {
            table.define(&format!("{}.Func`{}", DELEGATE_NAMESPACE, arity));
        }

        table
    }

    /// Add a symbol for `metadata_name`, returning the existing one if already present
    pub fn define(&self, metadata_name: &str) -> SymbolRc {
        self.symbols
            .entry(metadata_name.to_string())
            .or_insert_with(|| Arc::new(Symbol::from_metadata_name(metadata_name)))
            .clone()
    }

    /// Add every type a universe defines, e.g. the shared contract assembly the client compiles
    /// against. Returns the number of symbols added.
    pub fn import_universe(&self, universe: &dyn TypeUniverse) -> usize {
        let mut added = 0;
        for defined in universe.defined_types() {
            if defined.flavor.is_constructed() {
                continue;
            }
            if let Some(name) = defined.canonical_name() {
                if !self.symbols.contains_key(&name) {
                    self.define(&name);
                    added += 1;
                }
            }
        }
        added
    }

    /// Number of known symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve_symbol(&self, metadata_name: &str) -> Option<SymbolRc> {
        self.symbols.get(metadata_name).map(|entry| entry.value().clone())
    }
}
