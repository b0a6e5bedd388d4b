//! Type universe for a single generation request.
//!
//! This module provides the [`TypeRegistry`], a thread-safe registry holding every type reachable
//! from one hub assembly, and the [`TypeUniverse`] trait through which the generator consumes it.
//!
//! # Registry Architecture
//!
//! - **Token-based lookup**: Primary index using artificial metadata tokens
//! - **Name-based lookup**: Secondary indices for canonical names and namespaces
//! - **Declaration order**: Types defined by the analyzed assembly, in the order they were added
//!
//! Primitive types are pre-registered on construction, so `System.Object`, `System.String` and
//! friends always resolve.
//!
//! # Thread Safety
//!
//! - Lock-free primary storage (`SkipMap`)
//! - Concurrent hash maps for indices (`DashMap`)
//! - Atomic token allocation
//! - Append-only declaration order (`boxcar::Vec`)
//!
//! # Examples
//!
//! ```rust
//! use hubscope::metadata::typesystem::{PrimitiveKind, TypeRegistry, TypeUniverse};
//!
//! let registry = TypeRegistry::new();
//! let string = registry.get_primitive(PrimitiveKind::String)?;
//! assert_eq!(string.fullname(), "System.String");
//! assert!(registry.defined_types().is_empty());
//! # Ok::<(), hubscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use strum::IntoEnumIterator;

use crate::{
    metadata::{
        token::{Token, TABLE_ARTIFICIAL, TABLE_METHODDEF, TABLE_TYPEDEF, TABLE_TYPESPEC},
        typesystem::{
            PrimitiveKind, TypeAttributes, TypeDescriptor, TypeFlavor, TypeRc, TypeSource,
        },
    },
    Error::TypeNotFound,
    Result,
};

/// The read-only view of reflected types a generation request works against.
///
/// Implementations must be safe to share between threads; the generator never mutates a
/// universe and may analyze several universes concurrently.
pub trait TypeUniverse: Send + Sync {
    /// All types defined by the analyzed assembly, in declaration order
    fn defined_types(&self) -> Vec<TypeRc>;

    /// Look up a type by its canonical name
    ///
    /// ## Arguments
    /// * '`canonical_name`' - e.g. `Chat.Shared.IChatClient` or ``System.Collections.Generic.List`1[[System.Int32]]``
    fn resolve(&self, canonical_name: &str) -> Option<TypeRc>;
}

/// Central registry of all types reachable from one hub assembly
pub struct TypeRegistry {
    /// Primary type storage indexed by tokens
    types: SkipMap<Token, TypeRc>,
    /// Next free row for defined types
    next_typedef: AtomicU32,
    /// Next free row for referenced types (artificial table, after the primitives)
    next_reference: AtomicU32,
    /// Next free row for constructed types
    next_typespec: AtomicU32,
    /// Next free row for methods
    next_method: AtomicU32,
    /// Secondary index: types indexed by canonical name
    types_by_fullname: DashMap<String, Token>,
    /// Secondary index: types grouped by namespace
    types_by_namespace: DashMap<String, Vec<Token>>,
    /// Defined types in declaration order
    declared: boxcar::Vec<Token>,
}

impl TypeRegistry {
    /// Create a new type registry with initialized primitive types.
    #[must_use]
    pub fn new() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let first_reference = PrimitiveKind::count() as u32 + 1;

        let registry = TypeRegistry {
            types: SkipMap::new(),
            next_typedef: AtomicU32::new(1),
            next_reference: AtomicU32::new(first_reference),
            next_typespec: AtomicU32::new(1),
            next_method: AtomicU32::new(1),
            types_by_fullname: DashMap::new(),
            types_by_namespace: DashMap::new(),
            declared: boxcar::Vec::new(),
        };

        registry.initialize_primitives();
        registry
    }

    fn initialize_primitives(&self) {
        let object = Arc::new(Self::primitive_descriptor(PrimitiveKind::Object, None));
        let value_type = Arc::new(Self::primitive_descriptor(
            PrimitiveKind::ValueType,
            Some(object.clone()),
        ));

        self.insert(&object);
        self.insert(&value_type);

        for kind in PrimitiveKind::iter() {
            let base = match kind {
                PrimitiveKind::Object | PrimitiveKind::ValueType => continue,
                _ if kind.is_value_type() => Some(value_type.clone()),
                _ => Some(object.clone()),
            };
            self.insert(&Arc::new(Self::primitive_descriptor(kind, base)));
        }
    }

    fn primitive_descriptor(kind: PrimitiveKind, base: Option<TypeRc>) -> TypeDescriptor {
        let mut descriptor = TypeDescriptor::new(
            kind.token(),
            kind.namespace(),
            kind.name(),
            TypeFlavor::Primitive(kind),
            TypeAttributes::PUBLIC,
            TypeSource::Primitive,
        );
        descriptor.base = base;
        descriptor
    }

    fn allocate(counter: &AtomicU32, table: u8) -> Token {
        let row = counter.fetch_add(1, Ordering::Relaxed);
        debug_assert!(row < 0x00FF_FFFF, "ran out of rows for table 0x{:02X}", table);
        Token::from_parts(table, row)
    }

    /// Allocate the next token for a type from the given source
    ///
    /// ## Arguments
    /// * 'source' - Where the new type comes from
    pub fn next_type_token(&self, source: &TypeSource) -> Token {
        match source {
            TypeSource::Defined => Self::allocate(&self.next_typedef, TABLE_TYPEDEF),
            TypeSource::Constructed => Self::allocate(&self.next_typespec, TABLE_TYPESPEC),
            TypeSource::Referenced(_) | TypeSource::Primitive => {
                Self::allocate(&self.next_reference, TABLE_ARTIFICIAL)
            }
        }
    }

    /// Allocate the next method token
    pub fn next_method_token(&self) -> Token {
        Self::allocate(&self.next_method, TABLE_METHODDEF)
    }

    /// Insert a `TypeDescriptor` into the registry
    ///
    /// The first type registered under a canonical name wins the name index; later duplicates
    /// stay reachable by token only.
    ///
    /// ## Arguments
    /// * '`new_type`' - The type to register
    pub fn insert(&self, new_type: &TypeRc) {
        let token = new_type.token;
        if self.types.contains_key(&token) {
            return;
        }

        self.types.insert(token, new_type.clone());

        if let Some(name) = new_type.canonical_name() {
            self.types_by_fullname.entry(name).or_insert(token);
        }

        if !new_type.flavor.is_constructed() {
            self.types_by_namespace
                .entry(new_type.namespace.clone())
                .or_default()
                .push(token);
        }

        if new_type.source.is_defined() {
            self.declared.push(token);
        }
    }

    /// Get a primitive type by its `PrimitiveKind`
    ///
    /// # Errors
    /// Returns an error if the primitive type is not found in the registry.
    pub fn get_primitive(&self, primitive: PrimitiveKind) -> Result<TypeRc> {
        match self.types.get(&primitive.token()) {
            Some(res) => Ok(res.value().clone()),
            None => Err(TypeNotFound(primitive.token())),
        }
    }

    /// Look up a type by its token
    pub fn get(&self, token: &Token) -> Option<TypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a type by its canonical name
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeRc> {
        let token = *self.types_by_fullname.get(fullname)?.value();
        self.get(&token)
    }

    /// All named types of a namespace, in registration order
    pub fn get_by_namespace(&self, namespace: &str) -> Vec<TypeRc> {
        match self.types_by_namespace.get(namespace) {
            Some(tokens) => tokens.iter().filter_map(|token| self.get(token)).collect(),
            None => Vec::new(),
        }
    }

    /// Number of registered types (including primitives)
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the registry contains no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse for TypeRegistry {
    fn defined_types(&self) -> Vec<TypeRc> {
        self.declared
            .iter()
            .filter_map(|(_, token)| self.get(token))
            .collect()
    }

    fn resolve(&self, canonical_name: &str) -> Option<TypeRc> {
        self.get_by_fullname(canonical_name)
    }
}

#[cfg(test)]
mod tests {
    use crate::metadata::typesystem::TypeBuilder;

    use super::*;

    #[test]
    fn test_primitives_registered() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), PrimitiveKind::count());

        for kind in PrimitiveKind::iter() {
            let primitive = registry.get_primitive(kind).unwrap();
            assert_eq!(primitive.fullname(), kind.fullname());
            assert_eq!(primitive.token, kind.token());
            assert_eq!(registry.resolve(&kind.fullname()).unwrap().token, kind.token());
        }
    }

    #[test]
    fn test_primitive_bases() {
        let registry = TypeRegistry::new();

        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let chain: Vec<String> = int
            .base_chain()
            .unwrap()
            .iter()
            .map(|t| t.fullname())
            .collect();
        assert_eq!(chain, vec!["System.ValueType", "System.Object"]);

        let object = registry.get_primitive(PrimitiveKind::Object).unwrap();
        assert!(object.base().is_none());
    }

    #[test]
    fn test_defined_types_in_declaration_order() {
        let registry = TypeRegistry::new();

        for name in ["Zeta", "Alpha", "Mid"] {
            TypeBuilder::new(&registry)
                .class("Chat", name)
                .build()
                .unwrap();
        }
        TypeBuilder::new(&registry)
            .class("System.Threading.Tasks", "Task")
            .referenced("System.Runtime")
            .build()
            .unwrap();

        let names: Vec<String> = registry
            .defined_types()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(registry.get_by_namespace("Chat").len(), 3);
    }

    #[test]
    fn test_token_tables() {
        let registry = TypeRegistry::new();

        let defined = TypeBuilder::new(&registry)
            .class("Chat", "ChatHub")
            .build()
            .unwrap();
        let referenced = TypeBuilder::new(&registry)
            .class("Microsoft.AspNetCore.SignalR", "Hub")
            .referenced("Microsoft.AspNetCore.SignalR.Core")
            .build()
            .unwrap();
        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        let array = TypeBuilder::new(&registry)
            .array_of(&int, 1)
            .build()
            .unwrap();

        assert_eq!(defined.token.table(), TABLE_TYPEDEF);
        assert_eq!(referenced.token.table(), TABLE_ARTIFICIAL);
        assert!(referenced.token.row() > PrimitiveKind::count() as u32);
        assert_eq!(array.token.table(), TABLE_TYPESPEC);
    }

    #[test]
    fn test_unknown_name() {
        let registry = TypeRegistry::new();
        assert!(registry.resolve("Chat.Missing").is_none());
        assert!(registry.get(&Token::new(0x0200_0999)).is_none());
    }
}
