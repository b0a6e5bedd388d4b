//! Reflected .NET type system used as input for hub analysis.
//!
//! This module provides the immutable, context-independent description of the types found in a
//! hub assembly and its references: type definitions, constructed generic instances, arrays,
//! pointers and generic parameters, together with their declared methods.
//!
//! # Key Components
//!
//! - [`TypeDescriptor`]: Immutable description of one type
//! - [`TypeRegistry`]: Universe of types for one generation request
//! - [`TypeUniverse`]: The read-only oracle the generator consumes
//! - [`TypeBuilder`]: Fluent API for constructing descriptors
//! - [`PrimitiveKind`]: Built-in primitive types
//!
//! # Type Identity
//!
//! Descriptors reference each other through `Arc`s and are built bottom-up, so a base type,
//! element type or generic argument always exists before the descriptor using it. Identity
//! across contexts (another universe, or the target symbol space) is never physical; it is the
//! [`TypeDescriptor::canonical_name`].
//!
//! # Examples
//!
//! ```rust
//! use hubscope::metadata::typesystem::{TypeBuilder, TypeRegistry, TypeUniverse};
//!
//! let registry = TypeRegistry::new();
//! let hub = TypeBuilder::new(&registry)
//!     .class("Microsoft.AspNetCore.SignalR", "Hub")
//!     .referenced("Microsoft.AspNetCore.SignalR.Core")
//!     .abstract_type()
//!     .build()?;
//!
//! assert_eq!(hub.canonical_name().as_deref(), Some("Microsoft.AspNetCore.SignalR.Hub"));
//! assert!(registry.resolve("Microsoft.AspNetCore.SignalR.Hub").is_some());
//! # Ok::<(), hubscope::Error>(())
//! ```

mod base;
mod builder;
mod hash;
mod primitives;
mod registry;

use std::{collections::HashSet, sync::Arc};

pub use base::{TypeAttributes, TypeFlavor, TypeSource, TYPE_VISIBILITY_MASK};
pub use builder::{MethodBuilder, TypeBuilder};
pub use hash::SignatureHash;
pub use primitives::PrimitiveKind;
pub use registry::{TypeRegistry, TypeUniverse};

use crate::{
    metadata::{method::MethodRc, token::Token},
    Error::RecursionLimit,
    Result,
};

/// Reference to a `TypeDescriptor`
pub type TypeRc = Arc<TypeDescriptor>;

/// Maximum number of ancestors walked before a base chain is considered broken
pub const MAX_CHAIN_DEPTH: usize = 256;

/// The immutable description of one reflected type.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Token, unique inside the issuing universe
    pub token: Token,
    /// `TypeNamespace` (empty for global types and constructed types)
    pub namespace: String,
    /// `TypeName`, including the generic arity suffix for definitions (e.g. ``Hub`1``)
    pub name: String,
    /// Structural category
    pub flavor: TypeFlavor,
    /// `TypeAttributes`
    pub flags: TypeAttributes,
    /// Where this type comes from
    pub source: TypeSource,
    /// This types base aka 'extends'
    pub(crate) base: Option<TypeRc>,
    /// Element type for arrays and pointers
    pub(crate) element: Option<TypeRc>,
    /// Open definition for generic instances
    pub(crate) generic_definition: Option<TypeRc>,
    /// Type arguments for generic instances
    pub generic_args: Vec<TypeRc>,
    /// Generic parameter names for generic definitions
    pub generic_params: Vec<String>,
    /// Methods declared by this type (not inherited ones)
    pub methods: Vec<MethodRc>,
}

impl TypeDescriptor {
    /// Create a new descriptor without base, element, generics or methods
    #[must_use]
    pub fn new(
        token: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        flavor: TypeFlavor,
        flags: TypeAttributes,
        source: TypeSource,
    ) -> Self {
        TypeDescriptor {
            token,
            namespace: namespace.into(),
            name: name.into(),
            flavor,
            flags,
            source,
            base: None,
            element: None,
            generic_definition: None,
            generic_args: Vec::new(),
            generic_params: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Access the base type of this type, if it exists
    #[must_use]
    pub fn base(&self) -> Option<&TypeRc> {
        self.base.as_ref()
    }

    /// Access the element type of an array or pointer
    #[must_use]
    pub fn element(&self) -> Option<&TypeRc> {
        self.element.as_ref()
    }

    /// Access the open generic definition of a generic instance
    #[must_use]
    pub fn generic_definition(&self) -> Option<&TypeRc> {
        self.generic_definition.as_ref()
    }

    /// Returns the full name (Namespace.Name) of the entity
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// The canonical, context-independent full name of this type.
    ///
    /// Returns `None` for generic parameters and for any constructed type that contains one,
    /// since those have no identity outside their declaring context.
    #[must_use]
    pub fn canonical_name(&self) -> Option<String> {
        match &self.flavor {
            TypeFlavor::GenericParameter { .. } => None,
            TypeFlavor::Array { rank } => {
                let element = self.element.as_ref()?.canonical_name()?;
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                Some(format!("{}[{}]", element, commas))
            }
            TypeFlavor::Pointer => Some(format!("{}*", self.element.as_ref()?.canonical_name()?)),
            TypeFlavor::GenericInstance => {
                let definition = self.generic_definition.as_ref()?.fullname();
                let args = self
                    .generic_args
                    .iter()
                    .map(|arg| arg.canonical_name().map(|name| format!("[{}]", name)))
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("{}[{}]", definition, args.join(",")))
            }
            _ => Some(self.fullname()),
        }
    }

    /// Canonical name, or a context-local stand-in for types that have none
    #[must_use]
    pub fn identity_name(&self) -> String {
        match self.canonical_name() {
            Some(name) => name,
            None => self.display_name(),
        }
    }

    /// Human readable name used in diagnostics (`!0`/`!!0` for generic parameters)
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.flavor {
            TypeFlavor::GenericParameter { index, method } => {
                let prefix = if *method { "!!" } else { "!" };
                if self.name.is_empty() {
                    format!("{}{}", prefix, index)
                } else {
                    format!("{}{}", prefix, self.name)
                }
            }
            TypeFlavor::Array { rank } => {
                let element = self
                    .element
                    .as_ref()
                    .map_or_else(|| "?".to_string(), |e| e.display_name());
                format!("{}[{}]", element, ",".repeat(rank.saturating_sub(1) as usize))
            }
            TypeFlavor::Pointer => {
                let element = self
                    .element
                    .as_ref()
                    .map_or_else(|| "?".to_string(), |e| e.display_name());
                format!("{}*", element)
            }
            TypeFlavor::GenericInstance => {
                let definition = self
                    .generic_definition
                    .as_ref()
                    .map_or_else(|| self.fullname(), |d| d.fullname());
                let args: Vec<String> = self.generic_args.iter().map(|a| a.display_name()).collect();
                format!("{}<{}>", definition, args.join(", "))
            }
            _ => self.fullname(),
        }
    }

    /// Returns true if the type cannot be instantiated
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(TypeAttributes::ABSTRACT)
    }

    /// Returns true if the type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self.flavor, TypeFlavor::Interface) || self.flags.contains(TypeAttributes::INTERFACE)
    }

    /// Returns true if this is an open generic type definition (e.g. ``Hub`1`` itself)
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty() && !matches!(self.flavor, TypeFlavor::GenericInstance)
    }

    /// Returns true if this is an instantiation of a generic definition
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        matches!(self.flavor, TypeFlavor::GenericInstance)
    }

    /// Returns true if this type, or anything it is constructed from, is a generic parameter
    #[must_use]
    pub fn contains_generic_parameters(&self) -> bool {
        match &self.flavor {
            TypeFlavor::GenericParameter { .. } => true,
            TypeFlavor::Array { .. } | TypeFlavor::Pointer => self
                .element
                .as_ref()
                .is_some_and(|element| element.contains_generic_parameters()),
            TypeFlavor::GenericInstance => self
                .generic_args
                .iter()
                .any(|arg| arg.contains_generic_parameters()),
            _ => false,
        }
    }

    /// Methods declared directly on this type
    #[must_use]
    pub fn declared_methods(&self) -> &[MethodRc] {
        &self.methods
    }

    /// All ancestors of this type, nearest first (the type itself is not included).
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the chain is longer than [`MAX_CHAIN_DEPTH`].
    pub fn base_chain(&self) -> Result<Vec<TypeRc>> {
        let mut chain = Vec::new();
        let mut current = self.base.clone();

        while let Some(ancestor) = current {
            if chain.len() >= MAX_CHAIN_DEPTH {
                return Err(RecursionLimit(MAX_CHAIN_DEPTH));
            }
            current = ancestor.base.clone();
            chain.push(ancestor);
        }

        Ok(chain)
    }

    /// All public-surface methods of this type, including inherited ones.
    ///
    /// Own methods come first, followed by those of each ancestor nearest first. A base method
    /// is hidden when a more derived type already declares a method with the same signature
    /// (name and parameter types), mirroring how reflection reports overrides.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the base chain is broken.
    pub fn all_methods(&self) -> Result<Vec<MethodRc>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let own = self.methods.iter();
        let chain = self.base_chain()?;
        let inherited = chain
            .iter()
            .flat_map(|ancestor| ancestor.methods.iter())
            .filter(|method| !method.is_constructor() && !method.is_static());

        for method in own.chain(inherited) {
            if seen.insert(method.signature_hash()) {
                result.push(method.clone());
            }
        }

        Ok(result)
    }
}
