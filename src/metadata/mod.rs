//! Reflected metadata of hub assemblies.
//!
//! This module contains the read-only input side of generation: the type universe a hub
//! assembly was loaded into, and the boundary to the collaborator that loads it.
//!
//! # Key Components
//!
//! - [`token`] - Identity of descriptors inside one universe
//! - [`typesystem`] - Types, registries and the [`typesystem::TypeUniverse`] oracle
//! - [`method`] - Reflected method descriptors and their attribute flags
//! - [`loader`] - Assembly search planning and the [`loader::UniverseLoader`] boundary
//!
//! # Examples
//!
//! ```rust
//! use hubscope::metadata::typesystem::{TypeBuilder, TypeRegistry, TypeUniverse};
//!
//! let registry = TypeRegistry::new();
//! TypeBuilder::new(&registry).class("Chat", "ChatHub").build()?;
//!
//! for defined in registry.defined_types() {
//!     println!("{}", defined.fullname());
//! }
//! # Ok::<(), hubscope::Error>(())
//! ```

/// Assembly search planning and universe loading
pub mod loader;
/// Reflected methods
pub mod method;
/// Commonly used metadata token type
pub mod token;
/// Implementation of the reflected .NET type system
pub mod typesystem;
