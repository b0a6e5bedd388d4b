//! # hubscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the hubscope library. Import this module to get quick access to everything needed to
//! describe a hub assembly and generate its proxies.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all hubscope operations
pub use crate::Error;

/// The result type used throughout hubscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Proxy generator and its per-request configuration
pub use crate::generator::{
    ClientCallbackMode, EmittedSource, GenerationRequest, HubProxyGenerator,
};

/// Non-fatal findings reported with emitted source
pub use crate::generator::{Diagnostic, Severity};

// ================================================================================================
// Metadata System
// ================================================================================================

/// Identity of descriptors inside one universe
pub use crate::metadata::token::Token;

/// Reflected types, their registry and builders
pub use crate::metadata::typesystem::{
    MethodBuilder, PrimitiveKind, TypeAttributes, TypeBuilder, TypeDescriptor, TypeFlavor,
    TypeRc, TypeRegistry, TypeSource, TypeUniverse,
};

/// Reflected methods
pub use crate::metadata::method::{
    MethodAccessFlags, MethodDescriptor, MethodModifiers, MethodRc, ParamDescriptor,
};

/// Loading boundary
pub use crate::metadata::loader::{LoadPlan, StaticUniverseLoader, UniverseLoader};

// ================================================================================================
// Code Generation
// ================================================================================================

/// Target symbol space
pub use crate::codegen::symbols::{Symbol, SymbolRc, SymbolResolver, SymbolTable};

/// Target type references and rendering
pub use crate::codegen::{mapper::TypeSyntax, syntax::CompilationUnit, writer::CodeWriter};
