//! Target-side code synthesis.
//!
//! Everything in this module is independent of hub analysis: the symbol space generated code is
//! compiled against, the mapping from reflected descriptors into it, a structural model of C#
//! declarations, the deterministic writer, and the runtime contract every proxy implements.
//!
//! # Key Components
//!
//! - [`symbols::SymbolTable`] - Canonical-name keyed target symbols
//! - [`mapper::TypeMapper`] - Reflected descriptor to [`mapper::TypeSyntax`] translation
//! - [`syntax`] - Compilation units, classes, members, statements and expressions
//! - [`writer::CodeWriter`] - Text rendering
//! - [`contract::RuntimeContract`] - Lifecycle members and connection primitives

/// Runtime contract of generated proxies
pub mod contract;
/// Descriptor to target type mapping
pub mod mapper;
/// Target symbol space
pub mod symbols;
/// Structural C# model
pub mod syntax;
/// Source text rendering
pub mod writer;
