//! Translation of reflected type descriptors into target type references.
//!
//! The reflected universe and the target symbol space are separate contexts, so the mapper never
//! compares descriptors and symbols physically. Every lookup goes through the canonical name.
//!
//! Cases are evaluated in a fixed order:
//! 1. arrays map their element and keep the rank
//! 2. pointers map their element
//! 3. generic instances resolve the open definition and map every argument
//! 4. anything else resolves directly by canonical name
//!
//! A generic parameter has no canonical name and therefore never resolves.

use std::fmt;

use crate::{
    codegen::symbols::{SymbolRc, SymbolResolver},
    metadata::typesystem::{TypeDescriptor, TypeFlavor},
    Error::Resolution,
    Result,
};

/// A type reference in the target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntax {
    /// A non-generic named type
    Named(SymbolRc),
    /// A constructed generic type
    Generic {
        /// The open definition
        definition: SymbolRc,
        /// Type arguments, in order
        args: Vec<TypeSyntax>,
    },
    /// An array type
    Array {
        /// Element type
        element: Box<TypeSyntax>,
        /// Number of dimensions
        rank: u32,
    },
    /// An unmanaged pointer type
    Pointer(Box<TypeSyntax>),
}

impl TypeSyntax {
    /// Construct a closed generic type
    #[must_use]
    pub fn generic(definition: &SymbolRc, args: Vec<TypeSyntax>) -> Self {
        TypeSyntax::Generic {
            definition: definition.clone(),
            args,
        }
    }

    /// Construct a single-dimensional array of `element`
    #[must_use]
    pub fn array_of(element: TypeSyntax) -> Self {
        TypeSyntax::Array {
            element: Box::new(element),
            rank: 1,
        }
    }
}

impl From<SymbolRc> for TypeSyntax {
    fn from(symbol: SymbolRc) -> Self {
        TypeSyntax::Named(symbol)
    }
}

impl From<&SymbolRc> for TypeSyntax {
    fn from(symbol: &SymbolRc) -> Self {
        TypeSyntax::Named(symbol.clone())
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSyntax::Named(symbol) => write!(f, "{}", symbol),
            TypeSyntax::Generic { definition, args } => {
                write!(f, "{}<", definition.qualified_name())?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeSyntax::Array { .. } => {
                // Rank specifiers read outermost first: an array of int[,] is int[][,]
                let mut ranks = Vec::new();
                let mut current = self;
                while let TypeSyntax::Array { element, rank } = current {
                    ranks.push(*rank);
                    current = element.as_ref();
                }

                write!(f, "{}", current)?;
                for rank in ranks {
                    write!(f, "[{}]", ",".repeat(rank.saturating_sub(1) as usize))?;
                }
                Ok(())
            }
            TypeSyntax::Pointer(element) => write!(f, "{}*", element),
        }
    }
}

/// Maps reflected descriptors into the target symbol space
pub struct TypeMapper<'a> {
    symbols: &'a dyn SymbolResolver,
}

impl<'a> TypeMapper<'a> {
    /// Create a mapper resolving against `symbols`
    #[must_use]
    pub fn new(symbols: &'a dyn SymbolResolver) -> Self {
        TypeMapper { symbols }
    }

    /// Resolve a canonical metadata name to a symbol
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] if the target does not know `metadata_name`.
    pub fn symbol(&self, metadata_name: &str) -> Result<SymbolRc> {
        self.symbols
            .resolve_symbol(metadata_name)
            .ok_or_else(|| Resolution {
                name: metadata_name.to_string(),
            })
    }

    /// Map a reflected type to its equivalent target type reference
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] if the type, its element, its generic definition or
    /// any of its arguments has no equivalent in the target symbol space.
    pub fn map(&self, descriptor: &TypeDescriptor) -> Result<TypeSyntax> {
        match &descriptor.flavor {
            TypeFlavor::Array { rank } => {
                let element = self.element_of(descriptor)?;
                Ok(TypeSyntax::Array {
                    element: Box::new(element),
                    rank: *rank,
                })
            }
            TypeFlavor::Pointer => Ok(TypeSyntax::Pointer(Box::new(self.element_of(descriptor)?))),
            TypeFlavor::GenericInstance => {
                let Some(definition) = descriptor.generic_definition() else {
                    return Err(malformed_error!(
                        "Generic instance {} has no definition",
                        descriptor.display_name()
                    ));
                };

                let symbol = self.symbol(&definition.fullname())?;
                if symbol.arity != descriptor.generic_args.len() {
                    return Err(Resolution {
                        name: descriptor.display_name(),
                    });
                }

                let args = descriptor
                    .generic_args
                    .iter()
                    .map(|arg| self.map(arg))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeSyntax::Generic {
                    definition: symbol,
                    args,
                })
            }
            TypeFlavor::GenericParameter { .. } => Err(Resolution {
                name: descriptor.display_name(),
            }),
            _ => match descriptor.canonical_name() {
                Some(name) => Ok(TypeSyntax::Named(self.symbol(&name)?)),
                None => Err(Resolution {
                    name: descriptor.display_name(),
                }),
            },
        }
    }

    fn element_of(&self, descriptor: &TypeDescriptor) -> Result<TypeSyntax> {
        match descriptor.element() {
            Some(element) => self.map(element),
            None => Err(malformed_error!(
                "{} has no element type",
                descriptor.flavor
            )),
        }
    }
}
