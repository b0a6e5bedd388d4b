use std::fmt;

use bitflags::bitflags;

use crate::metadata::typesystem::PrimitiveKind;

/// Bitmask for visibility extraction from `TypeAttributes`
pub const TYPE_VISIBILITY_MASK: u32 = 0x0000_0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Type attribute flags (subset of ECMA-335 §II.23.1.15 used for hub analysis)
    pub struct TypeAttributes: u32 {
        /// Type is visible outside its assembly
        const PUBLIC = 0x0000_0001;
        /// Nested type with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
    }
}

impl TypeAttributes {
    /// Check whether the visibility bits describe a public (or nested public) type
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self.bits() & TYPE_VISIBILITY_MASK, 0x1 | 0x2)
    }
}

/// Structural category of a type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// One of the built-in primitive types
    Primitive(PrimitiveKind),
    /// Reference type
    Class,
    /// User-defined value type
    ValueType,
    /// Interface type
    Interface,
    /// Array of the element type
    Array {
        /// The rank (number of dimensions)
        rank: u32,
    },
    /// Unmanaged pointer to the element type
    Pointer,
    /// Closed (or partially closed) instantiation of a generic definition
    GenericInstance,
    /// Generic parameter of a type or method definition
    GenericParameter {
        /// Index in the generic parameters list
        index: u32,
        /// Whether it's a method parameter (true) or type parameter (false)
        method: bool,
    },
}

impl TypeFlavor {
    /// Check if this flavor is constructed from other descriptors (array, pointer, instance)
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Array { .. } | TypeFlavor::Pointer | TypeFlavor::GenericInstance
        )
    }
}

impl fmt::Display for TypeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFlavor::Primitive(kind) => write!(f, "primitive {}", kind.name()),
            TypeFlavor::Class => write!(f, "class"),
            TypeFlavor::ValueType => write!(f, "struct"),
            TypeFlavor::Interface => write!(f, "interface"),
            TypeFlavor::Array { rank } => write!(f, "array (rank {})", rank),
            TypeFlavor::Pointer => write!(f, "pointer"),
            TypeFlavor::GenericInstance => write!(f, "generic instance"),
            TypeFlavor::GenericParameter { index, method } => {
                if *method {
                    write!(f, "method generic parameter !!{}", index)
                } else {
                    write!(f, "type generic parameter !{}", index)
                }
            }
        }
    }
}

/// Classification of type origins within a type universe.
///
/// Only `Defined` types take part in hub discovery; everything else is reachable through
/// base chains, signatures and generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSource {
    /// Type is defined by the assembly being analyzed
    Defined,
    /// Type is defined in a referenced assembly (by simple assembly name)
    Referenced(String),
    /// Type is a primitive defined by the CLR runtime
    Primitive,
    /// Type is constructed from other types (instance, array, pointer, generic parameter)
    Constructed,
}

impl TypeSource {
    /// Returns `true` if the type is defined by the analyzed assembly
    #[must_use]
    pub fn is_defined(&self) -> bool {
        matches!(self, TypeSource::Defined)
    }

    /// Returns the name of the referenced assembly, if any
    #[must_use]
    pub fn assembly(&self) -> Option<&str> {
        match self {
            TypeSource::Referenced(name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_attributes_visibility() {
        assert!(TypeAttributes::PUBLIC.is_public());
        assert!(TypeAttributes::NESTED_PUBLIC.is_public());
        assert!((TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT).is_public());
        assert!(!TypeAttributes::ABSTRACT.is_public());
        assert!(!TypeAttributes::empty().is_public());
    }

    #[test]
    fn test_flavor_is_constructed() {
        assert!(TypeFlavor::Array { rank: 1 }.is_constructed());
        assert!(TypeFlavor::Pointer.is_constructed());
        assert!(TypeFlavor::GenericInstance.is_constructed());
        assert!(!TypeFlavor::Class.is_constructed());
        assert!(!TypeFlavor::Primitive(PrimitiveKind::I4).is_constructed());
        assert!(!TypeFlavor::GenericParameter {
            index: 0,
            method: false
        }
        .is_constructed());
    }

    #[test]
    fn test_flavor_display() {
        assert_eq!(TypeFlavor::Interface.to_string(), "interface");
        assert_eq!(TypeFlavor::Array { rank: 2 }.to_string(), "array (rank 2)");
        assert_eq!(
            TypeFlavor::GenericParameter {
                index: 1,
                method: true
            }
            .to_string(),
            "method generic parameter !!1"
        );
    }

    #[test]
    fn test_type_source() {
        assert!(TypeSource::Defined.is_defined());
        assert!(!TypeSource::Primitive.is_defined());
        assert_eq!(
            TypeSource::Referenced("Microsoft.AspNetCore.SignalR.Core".to_string()).assembly(),
            Some("Microsoft.AspNetCore.SignalR.Core")
        );
        assert_eq!(TypeSource::Constructed.assembly(), None);
    }
}
