//! Method attribute flags for reflected .NET methods.
//!
//! # Key Types
//! - [`MethodAccessFlags`]: Member accessibility, extracted from the low three bits
//! - [`MethodModifiers`]: Static/virtual/abstract/special-name modifiers

use bitflags::bitflags;

/// Bitmask for `ACCESS` state extraction
pub const METHOD_ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method access flags
    pub struct MethodAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// Extract access flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special (property accessor, event accessor, operator)
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, dpending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !METHOD_ACCESS_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_extraction() {
        let flags = MethodAccessFlags::PUBLIC.bits() | MethodModifiers::VIRTUAL.bits();
        assert_eq!(
            MethodAccessFlags::from_method_flags(flags),
            MethodAccessFlags::PUBLIC
        );
        assert_eq!(
            MethodAccessFlags::from_method_flags(MethodAccessFlags::FAMILY.bits()),
            MethodAccessFlags::FAMILY
        );
    }

    #[test]
    fn test_modifier_extraction_ignores_access() {
        let flags = MethodAccessFlags::PUBLIC.bits()
            | MethodModifiers::STATIC.bits()
            | MethodModifiers::SPECIAL_NAME.bits();
        let modifiers = MethodModifiers::from_method_flags(flags);

        assert!(modifiers.contains(MethodModifiers::STATIC));
        assert!(modifiers.contains(MethodModifiers::SPECIAL_NAME));
        assert!(!modifiers.contains(MethodModifiers::VIRTUAL));
    }
}
