//! Built-in CLR primitive types.
//!
//! Every [`crate::metadata::typesystem::TypeRegistry`] pre-registers these types under artificial
//! tokens, and the target symbol space uses the same table to render them as C# keywords.

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::metadata::token::{Token, TABLE_ARTIFICIAL};

/// The primitive types known to the runtime, plus `System.Decimal` which has a C# keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    I1,
    /// `System.Byte`
    U1,
    /// `System.Int16`
    I2,
    /// `System.UInt16`
    U2,
    /// `System.Int32`
    I4,
    /// `System.UInt32`
    U4,
    /// `System.Int64`
    I8,
    /// `System.UInt64`
    U8,
    /// `System.Single`
    R4,
    /// `System.Double`
    R8,
    /// `System.IntPtr`
    I,
    /// `System.UIntPtr`
    U,
    /// `System.Decimal`
    Decimal,
    /// `System.Object`
    Object,
    /// `System.String`
    String,
    /// `System.ValueType`
    ValueType,
}

impl PrimitiveKind {
    /// Namespace of every primitive
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Simple type name (without namespace)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::U1 => "Byte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::U2 => "UInt16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::U4 => "UInt32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::U8 => "UInt64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
            PrimitiveKind::I => "IntPtr",
            PrimitiveKind::U => "UIntPtr",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::String => "String",
            PrimitiveKind::ValueType => "ValueType",
        }
    }

    /// Canonical full name, e.g. `System.Int32`
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("{}.{}", self.namespace(), self.name())
    }

    /// The C# keyword aliasing this type, if the language has one
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Void => Some("void"),
            PrimitiveKind::Boolean => Some("bool"),
            PrimitiveKind::Char => Some("char"),
            PrimitiveKind::I1 => Some("sbyte"),
            PrimitiveKind::U1 => Some("byte"),
            PrimitiveKind::I2 => Some("short"),
            PrimitiveKind::U2 => Some("ushort"),
            PrimitiveKind::I4 => Some("int"),
            PrimitiveKind::U4 => Some("uint"),
            PrimitiveKind::I8 => Some("long"),
            PrimitiveKind::U8 => Some("ulong"),
            PrimitiveKind::R4 => Some("float"),
            PrimitiveKind::R8 => Some("double"),
            PrimitiveKind::Decimal => Some("decimal"),
            PrimitiveKind::Object => Some("object"),
            PrimitiveKind::String => Some("string"),
            PrimitiveKind::I | PrimitiveKind::U | PrimitiveKind::ValueType => None,
        }
    }

    /// Check if this primitive is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Void
                | PrimitiveKind::Object
                | PrimitiveKind::String
                | PrimitiveKind::ValueType
        )
    }

    /// The artificial token every registry assigns to this primitive
    #[must_use]
    pub fn token(&self) -> Token {
        #[allow(clippy::cast_possible_truncation)]
        let row = *self as u32 + 1;
        Token::from_parts(TABLE_ARTIFICIAL, row)
    }

    /// Look up a primitive by its canonical full name
    #[must_use]
    pub fn from_fullname(fullname: &str) -> Option<Self> {
        let name = fullname.strip_prefix("System.")?;
        PrimitiveKind::iter().find(|kind| kind.name() == name)
    }

    /// Number of known primitives
    #[must_use]
    pub fn count() -> usize {
        PrimitiveKind::COUNT
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fullname_roundtrip() {
        for kind in PrimitiveKind::iter() {
            assert_eq!(PrimitiveKind::from_fullname(&kind.fullname()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_fullname("System.Guid"), None);
        assert_eq!(PrimitiveKind::from_fullname("Int32"), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(PrimitiveKind::I4.keyword(), Some("int"));
        assert_eq!(PrimitiveKind::String.keyword(), Some("string"));
        assert_eq!(PrimitiveKind::Decimal.keyword(), Some("decimal"));
        assert_eq!(PrimitiveKind::I.keyword(), None);
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<Token> = PrimitiveKind::iter().map(|kind| kind.token()).collect();
        assert_eq!(tokens.len(), PrimitiveKind::count());
        assert!(tokens.iter().all(|token| token.table() == TABLE_ARTIFICIAL));
    }

    #[test]
    fn test_value_types() {
        assert!(PrimitiveKind::I4.is_value_type());
        assert!(PrimitiveKind::Decimal.is_value_type());
        assert!(!PrimitiveKind::String.is_value_type());
        assert!(!PrimitiveKind::Void.is_value_type());
    }
}
