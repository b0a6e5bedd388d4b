//! Reflected method descriptors.
//!
//! A [`MethodDescriptor`] is the immutable description of one method as it was reflected from
//! the hub assembly: its name, the canonical name of its declaring type, its ordered parameters,
//! its return type and its attribute flags. Descriptors are owned by the
//! [`crate::metadata::typesystem::TypeDescriptor`] that declares them.

mod types;

use std::sync::Arc;

pub use types::{MethodAccessFlags, MethodModifiers, METHOD_ACCESS_MASK};

use crate::metadata::{
    token::Token,
    typesystem::{SignatureHash, TypeRc},
};

/// Reference to a `MethodDescriptor`
pub type MethodRc = Arc<MethodDescriptor>;

/// Name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";
/// Name of type initializers
pub const TYPE_INITIALIZER_NAME: &str = ".cctor";

/// A single method parameter
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Parameter name, as declared
    pub name: String,
    /// Declared parameter type
    pub param_type: TypeRc,
}

/// The immutable description of a reflected method
#[derive(Debug)]
pub struct MethodDescriptor {
    /// Token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Canonical full name of the type that declares this method
    pub declaring_type: String,
    /// Ordered parameters
    pub params: Vec<ParamDescriptor>,
    /// Return type (`System.Void` for procedures)
    pub return_type: TypeRc,
    /// Raw `MethodAttributes`
    pub flags: u32,
}

impl MethodDescriptor {
    /// Access flags of this method
    #[must_use]
    pub fn access(&self) -> MethodAccessFlags {
        MethodAccessFlags::from_method_flags(self.flags)
    }

    /// Modifier flags of this method
    #[must_use]
    pub fn modifiers(&self) -> MethodModifiers {
        MethodModifiers::from_method_flags(self.flags)
    }

    /// Returns true if the method is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access() == MethodAccessFlags::PUBLIC
    }

    /// Returns true if the method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers().contains(MethodModifiers::STATIC)
    }

    /// Returns true if the method is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.modifiers().contains(MethodModifiers::ABSTRACT)
    }

    /// Returns true if the method has a special name (accessors, operators)
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.modifiers()
            .intersects(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME)
    }

    /// Returns true if the method is an instance constructor or a type initializer
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME || self.name == TYPE_INITIALIZER_NAME
    }

    /// Signature identity (name + parameter canonical names) used to detect overrides
    #[must_use]
    pub fn signature_hash(&self) -> u64 {
        self.params
            .iter()
            .fold(SignatureHash::new().add_name(&self.name), |hash, param| {
                hash.add_type_name(&param.param_type.identity_name())
            })
            .finalize()
    }
}
