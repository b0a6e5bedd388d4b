//! Builder for reflected type descriptors.
//!
//! This module provides the [`TypeBuilder`] struct, a fluent API for constructing classes,
//! interfaces, value types, generic definitions and instances, arrays, pointers and generic
//! parameters, and registering them in a [`TypeRegistry`]. [`MethodBuilder`] describes the
//! methods a type declares.
//!
//! Descriptors are immutable once built, so a base type, element type or generic argument must
//! be built before the type that uses it.
//!
//! # Example
//!
//! ```rust
//! use hubscope::metadata::{
//!     method::MethodAccessFlags,
//!     typesystem::{MethodBuilder, PrimitiveKind, TypeBuilder, TypeRegistry},
//! };
//!
//! let registry = TypeRegistry::new();
//! let task = TypeBuilder::new(&registry)
//!     .class("System.Threading.Tasks", "Task")
//!     .referenced("System.Runtime")
//!     .build()?;
//! let string = registry.get_primitive(PrimitiveKind::String)?;
//!
//! let client = TypeBuilder::new(&registry)
//!     .interface("Chat.Shared", "IChatClient")
//!     .method(
//!         MethodBuilder::new("ReceiveMessage")
//!             .param("user", &string)
//!             .param("message", &string)
//!             .returns(&task)
//!             .abstract_method(),
//!     )
//!     .build()?;
//!
//! assert_eq!(client.methods.len(), 1);
//! assert_eq!(client.methods[0].declaring_type, "Chat.Shared.IChatClient");
//! # Ok::<(), hubscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        method::{
            MethodAccessFlags, MethodDescriptor, MethodModifiers, MethodRc, ParamDescriptor,
        },
        token::Token,
        typesystem::{
            PrimitiveKind, TypeAttributes, TypeDescriptor, TypeFlavor, TypeRc, TypeRegistry,
            TypeSource,
        },
    },
    Error::TypeError,
    Result,
};

/// What kind of type the builder has been asked to produce
enum Shape {
    Named {
        namespace: String,
        name: String,
        flavor: TypeFlavor,
    },
    Instance {
        definition: TypeRc,
        args: Vec<TypeRc>,
    },
    Array {
        element: TypeRc,
        rank: u32,
    },
    Pointer {
        element: TypeRc,
    },
    Parameter {
        name: String,
        index: u32,
        method: bool,
    },
}

/// Provides a fluent API for building type descriptors
pub struct TypeBuilder<'a> {
    /// Type registry for storing the types
    registry: &'a TypeRegistry,
    /// Current source context
    source: TypeSource,
    /// Current type being built
    shape: Option<Shape>,
    flags: TypeAttributes,
    base: Option<TypeRc>,
    generic_params: Vec<String>,
    methods: Vec<MethodBuilder>,
}

impl<'a> TypeBuilder<'a> {
    /// Create a new builder with the given registry
    ///
    /// ## Arguments
    /// * 'registry' - The type registry to use
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        TypeBuilder {
            registry,
            source: TypeSource::Defined,
            shape: None,
            flags: TypeAttributes::PUBLIC,
            base: None,
            generic_params: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn named(mut self, namespace: &str, name: &str, flavor: TypeFlavor) -> Self {
        self.shape = Some(Shape::Named {
            namespace: namespace.to_string(),
            name: name.to_string(),
            flavor,
        });
        self
    }

    /// Start building a class
    #[must_use]
    pub fn class(self, namespace: &str, name: &str) -> Self {
        self.named(namespace, name, TypeFlavor::Class)
    }

    /// Start building an interface (implicitly abstract)
    #[must_use]
    pub fn interface(mut self, namespace: &str, name: &str) -> Self {
        self.flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self.named(namespace, name, TypeFlavor::Interface)
    }

    /// Start building a user-defined value type
    #[must_use]
    pub fn value_type(mut self, namespace: &str, name: &str) -> Self {
        self.flags |= TypeAttributes::SEALED;
        self.named(namespace, name, TypeFlavor::ValueType)
    }

    /// Start building an instantiation of a generic definition
    ///
    /// ## Arguments
    /// * 'definition' - The open generic definition
    /// * 'args' - The type arguments, one per generic parameter
    #[must_use]
    pub fn instantiate(mut self, definition: &TypeRc, args: &[TypeRc]) -> Self {
        self.source = TypeSource::Constructed;
        self.shape = Some(Shape::Instance {
            definition: definition.clone(),
            args: args.to_vec(),
        });
        self
    }

    /// Start building an array of `element`
    ///
    /// ## Arguments
    /// * 'element' - The element type
    /// * 'rank' - Number of dimensions (1 for `T[]`)
    #[must_use]
    pub fn array_of(mut self, element: &TypeRc, rank: u32) -> Self {
        self.source = TypeSource::Constructed;
        self.shape = Some(Shape::Array {
            element: element.clone(),
            rank,
        });
        self
    }

    /// Start building an unmanaged pointer to `element`
    #[must_use]
    pub fn pointer_to(mut self, element: &TypeRc) -> Self {
        self.source = TypeSource::Constructed;
        self.shape = Some(Shape::Pointer {
            element: element.clone(),
        });
        self
    }

    /// Start building a generic parameter
    ///
    /// ## Arguments
    /// * 'name' - Declared parameter name (may be empty)
    /// * 'index' - Position in the owners generic parameter list
    /// * 'method' - Whether the owner is a method rather than a type
    #[must_use]
    pub fn generic_parameter(mut self, name: &str, index: u32, method: bool) -> Self {
        self.source = TypeSource::Constructed;
        self.shape = Some(Shape::Parameter {
            name: name.to_string(),
            index,
            method,
        });
        self
    }

    /// Mark the type as coming from a referenced assembly
    #[must_use]
    pub fn referenced(mut self, assembly: &str) -> Self {
        self.source = TypeSource::Referenced(assembly.to_string());
        self
    }

    /// Nest the type inside `outer` (rendered as `Outer+Inner` in canonical names)
    #[must_use]
    pub fn nested_in(mut self, outer: &TypeRc) -> Self {
        if let Some(Shape::Named {
            namespace, name, ..
        }) = &mut self.shape
        {
            namespace.clone_from(&outer.namespace);
            *name = format!("{}+{}", outer.name, name);
        }
        self.flags.remove(TypeAttributes::PUBLIC);
        self.flags |= TypeAttributes::NESTED_PUBLIC;
        self
    }

    /// Set the base type
    #[must_use]
    pub fn extends(mut self, base: &TypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Mark the type abstract
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.flags |= TypeAttributes::ABSTRACT;
        self
    }

    /// Make the type non-public
    #[must_use]
    pub fn internal(mut self) -> Self {
        self.flags.remove(TypeAttributes::PUBLIC | TypeAttributes::NESTED_PUBLIC);
        self
    }

    /// Declare generic parameters, turning the type into a generic definition
    ///
    /// The name is expected to carry the matching arity suffix (e.g. ``Hub`1``).
    #[must_use]
    pub fn generic_params(mut self, names: &[&str]) -> Self {
        self.generic_params = names.iter().map(|name| (*name).to_string()).collect();
        self
    }

    /// Add a method declared by this type
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Finish the descriptor and register it
    ///
    /// Generic instances, arrays and pointers are deduplicated by canonical name: building the
    /// same construction twice returns the first descriptor.
    ///
    /// # Errors
    /// Returns an error if no type was started, if a generic instance has the wrong number of
    /// arguments, or if an array rank is zero.
    pub fn build(self) -> Result<TypeRc> {
        let Some(shape) = self.shape else {
            return Err(TypeError("TypeBuilder::build called without a type".to_string()));
        };

        let mut descriptor = match shape {
            Shape::Named {
                namespace,
                name,
                flavor,
            } => {
                let token = self.registry.next_type_token(&self.source);
                let mut descriptor =
                    TypeDescriptor::new(token, namespace, name, flavor, self.flags, self.source);
                descriptor.base = match self.base {
                    Some(base) => Some(base),
                    None if descriptor.is_interface() => None,
                    None => {
                        let object = self.registry.get_primitive(PrimitiveKind::Object)?;
                        if descriptor.flavor == TypeFlavor::ValueType {
                            Some(self.registry.get_primitive(PrimitiveKind::ValueType)?)
                        } else {
                            Some(object)
                        }
                    }
                };
                descriptor.generic_params = self.generic_params;
                descriptor
            }
            Shape::Instance { definition, args } => {
                if definition.generic_params.len() != args.len() {
                    return Err(malformed_error!(
                        "{} expects {} type arguments, got {}",
                        definition.fullname(),
                        definition.generic_params.len(),
                        args.len()
                    ));
                }

                let mut descriptor = TypeDescriptor::new(
                    Token::new(0),
                    definition.namespace.clone(),
                    definition.name.clone(),
                    TypeFlavor::GenericInstance,
                    definition.flags,
                    TypeSource::Constructed,
                );
                descriptor.base = match &definition.base {
                    Some(base) => Some(substitute(self.registry, base, &args)?),
                    None => None,
                };
                descriptor.methods = definition
                    .methods
                    .iter()
                    .map(|method| substitute_method(self.registry, method, &args))
                    .collect::<Result<Vec<_>>>()?;
                descriptor.generic_params = definition.generic_params.clone();
                descriptor.generic_definition = Some(definition);
                descriptor.generic_args = args;
                descriptor
            }
            Shape::Array { element, rank } => {
                if rank == 0 {
                    return Err(malformed_error!(
                        "Array of {} must have a rank of at least 1",
                        element.display_name()
                    ));
                }

                let mut descriptor = TypeDescriptor::new(
                    Token::new(0),
                    String::new(),
                    String::new(),
                    TypeFlavor::Array { rank },
                    TypeAttributes::PUBLIC | TypeAttributes::SEALED,
                    TypeSource::Constructed,
                );
                descriptor.element = Some(element);
                descriptor
            }
            Shape::Pointer { element } => {
                let mut descriptor = TypeDescriptor::new(
                    Token::new(0),
                    String::new(),
                    String::new(),
                    TypeFlavor::Pointer,
                    TypeAttributes::PUBLIC,
                    TypeSource::Constructed,
                );
                descriptor.element = Some(element);
                descriptor
            }
            Shape::Parameter {
                name,
                index,
                method,
            } => TypeDescriptor::new(
                Token::new(0),
                String::new(),
                name,
                TypeFlavor::GenericParameter { index, method },
                TypeAttributes::empty(),
                TypeSource::Constructed,
            ),
        };

        if descriptor.flavor.is_constructed() {
            if let Some(existing) = descriptor
                .canonical_name()
                .and_then(|name| self.registry.get_by_fullname(&name))
            {
                return Ok(existing);
            }
        }

        if descriptor.token.is_null() {
            descriptor.token = self.registry.next_type_token(&TypeSource::Constructed);
        }

        if !self.methods.is_empty() {
            let declaring = descriptor
                .canonical_name()
                .unwrap_or_else(|| descriptor.display_name());
            for method in self.methods {
                descriptor
                    .methods
                    .push(Arc::new(method.finish(self.registry, &declaring)?));
            }
        }

        let descriptor = Arc::new(descriptor);
        self.registry.insert(&descriptor);
        Ok(descriptor)
    }
}

/// Replace the type-level generic parameters in `ty` with `args`, by position
///
/// Arrays, pointers and generic instances that mention a parameter are rebuilt through the
/// registry. Method-level parameters are left alone.
fn substitute(registry: &TypeRegistry, ty: &TypeRc, args: &[TypeRc]) -> Result<TypeRc> {
    if !ty.contains_generic_parameters() {
        return Ok(ty.clone());
    }

    match &ty.flavor {
        TypeFlavor::GenericParameter {
            index,
            method: false,
        } => args.get(*index as usize).cloned().ok_or_else(|| {
            malformed_error!(
                "Generic parameter {} is out of range for {} type arguments",
                ty.display_name(),
                args.len()
            )
        }),
        TypeFlavor::Array { rank } => match &ty.element {
            Some(element) => TypeBuilder::new(registry)
                .array_of(&substitute(registry, element, args)?, *rank)
                .build(),
            None => Ok(ty.clone()),
        },
        TypeFlavor::Pointer => match &ty.element {
            Some(element) => TypeBuilder::new(registry)
                .pointer_to(&substitute(registry, element, args)?)
                .build(),
            None => Ok(ty.clone()),
        },
        TypeFlavor::GenericInstance => match &ty.generic_definition {
            Some(definition) => {
                let substituted = ty
                    .generic_args
                    .iter()
                    .map(|arg| substitute(registry, arg, args))
                    .collect::<Result<Vec<_>>>()?;
                TypeBuilder::new(registry)
                    .instantiate(definition, &substituted)
                    .build()
            }
            None => Ok(ty.clone()),
        },
        _ => Ok(ty.clone()),
    }
}

/// Copy of `method` with its signature closed over `args`
///
/// The declaring type keeps naming the generic definition.
fn substitute_method(
    registry: &TypeRegistry,
    method: &MethodRc,
    args: &[TypeRc],
) -> Result<MethodRc> {
    let open = method.return_type.contains_generic_parameters()
        || method
            .params
            .iter()
            .any(|param| param.param_type.contains_generic_parameters());
    if !open {
        return Ok(method.clone());
    }

    let params = method
        .params
        .iter()
        .map(|param| -> Result<ParamDescriptor> {
            Ok(ParamDescriptor {
                name: param.name.clone(),
                param_type: substitute(registry, &param.param_type, args)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Arc::new(MethodDescriptor {
        token: method.token,
        name: method.name.clone(),
        declaring_type: method.declaring_type.clone(),
        params,
        return_type: substitute(registry, &method.return_type, args)?,
        flags: method.flags,
    }))
}

/// Fluent description of one method, finished by the declaring [`TypeBuilder`]
pub struct MethodBuilder {
    name: String,
    params: Vec<(String, TypeRc)>,
    return_type: Option<TypeRc>,
    flags: u32,
}

impl MethodBuilder {
    /// Start a public instance method named `name`, returning `void` unless told otherwise
    #[must_use]
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            params: Vec::new(),
            return_type: None,
            flags: MethodAccessFlags::PUBLIC.bits() | MethodModifiers::HIDE_BY_SIG.bits(),
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, name: &str, param_type: &TypeRc) -> Self {
        self.params.push((name.to_string(), param_type.clone()));
        self
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, return_type: &TypeRc) -> Self {
        self.return_type = Some(return_type.clone());
        self
    }

    /// Replace the access bits
    #[must_use]
    pub fn access(mut self, access: MethodAccessFlags) -> Self {
        self.flags = (self.flags & !crate::metadata::method::METHOD_ACCESS_MASK) | access.bits();
        self
    }

    /// Add modifier bits
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.flags |= modifiers.bits();
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_method(self) -> Self {
        self.modifiers(MethodModifiers::STATIC)
    }

    /// Mark the method abstract (and virtual)
    #[must_use]
    pub fn abstract_method(self) -> Self {
        self.modifiers(MethodModifiers::ABSTRACT | MethodModifiers::VIRTUAL)
    }

    /// Mark the method virtual
    #[must_use]
    pub fn virtual_method(self) -> Self {
        self.modifiers(MethodModifiers::VIRTUAL)
    }

    fn finish(self, registry: &TypeRegistry, declaring_type: &str) -> Result<MethodDescriptor> {
        let return_type = match self.return_type {
            Some(return_type) => return_type,
            None => registry.get_primitive(PrimitiveKind::Void)?,
        };

        Ok(MethodDescriptor {
            token: registry.next_method_token(),
            name: self.name,
            declaring_type: declaring_type.to_string(),
            params: self
                .params
                .into_iter()
                .map(|(name, param_type)| ParamDescriptor { name, param_type })
                .collect(),
            return_type,
            flags: self.flags,
        })
    }
}
