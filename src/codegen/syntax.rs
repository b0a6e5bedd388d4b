//! Structural model of the emitted C# source.
//!
//! Synthesizers build these values; [`crate::codegen::writer::CodeWriter`] turns them into text.
//! The model only covers the constructs generated proxies use.

use bitflags::bitflags;

use crate::codegen::mapper::TypeSyntax;

/// File name hint of every emitted unit
pub const HINT_NAME: &str = "HubProxy.cs";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Declaration modifiers, rendered in the canonical C# order
    pub struct Modifiers: u32 {
        /// `public`
        const PUBLIC = 0x0001;
        /// `protected`
        const PROTECTED = 0x0002;
        /// `private`
        const PRIVATE = 0x0004;
        /// `static`
        const STATIC = 0x0010;
        /// `readonly`
        const READONLY = 0x0020;
        /// `override`
        const OVERRIDE = 0x0040;
        /// `async`
        const ASYNC = 0x0080;
        /// `partial`
        const PARTIAL = 0x0100;
    }
}

impl Modifiers {
    /// Keywords of the set modifiers, in declaration order
    #[must_use]
    pub fn keywords(&self) -> Vec<&'static str> {
        [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::STATIC, "static"),
            (Modifiers::READONLY, "readonly"),
            (Modifiers::OVERRIDE, "override"),
            (Modifiers::ASYNC, "async"),
            (Modifiers::PARTIAL, "partial"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, keyword)| keyword)
        .collect()
    }
}

/// One emitted source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// File name hint for the host
    pub hint_name: String,
    /// Enclosing namespace, `None` for the global namespace
    pub namespace: Option<String>,
    /// Generated classes, in hub declaration order
    pub classes: Vec<ClassDecl>,
}

impl CompilationUnit {
    /// Create an empty unit with the default hint name
    #[must_use]
    pub fn new(namespace: Option<String>) -> Self {
        CompilationUnit {
            hint_name: HINT_NAME.to_string(),
            namespace,
            classes: Vec::new(),
        }
    }
}

/// A class declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// `<summary>` documentation
    pub doc: Option<String>,
    /// Modifiers (always including `partial` for proxies)
    pub modifiers: Modifiers,
    /// Class name
    pub name: String,
    /// Base types and implemented interfaces
    pub bases: Vec<TypeSyntax>,
    /// Members, in emission order
    pub members: Vec<Member>,
}

/// An attribute applied to a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Target specifier, e.g. `field`
    pub target: Option<&'static str>,
    /// Attribute class
    pub attribute_type: TypeSyntax,
}

/// A class member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// A field, or a field-like event
    Field {
        /// Attributes
        attributes: Vec<AttributeDecl>,
        /// Modifiers
        modifiers: Modifiers,
        /// Whether the field is declared with the `event` keyword
        event: bool,
        /// Field type
        field_type: TypeSyntax,
        /// Field name
        name: String,
        /// Initializer expression
        initializer: Option<Expr>,
    },
    /// An auto-property
    Property {
        /// Modifiers
        modifiers: Modifiers,
        /// Property type
        property_type: TypeSyntax,
        /// Property name
        name: String,
        /// Setter modifiers; `None` for a get-only property
        setter: Option<Modifiers>,
    },
    /// A method; a missing body declares a partial method
    Method(MethodDecl),
}

impl Member {
    /// Name of the declared member
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Member::Field { name, .. } | Member::Property { name, .. } => name,
            Member::Method(method) => &method.name,
        }
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// `<summary>` documentation
    pub doc: Option<String>,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Return type
    pub return_type: TypeSyntax,
    /// Method name
    pub name: String,
    /// Parameters, in order
    pub params: Vec<ParamDecl>,
    /// Body; `None` renders as a declaration terminated by `;`
    pub body: Option<Block>,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Parameter type
    pub param_type: TypeSyntax,
    /// Parameter name
    pub name: String,
    /// Default value
    pub default: Option<Expr>,
}

impl ParamDecl {
    /// A required parameter
    #[must_use]
    pub fn new(param_type: TypeSyntax, name: impl Into<String>) -> Self {
        ParamDecl {
            param_type,
            name: name.into(),
            default: None,
        }
    }
}

/// A braced statement list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block(pub Vec<Stmt>);

/// A statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `expr;`
    Expr(Expr),
    /// `var name = value;`
    Local {
        /// Variable name
        name: String,
        /// Initial value
        value: Expr,
    },
    /// `return;` or `return expr;`
    Return(Option<Expr>),
    /// `if (condition) { .. } else { .. }`
    If {
        /// Condition
        condition: Expr,
        /// Taken branch
        then: Block,
        /// Else branch
        otherwise: Option<Block>,
    },
    /// `throw expr;`
    Throw(Expr),
    /// `foreach (var item in collection) { .. }`
    ForEach {
        /// Loop variable
        item: String,
        /// Enumerated expression
        collection: Expr,
        /// Loop body
        body: Block,
    },
}

/// An expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A simple name
    Ident(String),
    /// A type used in expression position (static member access)
    Type(TypeSyntax),
    /// `null`
    Null,
    /// `default`
    Default,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal (escaped on rendering)
    Str(String),
    /// `target.name`
    Member {
        /// Accessed expression
        target: Box<Expr>,
        /// Member name
        name: String,
    },
    /// `target(args)`
    Invoke {
        /// Invoked expression
        target: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// `await expr`
    Await(Box<Expr>),
    /// `(T)expr`
    Cast {
        /// Target type
        target_type: TypeSyntax,
        /// Converted expression
        expr: Box<Expr>,
    },
    /// `typeof(T)`
    TypeOf(TypeSyntax),
    /// `new T[] { items }`
    NewArray {
        /// Element type
        element_type: TypeSyntax,
        /// Initializer items
        items: Vec<Expr>,
    },
    /// `target[index]`
    Index {
        /// Indexed expression
        target: Box<Expr>,
        /// Index expression
        index: Box<Expr>,
    },
    /// `(params) => body`
    Lambda {
        /// Parameter names
        params: Vec<String>,
        /// Expression body
        body: Box<Expr>,
    },
    /// `condition ? then : otherwise`
    Conditional {
        /// Condition
        condition: Box<Expr>,
        /// Value when true
        then: Box<Expr>,
        /// Value when false
        otherwise: Box<Expr>,
    },
    /// `left == right` / `left != right`
    Compare {
        /// Left operand
        left: Box<Expr>,
        /// Whether this is `!=`
        negated: bool,
        /// Right operand
        right: Box<Expr>,
    },
    /// `!expr`
    Not(Box<Expr>),
    /// `target = value`
    Assign {
        /// Assigned location
        target: Box<Expr>,
        /// Assigned value
        value: Box<Expr>,
    },
    /// `new T(args)`
    New {
        /// Created type
        created_type: TypeSyntax,
        /// Constructor arguments
        args: Vec<Expr>,
    },
}

impl Expr {
    /// A simple name
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// A string literal
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    /// `self.name`
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Expr::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// `self(args)`
    #[must_use]
    pub fn invoke(self, args: Vec<Expr>) -> Self {
        Expr::Invoke {
            target: Box::new(self),
            args,
        }
    }

    /// `await self`
    #[must_use]
    pub fn awaited(self) -> Self {
        Expr::Await(Box::new(self))
    }

    /// `(target_type)self`
    #[must_use]
    pub fn cast(self, target_type: TypeSyntax) -> Self {
        Expr::Cast {
            target_type,
            expr: Box::new(self),
        }
    }

    /// `self[index]`
    #[must_use]
    pub fn index(self, index: Expr) -> Self {
        Expr::Index {
            target: Box::new(self),
            index: Box::new(index),
        }
    }

    /// `self == other`
    #[must_use]
    pub fn equals(self, other: Expr) -> Self {
        Expr::Compare {
            left: Box::new(self),
            negated: false,
            right: Box::new(other),
        }
    }

    /// `self != other`
    #[must_use]
    pub fn not_equals(self, other: Expr) -> Self {
        Expr::Compare {
            left: Box::new(self),
            negated: true,
            right: Box::new(other),
        }
    }

    /// `self = value`
    #[must_use]
    pub fn assign(self, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(self),
            value: Box::new(value),
        }
    }

    /// Wrap into an expression statement
    #[must_use]
    pub fn stmt(self) -> Stmt {
        Stmt::Expr(self)
    }
}
