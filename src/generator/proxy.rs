//! Proxy-method synthesis.
//!
//! Every RPC-shaped hub method becomes one `async` method on the proxy with the same name and
//! parameters plus a trailing optional `CancellationToken`. The body packs the arguments in
//! declaration order and awaits the connection's generic invocation primitive:
//!
//! ```text
//! public async Task<int> Add(int a, int b, CancellationToken cancellationToken = default)
//! {
//!     return (int)await HubConnection.InvokeCoreAsync("Add", typeof(int), new object[] { a, b }, cancellationToken);
//! }
//! ```
//!
//! Methods returning a bare `Task` pass `typeof(void)` as the "no value" token and return
//! nothing. Methods returning anything else are not RPC-shaped and are skipped.

use std::collections::HashSet;

use crate::{
    codegen::{
        contract::{RuntimeContract, CANCELLATION_PARAMETER},
        mapper::TypeMapper,
        symbols::{TASK, TASK_OF},
        syntax::{Block, Expr, MethodDecl, Modifiers, ParamDecl, Stmt},
    },
    metadata::{
        method::{MethodDescriptor, ParamDescriptor},
        typesystem::{TypeDescriptor, TypeRc},
    },
    Result,
};

/// C# reserved keywords, which need an `@` prefix when used as identifiers
const RESERVED_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// The completion shape of a hub method's return type
#[derive(Debug, Clone)]
pub enum ReturnShape {
    /// `System.Threading.Tasks.Task`
    Completion,
    /// ``System.Threading.Tasks.Task`1`` carrying a value of the given type
    CompletionOf(TypeRc),
}

impl ReturnShape {
    /// Classify a return type, `None` if it is not a completion handle
    #[must_use]
    pub fn detect(return_type: &TypeDescriptor) -> Option<Self> {
        if return_type.is_generic_instance() {
            let definition = return_type.generic_definition()?;
            if definition.fullname() == TASK_OF {
                return return_type
                    .generic_args
                    .first()
                    .map(|value| ReturnShape::CompletionOf(value.clone()));
            }
            return None;
        }

        (return_type.canonical_name().as_deref() == Some(TASK)).then_some(ReturnShape::Completion)
    }
}

/// `name` as a C# identifier, prefixed with `@` if it is a reserved keyword
pub(crate) fn escape_identifier(name: &str) -> String {
    if RESERVED_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Emitted parameter names for `params`, in order.
///
/// Keywords are escaped with `@`, unnamed parameters become `argN`, and names colliding with
/// `reserved` or with an earlier parameter get their position appended.
pub(crate) fn parameter_names(params: &[ParamDescriptor], reserved: &[&str]) -> Vec<String> {
    let mut used: HashSet<String> = reserved.iter().map(|name| (*name).to_string()).collect();
    let mut names = Vec::with_capacity(params.len());

    for (index, param) in params.iter().enumerate() {
        let mut name = if param.name.is_empty() {
            format!("arg{}", index)
        } else {
            escape_identifier(&param.name)
        };

        if used.contains(&name) {
            name = format!("{}{}", name, index);
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

/// Synthesize the proxy method for one hub method, `None` if the method is not RPC-shaped
///
/// # Errors
/// Returns [`crate::Error::Resolution`] if a parameter or result type has no equivalent in the
/// target symbol space.
pub fn synthesize(
    contract: &RuntimeContract,
    mapper: &TypeMapper<'_>,
    method: &MethodDescriptor,
) -> Result<Option<MethodDecl>> {
    let Some(shape) = ReturnShape::detect(&method.return_type) else {
        log::debug!(
            "{}.{} returns {}, not proxied",
            method.declaring_type,
            method.name,
            method.return_type.identity_name()
        );
        return Ok(None);
    };

    let names = parameter_names(&method.params, &[CANCELLATION_PARAMETER]);
    let mut params = Vec::with_capacity(method.params.len() + 1);
    for (param, name) in method.params.iter().zip(&names) {
        params.push(ParamDecl::new(mapper.map(&param.param_type)?, name.clone()));
    }
    params.push(contract.cancellation_parameter());

    let args = names.iter().map(Expr::ident).collect();
    let (return_type, statement) = match shape {
        ReturnShape::Completion => (
            contract.task.clone(),
            contract
                .invoke_core(&method.name, contract.void.clone(), args)
                .awaited()
                .stmt(),
        ),
        ReturnShape::CompletionOf(value) => {
            let value = mapper.map(&value)?;
            let call = contract
                .invoke_core(&method.name, value.clone(), args)
                .awaited()
                .cast(value.clone());
            (contract.task_of(value), Stmt::Return(Some(call)))
        }
    };

    Ok(Some(MethodDecl {
        doc: Some(format!("Invokes the <c>{}</c> hub method.", method.name)),
        modifiers: Modifiers::PUBLIC | Modifiers::ASYNC,
        return_type,
        name: escape_identifier(&method.name),
        params,
        body: Some(Block(vec![statement])),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{
        codegen::{symbols::SymbolTable, writer::expr},
        metadata::{method::MethodAccessFlags, typesystem::{PrimitiveKind, TypeBuilder}},
        test::{method, primitive, RegistryFixture},
        Error,
    };

    use super::*;

    fn contract(symbols: &SymbolTable) -> RuntimeContract {
        RuntimeContract::resolve(&TypeMapper::new(symbols)).unwrap()
    }

    fn body(decl: &MethodDecl) -> String {
        match decl.body.as_ref().map(|b| &b.0[0]) {
            Some(Stmt::Return(Some(e))) | Some(Stmt::Expr(e)) => expr(e),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_return_shapes() {
        let fixture = RegistryFixture::new();
        let int = primitive(PrimitiveKind::I4);
        let task_of_int = TypeBuilder::new(fixture.registry())
            .instantiate(&fixture.task_of(), &[int.clone()])
            .build()
            .unwrap();

        assert!(matches!(ReturnShape::detect(&fixture.task()), Some(ReturnShape::Completion)));
        assert!(matches!(
            ReturnShape::detect(&task_of_int),
            Some(ReturnShape::CompletionOf(v)) if v.fullname() == "System.Int32"
        ));
        assert!(ReturnShape::detect(&int).is_none());
        assert!(ReturnShape::detect(&primitive(PrimitiveKind::Void)).is_none());
    }

    #[test]
    fn test_bare_task_method() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let contract = contract(&symbols);
        let mapper = TypeMapper::new(&symbols);
        let string = primitive(PrimitiveKind::String);

        let send = method(
            "SendMessage",
            &[("user", string.clone()), ("message", string)],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        );
        let decl = synthesize(&contract, &mapper, &send).unwrap().unwrap();

        assert_eq!(decl.name, "SendMessage");
        assert_eq!(decl.return_type, contract.task);
        assert_eq!(decl.params.len(), 3);
        assert_eq!(decl.params[2].name, "cancellationToken");
        assert_eq!(
            body(&decl),
            "await HubConnection.InvokeCoreAsync(\"SendMessage\", typeof(void), new object[] { user, message }, cancellationToken)"
        );
    }

    #[test]
    fn test_value_task_method() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let contract = contract(&symbols);
        let mapper = TypeMapper::new(&symbols);
        let int = primitive(PrimitiveKind::I4);
        let task_of_int = TypeBuilder::new(fixture.registry())
            .instantiate(&fixture.task_of(), &[int.clone()])
            .build()
            .unwrap();

        let add = method(
            "Add",
            &[("a", int.clone()), ("b", int)],
            task_of_int,
            MethodAccessFlags::PUBLIC.bits(),
        );
        let decl = synthesize(&contract, &mapper, &add).unwrap().unwrap();

        assert_eq!(
            decl.return_type.to_string(),
            "global::System.Threading.Tasks.Task<int>"
        );
        assert_eq!(
            body(&decl),
            "(int)await HubConnection.InvokeCoreAsync(\"Add\", typeof(int), new object[] { a, b }, cancellationToken)"
        );
    }

    #[test]
    fn test_parameterless_and_skipped() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let contract = contract(&symbols);
        let mapper = TypeMapper::new(&symbols);

        let ping = method("Ping", &[], fixture.task(), MethodAccessFlags::PUBLIC.bits());
        let decl = synthesize(&contract, &mapper, &ping).unwrap().unwrap();
        assert!(body(&decl).contains("new object[0]"));

        let sync = method(
            "Compute",
            &[],
            primitive(PrimitiveKind::I4),
            MethodAccessFlags::PUBLIC.bits(),
        );
        assert!(synthesize(&contract, &mapper, &sync).unwrap().is_none());
    }

    #[test]
    fn test_unknown_parameter_type() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let contract = contract(&symbols);
        let mapper = TypeMapper::new(&symbols);

        let secret = fixture.class("Chat.Server", "ServerOnly", None, Vec::new());
        let send = method(
            "Send",
            &[("value", secret)],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        );
        assert!(matches!(
            synthesize(&contract, &mapper, &send),
            Err(Error::Resolution { name }) if name == "Chat.Server.ServerOnly"
        ));
    }

    #[test]
    fn test_keyword_method_name() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let contract = contract(&symbols);
        let mapper = TypeMapper::new(&symbols);

        let event = method(
            "event",
            &[("params", primitive(PrimitiveKind::String))],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        );
        let decl = synthesize(&contract, &mapper, &event).unwrap().unwrap();

        assert_eq!(decl.name, "@event");
        assert_eq!(decl.params[0].name, "@params");
        assert_eq!(
            body(&decl),
            "await HubConnection.InvokeCoreAsync(\"event\", typeof(void), new object[] { @params }, cancellationToken)"
        );
        assert_eq!(escape_identifier("Send"), "Send");
    }

    #[test]
    fn test_parameter_names() {
        let string = primitive(PrimitiveKind::String);
        let param = |name: &str| ParamDescriptor {
            name: name.to_string(),
            param_type: string.clone(),
        };

        let names = parameter_names(
            &[param("event"), param(""), param("cancellationToken"), param("user"), param("user")],
            &[CANCELLATION_PARAMETER],
        );
        assert_eq!(
            names,
            vec!["@event", "arg1", "cancellationToken2", "user", "user4"]
        );
    }
}
