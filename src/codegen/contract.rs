//! The runtime contract every generated proxy implements.
//!
//! Generated proxies do not derive from a runtime base class. Each one carries the connection
//! handle and the registration collection itself and implements `ISupportInitialize` and
//! `IAsyncDisposable` directly. Initialization is a two-state machine: the first successful
//! `EndInit()` binds all client callbacks and marks the proxy initialized; later calls never bind
//! again.
//!
//! [`RuntimeContract::resolve`] looks up every platform type generated code mentions up front, so
//! a symbol space lacking one of them fails the request before any hub is analyzed.

use std::collections::HashMap;

use crate::{
    codegen::{
        mapper::{TypeMapper, TypeSyntax},
        symbols::{
            SymbolRc, ARGUMENT_NULL, ASYNC_DISPOSABLE, CANCELLATION_TOKEN, COLLECTION_OF,
            DISPOSABLE, HUB_CONNECTION, INVALID_OPERATION, LIST_OF, NON_SERIALIZED,
            SUPPORT_INITIALIZE, SYSTEM_TYPE, TASK, TASK_OF, VALUE_TASK,
        },
        syntax::{
            AttributeDecl, Block, Expr, Member, MethodDecl, Modifiers, ParamDecl, Stmt,
        },
    },
    generator::delegates::DelegateShape,
    metadata::typesystem::PrimitiveKind,
    Error::Resolution,
    Result,
};

/// Connection handle property
pub const HUB_CONNECTION_PROPERTY: &str = "HubConnection";
/// Registration collection field
pub const CALLBACK_HANDLERS_FIELD: &str = "ClientCallbackHandlers";
/// Initialization state property
pub const IS_INITIALIZED_PROPERTY: &str = "IsInitialized";
/// The method holding every callback registration
pub const BIND_CALLBACKS_METHOD: &str = "BindClientCallbacks";
/// Generic invocation primitive of the connection
pub const INVOKE_CORE_METHOD: &str = "InvokeCoreAsync";
/// Generic registration primitive of the connection
pub const ON_METHOD: &str = "On";
/// Trailing parameter of every proxy method
pub const CANCELLATION_PARAMETER: &str = "cancellationToken";

/// Message thrown by `EndInit()` when no connection was assigned
const MISSING_CONNECTION_MESSAGE: &str =
    "The \"HubConnection\" property must be specified during the initialization process.";

/// Every platform type generated code refers to, resolved in the target symbol space
pub struct RuntimeContract {
    /// `void`
    pub void: TypeSyntax,
    /// `bool`
    pub boolean: TypeSyntax,
    /// `object`
    pub object: TypeSyntax,
    /// `string`
    pub string: TypeSyntax,
    /// `System.Threading.Tasks.Task`
    pub task: TypeSyntax,
    task_of: SymbolRc,
    /// `System.Threading.Tasks.ValueTask`
    pub value_task: TypeSyntax,
    /// `System.Threading.CancellationToken`
    pub cancellation_token: TypeSyntax,
    /// `System.Type`
    pub system_type: TypeSyntax,
    disposable: TypeSyntax,
    async_disposable: TypeSyntax,
    support_initialize: TypeSyntax,
    collection_of: SymbolRc,
    list_of: SymbolRc,
    invalid_operation: TypeSyntax,
    argument_null: TypeSyntax,
    non_serialized: TypeSyntax,
    /// `Microsoft.AspNetCore.SignalR.Client.HubConnection`
    pub hub_connection: TypeSyntax,
    delegates: HashMap<DelegateShape, SymbolRc>,
}

impl RuntimeContract {
    /// Resolve the contract against a symbol space
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] naming the first platform type that is missing.
    pub fn resolve(mapper: &TypeMapper<'_>) -> Result<Self> {
        let primitive = |kind: PrimitiveKind| -> Result<TypeSyntax> {
            Ok(TypeSyntax::Named(mapper.symbol(&kind.fullname())?))
        };
        let named = |name: &str| -> Result<TypeSyntax> { Ok(TypeSyntax::Named(mapper.symbol(name)?)) };

        let mut delegates = HashMap::new();
        for shape in DelegateShape::all() {
            if let Some(name) = shape.metadata_name() {
                delegates.insert(shape, mapper.symbol(name)?);
            }
        }

        Ok(RuntimeContract {
            void: primitive(PrimitiveKind::Void)?,
            boolean: primitive(PrimitiveKind::Boolean)?,
            object: primitive(PrimitiveKind::Object)?,
            string: primitive(PrimitiveKind::String)?,
            task: named(TASK)?,
            task_of: mapper.symbol(TASK_OF)?,
            value_task: named(VALUE_TASK)?,
            cancellation_token: named(CANCELLATION_TOKEN)?,
            system_type: named(SYSTEM_TYPE)?,
            disposable: named(DISPOSABLE)?,
            async_disposable: named(ASYNC_DISPOSABLE)?,
            support_initialize: named(SUPPORT_INITIALIZE)?,
            collection_of: mapper.symbol(COLLECTION_OF)?,
            list_of: mapper.symbol(LIST_OF)?,
            invalid_operation: named(INVALID_OPERATION)?,
            argument_null: named(ARGUMENT_NULL)?,
            non_serialized: named(NON_SERIALIZED)?,
            hub_connection: named(HUB_CONNECTION)?,
            delegates,
        })
    }

    /// `Task<value>`
    #[must_use]
    pub fn task_of(&self, value: TypeSyntax) -> TypeSyntax {
        TypeSyntax::generic(&self.task_of, vec![value])
    }

    /// Construct a delegate type of the given shape over `args`
    ///
    /// # Errors
    /// Returns [`crate::Error::Resolution`] if the shape is not part of the platform families,
    /// or a malformed error if the argument count does not match the shape.
    pub fn delegate(&self, shape: DelegateShape, args: Vec<TypeSyntax>) -> Result<TypeSyntax> {
        let Some(symbol) = self.delegates.get(&shape) else {
            return Err(Resolution {
                name: format!("{:?}", shape),
            });
        };

        if args.len() != shape.arity() {
            return Err(malformed_error!(
                "{} expects {} type arguments, got {}",
                symbol.metadata_name,
                shape.arity(),
                args.len()
            ));
        }

        Ok(if args.is_empty() {
            TypeSyntax::Named(symbol.clone())
        } else {
            TypeSyntax::generic(symbol, args)
        })
    }

    /// `[field: NonSerialized]`
    #[must_use]
    pub fn non_serialized_field(&self) -> AttributeDecl {
        AttributeDecl {
            target: Some("field"),
            attribute_type: self.non_serialized.clone(),
        }
    }

    /// `Task.CompletedTask`
    #[must_use]
    pub fn completed_task(&self) -> Expr {
        Expr::Type(self.task.clone()).member("CompletedTask")
    }

    /// `HubConnection`
    #[must_use]
    pub fn connection(&self) -> Expr {
        Expr::ident(HUB_CONNECTION_PROPERTY)
    }

    /// `HubConnection.InvokeCoreAsync(name, typeof(result), new object[] { args }, cancellationToken)`
    #[must_use]
    pub fn invoke_core(&self, method: &str, result: TypeSyntax, args: Vec<Expr>) -> Expr {
        self.connection().member(INVOKE_CORE_METHOD).invoke(vec![
            Expr::string(method),
            Expr::TypeOf(result),
            Expr::NewArray {
                element_type: self.object.clone(),
                items: args,
            },
            Expr::ident(CANCELLATION_PARAMETER),
        ])
    }

    /// `ClientCallbackHandlers.Add(HubConnection.On(name, new Type[] { .. }, forwarder, null));`
    #[must_use]
    pub fn register_callback(&self, message: &str, param_types: Vec<TypeSyntax>, forwarder: Expr) -> Stmt {
        let registration = self.connection().member(ON_METHOD).invoke(vec![
            Expr::string(message),
            Expr::NewArray {
                element_type: self.system_type.clone(),
                items: param_types.into_iter().map(Expr::TypeOf).collect(),
            },
            forwarder,
            Expr::Null,
        ]);

        Expr::ident(CALLBACK_HANDLERS_FIELD)
            .member("Add")
            .invoke(vec![registration])
            .stmt()
    }

    /// The optional `CancellationToken cancellationToken = default` parameter
    #[must_use]
    pub fn cancellation_parameter(&self) -> ParamDecl {
        ParamDecl {
            param_type: self.cancellation_token.clone(),
            name: CANCELLATION_PARAMETER.to_string(),
            default: Some(Expr::Default),
        }
    }

    /// Interfaces every proxy implements
    #[must_use]
    pub fn interfaces(&self) -> Vec<TypeSyntax> {
        vec![self.support_initialize.clone(), self.async_disposable.clone()]
    }

    /// State and lifecycle members emitted ahead of the hub specific members
    ///
    /// ## Arguments
    /// * '`proxy_type`' - The generated class itself, as referenced from its factory
    #[must_use]
    pub fn lifecycle_members(&self, proxy_type: &TypeSyntax) -> Vec<Member> {
        vec![
            Member::Property {
                modifiers: Modifiers::PUBLIC,
                property_type: self.hub_connection.clone(),
                name: HUB_CONNECTION_PROPERTY.to_string(),
                setter: Some(Modifiers::empty()),
            },
            Member::Field {
                attributes: Vec::new(),
                modifiers: Modifiers::PRIVATE | Modifiers::READONLY,
                event: false,
                field_type: TypeSyntax::generic(&self.collection_of, vec![self.disposable.clone()]),
                name: CALLBACK_HANDLERS_FIELD.to_string(),
                initializer: Some(Expr::New {
                    created_type: TypeSyntax::generic(&self.list_of, vec![self.disposable.clone()]),
                    args: Vec::new(),
                }),
            },
            Member::Property {
                modifiers: Modifiers::PUBLIC,
                property_type: self.boolean.clone(),
                name: IS_INITIALIZED_PROPERTY.to_string(),
                setter: Some(Modifiers::PRIVATE),
            },
            Member::Method(self.create_method(proxy_type)),
            Member::Method(self.begin_init()),
            Member::Method(self.end_init()),
            Member::Method(self.forwarding_lifecycle("StartAsync", "Starts the connection to the server.")),
            Member::Method(self.forwarding_lifecycle("StopAsync", "Stops the connection to the server.")),
            Member::Method(self.dispose_async()),
        ]
    }

    /// `private void BindClientCallbacks() { .. }`
    #[must_use]
    pub fn bind_callbacks_method(&self, registrations: Vec<Stmt>) -> Member {
        Member::Method(MethodDecl {
            doc: None,
            modifiers: Modifiers::PRIVATE,
            return_type: self.void.clone(),
            name: BIND_CALLBACKS_METHOD.to_string(),
            params: Vec::new(),
            body: Some(Block(registrations)),
        })
    }

    fn create_method(&self, proxy_type: &TypeSyntax) -> MethodDecl {
        let proxy = || Expr::ident("proxy");
        let argument = "hubConnection";

        MethodDecl {
            doc: Some("Creates an initialized proxy bound to <paramref name=\"hubConnection\"/>.".to_string()),
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC,
            return_type: proxy_type.clone(),
            name: "Create".to_string(),
            params: vec![ParamDecl::new(self.hub_connection.clone(), argument)],
            body: Some(Block(vec![
                Stmt::If {
                    condition: Expr::ident(argument).equals(Expr::Null),
                    then: Block(vec![Stmt::Throw(Expr::New {
                        created_type: self.argument_null.clone(),
                        args: vec![Expr::string(argument)],
                    })]),
                    otherwise: None,
                },
                Stmt::Local {
                    name: "proxy".to_string(),
                    value: Expr::New {
                        created_type: proxy_type.clone(),
                        args: Vec::new(),
                    },
                },
                proxy().member("BeginInit").invoke(Vec::new()).stmt(),
                proxy()
                    .member(HUB_CONNECTION_PROPERTY)
                    .assign(Expr::ident(argument))
                    .stmt(),
                proxy().member("EndInit").invoke(Vec::new()).stmt(),
                Stmt::Return(Some(proxy())),
            ])),
        }
    }

    fn begin_init(&self) -> MethodDecl {
        MethodDecl {
            doc: None,
            modifiers: Modifiers::PUBLIC,
            return_type: self.void.clone(),
            name: "BeginInit".to_string(),
            params: Vec::new(),
            body: Some(Block::default()),
        }
    }

    fn end_init(&self) -> MethodDecl {
        MethodDecl {
            doc: None,
            modifiers: Modifiers::PUBLIC,
            return_type: self.void.clone(),
            name: "EndInit".to_string(),
            params: Vec::new(),
            body: Some(Block(vec![
                Stmt::If {
                    condition: self.connection().equals(Expr::Null),
                    then: Block(vec![Stmt::Throw(Expr::New {
                        created_type: self.invalid_operation.clone(),
                        args: vec![Expr::string(MISSING_CONNECTION_MESSAGE)],
                    })]),
                    otherwise: None,
                },
                Stmt::If {
                    condition: Expr::Not(Box::new(Expr::ident(IS_INITIALIZED_PROPERTY))),
                    then: Block(vec![
                        Expr::ident(BIND_CALLBACKS_METHOD).invoke(Vec::new()).stmt(),
                        Expr::ident(IS_INITIALIZED_PROPERTY)
                            .assign(Expr::Bool(true))
                            .stmt(),
                    ]),
                    otherwise: None,
                },
            ])),
        }
    }

    fn forwarding_lifecycle(&self, name: &str, doc: &str) -> MethodDecl {
        MethodDecl {
            doc: Some(doc.to_string()),
            modifiers: Modifiers::PUBLIC,
            return_type: self.task.clone(),
            name: name.to_string(),
            params: vec![self.cancellation_parameter()],
            body: Some(Block(vec![Stmt::Return(Some(
                self.connection()
                    .member(name)
                    .invoke(vec![Expr::ident(CANCELLATION_PARAMETER)]),
            ))])),
        }
    }

    fn dispose_async(&self) -> MethodDecl {
        let handlers = || Expr::ident(CALLBACK_HANDLERS_FIELD);
        let item = || Expr::ident("handler");

        MethodDecl {
            doc: None,
            modifiers: Modifiers::PUBLIC | Modifiers::ASYNC,
            return_type: self.value_task.clone(),
            name: "DisposeAsync".to_string(),
            params: Vec::new(),
            body: Some(Block(vec![
                Stmt::ForEach {
                    item: "handler".to_string(),
                    collection: handlers(),
                    body: Block(vec![Stmt::If {
                        condition: item().not_equals(Expr::Null),
                        then: Block(vec![item().member("Dispose").invoke(Vec::new()).stmt()]),
                        otherwise: None,
                    }]),
                },
                handlers().member("Clear").invoke(Vec::new()).stmt(),
                Stmt::If {
                    condition: self.connection().not_equals(Expr::Null),
                    then: Block(vec![self
                        .connection()
                        .member("DisposeAsync")
                        .invoke(Vec::new())
                        .awaited()
                        .stmt()]),
                    otherwise: None,
                },
            ])),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::codegen::{
        symbols::{Symbol, SymbolTable},
        syntax::{ClassDecl, CompilationUnit},
        writer::CodeWriter,
    };

    use super::*;

    fn render(contract: &RuntimeContract, registrations: Vec<Stmt>) -> String {
        let proxy = TypeSyntax::Named(Arc::new(Symbol::from_metadata_name("Chat.Client.ChatHubProxy")));
        let mut members = contract.lifecycle_members(&proxy);
        members.push(contract.bind_callbacks_method(registrations));

        let mut unit = CompilationUnit::new(Some("Chat.Client".to_string()));
        unit.classes.push(ClassDecl {
            doc: None,
            modifiers: Modifiers::PUBLIC | Modifiers::PARTIAL,
            name: "ChatHubProxy".to_string(),
            bases: contract.interfaces(),
            members,
        });
        CodeWriter::render(&unit)
    }

    #[test]
    fn test_resolve_requires_platform() {
        let empty = SymbolTable::new();
        assert!(matches!(
            RuntimeContract::resolve(&TypeMapper::new(&empty)),
            Err(crate::Error::Resolution { .. })
        ));

        let symbols = SymbolTable::platform();
        assert!(RuntimeContract::resolve(&TypeMapper::new(&symbols)).is_ok());
    }

    #[test]
    fn test_lifecycle_rendering() {
        let symbols = SymbolTable::platform();
        let contract = RuntimeContract::resolve(&TypeMapper::new(&symbols)).unwrap();
        let text = render(&contract, Vec::new());

        assert!(text.contains(
            "public partial class ChatHubProxy : global::System.ComponentModel.ISupportInitialize, global::System.IAsyncDisposable"
        ));
        assert!(text.contains(
            "public global::Microsoft.AspNetCore.SignalR.Client.HubConnection HubConnection { get; set; }"
        ));
        assert!(text.contains(
            "private readonly global::System.Collections.Generic.ICollection<global::System.IDisposable> ClientCallbackHandlers = new global::System.Collections.Generic.List<global::System.IDisposable>();"
        ));
        assert!(text.contains("public bool IsInitialized { get; private set; }"));
        assert!(text.contains(
            "public static global::Chat.Client.ChatHubProxy Create(global::Microsoft.AspNetCore.SignalR.Client.HubConnection hubConnection)"
        ));
        assert!(text.contains("throw new global::System.ArgumentNullException(\"hubConnection\");"));
        assert!(text.contains(
            "public global::System.Threading.Tasks.Task StartAsync(global::System.Threading.CancellationToken cancellationToken = default)"
        ));
        assert!(text.contains("return HubConnection.StopAsync(cancellationToken);"));
        assert!(text.contains("public async global::System.Threading.Tasks.ValueTask DisposeAsync()"));
        assert!(text.contains("await HubConnection.DisposeAsync();"));
        assert!(text.contains("private void BindClientCallbacks()"));
    }

    #[test]
    fn test_end_init_binds_once() {
        let symbols = SymbolTable::platform();
        let contract = RuntimeContract::resolve(&TypeMapper::new(&symbols)).unwrap();
        let text = render(&contract, Vec::new());

        let expected = "        public void EndInit()
        {
            if (HubConnection == null)
            {
                throw new global::System.InvalidOperationException(\"The \\\"HubConnection\\\" property must be specified during the initialization process.\");
            }
            if (!IsInitialized)
            {
                BindClientCallbacks();
                IsInitialized = true;
            }
        }
";
        assert!(text.contains(expected), "{}", text);
        assert_eq!(text.matches("BindClientCallbacks();").count(), 1);
    }

    #[test]
    fn test_delegates() {
        let symbols = SymbolTable::platform();
        let contract = RuntimeContract::resolve(&TypeMapper::new(&symbols)).unwrap();

        let action = contract.delegate(DelegateShape::Action, Vec::new()).unwrap();
        assert_eq!(action.to_string(), "global::System.Action");

        let func = contract
            .delegate(
                DelegateShape::FuncOf(2),
                vec![contract.string.clone(), contract.task.clone()],
            )
            .unwrap();
        assert_eq!(
            func.to_string(),
            "global::System.Func<string, global::System.Threading.Tasks.Task>"
        );

        assert!(contract.delegate(DelegateShape::FuncOf(2), Vec::new()).is_err());
        assert!(contract.delegate(DelegateShape::FuncOf(40), Vec::new()).is_err());
    }

    #[test]
    fn test_registration_statement() {
        let symbols = SymbolTable::platform();
        let contract = RuntimeContract::resolve(&TypeMapper::new(&symbols)).unwrap();

        let forwarder = Expr::Lambda {
            params: vec!["args".to_string(), "state".to_string()],
            body: Box::new(Expr::ident("OnPing").invoke(Vec::new())),
        };
        let text = render(&contract, vec![contract.register_callback("Ping", Vec::new(), forwarder)]);
        assert!(text.contains(
            "ClientCallbackHandlers.Add(HubConnection.On(\"Ping\", new global::System.Type[0], (args, state) => OnPing(), null));"
        ));
    }
}
