//! Client-callback binding synthesis.
//!
//! Each bound client method produces up to three artifacts: a user-assignable slot (event or
//! delegate field, depending on [`ClientCallbackMode`]), a protected raiser `On<Name>` and one
//! registration statement for `BindClientCallbacks()`. The registration forwards the untyped
//! argument array of the connection to the raiser, casting each element positionally:
//!
//! ```text
//! ClientCallbackHandlers.Add(HubConnection.On("ReceiveMessage", new Type[] { typeof(string) },
//!     (args, state) => OnReceiveMessage((string)args[0]), null));
//! ```

use crate::{
    codegen::{
        contract::RuntimeContract,
        mapper::{TypeMapper, TypeSyntax},
        syntax::{Block, Expr, Member, MethodDecl, Modifiers, ParamDecl, Stmt},
    },
    generator::{
        delegates::DelegateShape,
        proxy::{escape_identifier, parameter_names},
        request::ClientCallbackMode,
    },
    metadata::method::MethodDescriptor,
    Result,
};

/// Parameters of the forwarding lambda passed to `HubConnection.On`
const FORWARDER_PARAMETERS: [&str; 2] = ["args", "state"];

/// Members and registration produced for one client method
#[derive(Debug, Clone)]
pub struct CallbackBinding {
    /// Slot and raiser, in emission order
    pub members: Vec<Member>,
    /// The statement registering the raiser with the connection
    pub registration: Stmt,
}

/// Name of the raiser method for a client method
#[must_use]
pub fn raiser_name(method: &str) -> String {
    format!("On{}", method)
}

/// Synthesize the binding of one client method
///
/// Returns `None` in [`ClientCallbackMode::None`].
///
/// # Errors
/// Returns [`crate::Error::Arity`] naming `hub` and the method when the slot would need a
/// delegate beyond the platform ceiling, or [`crate::Error::Resolution`] if a parameter type
/// has no equivalent in the target symbol space.
pub fn synthesize(
    contract: &RuntimeContract,
    mapper: &TypeMapper<'_>,
    mode: ClientCallbackMode,
    hub: &str,
    method: &MethodDescriptor,
) -> Result<Option<CallbackBinding>> {
    if mode == ClientCallbackMode::None {
        return Ok(None);
    }

    let mut param_types = Vec::with_capacity(method.params.len());
    for param in &method.params {
        param_types.push(mapper.map(&param.param_type)?);
    }
    let names = parameter_names(&method.params, &[]);
    let params: Vec<ParamDecl> = param_types
        .iter()
        .zip(&names)
        .map(|(param_type, name)| ParamDecl::new(param_type.clone(), name.clone()))
        .collect();
    let args: Vec<Expr> = names.iter().map(Expr::ident).collect();

    let member = escape_identifier(&method.name);
    let slot = || Expr::ident(member.clone());
    let raiser = raiser_name(&method.name);

    let mut members = Vec::with_capacity(2);
    let raiser_body = match mode {
        ClientCallbackMode::Event | ClientCallbackMode::AsyncDelegate => {
            let shape = DelegateShape::select(param_types.len(), true)
                .map_err(|exceeded| exceeded.into_error(hub, &method.name))?;
            let mut delegate_args = param_types.clone();
            delegate_args.push(contract.task.clone());

            let event = mode == ClientCallbackMode::Event;
            members.push(Member::Field {
                attributes: if event {
                    vec![contract.non_serialized_field()]
                } else {
                    Vec::new()
                },
                modifiers: Modifiers::PUBLIC,
                event,
                field_type: contract.delegate(shape, delegate_args)?,
                name: member.clone(),
                initializer: None,
            });

            Some(Block(vec![Stmt::Return(Some(Expr::Conditional {
                condition: Box::new(slot().equals(Expr::Null)),
                then: Box::new(contract.completed_task()),
                otherwise: Box::new(slot().invoke(args)),
            }))]))
        }
        ClientCallbackMode::Delegate => {
            let shape = DelegateShape::select(param_types.len(), false)
                .map_err(|exceeded| exceeded.into_error(hub, &method.name))?;

            members.push(Member::Field {
                attributes: Vec::new(),
                modifiers: Modifiers::PUBLIC,
                event: false,
                field_type: contract.delegate(shape, param_types.clone())?,
                name: member.clone(),
                initializer: None,
            });

            Some(Block(vec![
                Stmt::If {
                    condition: slot().not_equals(Expr::Null),
                    then: Block(vec![slot().invoke(args).stmt()]),
                    otherwise: None,
                },
                Stmt::Return(Some(contract.completed_task())),
            ]))
        }
        ClientCallbackMode::PartialMethod | ClientCallbackMode::None => None,
    };

    let modifiers = if raiser_body.is_some() {
        Modifiers::PROTECTED
    } else {
        Modifiers::PROTECTED | Modifiers::PARTIAL
    };
    members.push(Member::Method(MethodDecl {
        doc: None,
        modifiers,
        return_type: contract.task.clone(),
        name: raiser.clone(),
        params,
        body: raiser_body,
    }));

    let registration = contract.register_callback(
        &method.name,
        param_types.clone(),
        forwarder(&raiser, param_types),
    );

    Ok(Some(CallbackBinding {
        members,
        registration,
    }))
}

/// `(args, state) => OnName((T0)args[0], (T1)args[1], ..)`
fn forwarder(raiser: &str, param_types: Vec<TypeSyntax>) -> Expr {
    let [values, state] = FORWARDER_PARAMETERS;
    let casts = param_types
        .into_iter()
        .enumerate()
        .map(|(index, param_type)| {
            Expr::ident(values)
                .index(Expr::Int(index as i64))
                .cast(param_type)
        })
        .collect();

    Expr::Lambda {
        params: vec![values.to_string(), state.to_string()],
        body: Box::new(Expr::ident(raiser).invoke(casts)),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codegen::{
            symbols::SymbolTable,
            syntax::{ClassDecl, CompilationUnit},
            writer::CodeWriter,
        },
        metadata::{method::MethodAccessFlags, typesystem::PrimitiveKind},
        test::{method, primitive, RegistryFixture},
        Error,
    };

    use super::*;

    fn render(mode: ClientCallbackMode, method: &MethodDescriptor) -> String {
        let symbols = SymbolTable::platform();
        let mapper = TypeMapper::new(&symbols);
        let contract = RuntimeContract::resolve(&mapper).unwrap();

        let binding = synthesize(&contract, &mapper, mode, "Chat.ChatHub", method)
            .unwrap()
            .unwrap();
        let mut members = binding.members;
        members.push(contract.bind_callbacks_method(vec![binding.registration]));

        let mut unit = CompilationUnit::new(None);
        unit.classes.push(ClassDecl {
            doc: None,
            modifiers: Modifiers::PUBLIC | Modifiers::PARTIAL,
            name: "ChatHubProxy".to_string(),
            bases: Vec::new(),
            members,
        });
        CodeWriter::render(&unit)
    }

    fn receive_message(fixture: &RegistryFixture) -> MethodDescriptor {
        let string = primitive(PrimitiveKind::String);
        method(
            "ReceiveMessage",
            &[("user", string.clone()), ("message", string)],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        )
    }

    #[test]
    fn test_event_mode() {
        let fixture = RegistryFixture::new();
        let text = render(ClientCallbackMode::Event, &receive_message(&fixture));

        assert!(text.contains("[field: global::System.NonSerializedAttribute]"), "{}", text);
        assert!(text.contains(
            "public event global::System.Func<string, string, global::System.Threading.Tasks.Task> ReceiveMessage;"
        ));
        assert!(text.contains(
            "protected global::System.Threading.Tasks.Task OnReceiveMessage(string user, string message)"
        ));
        assert!(text.contains(
            "return ReceiveMessage == null ? global::System.Threading.Tasks.Task.CompletedTask : ReceiveMessage(user, message);"
        ));
        assert!(text.contains(
            "ClientCallbackHandlers.Add(HubConnection.On(\"ReceiveMessage\", new global::System.Type[] { typeof(string), typeof(string) }, (args, state) => OnReceiveMessage((string)args[0], (string)args[1]), null));"
        ));
    }

    #[test]
    fn test_async_delegate_mode() {
        let fixture = RegistryFixture::new();
        let text = render(ClientCallbackMode::AsyncDelegate, &receive_message(&fixture));

        assert!(!text.contains("event "));
        assert!(!text.contains("NonSerialized"));
        assert!(text.contains(
            "public global::System.Func<string, string, global::System.Threading.Tasks.Task> ReceiveMessage;"
        ));
    }

    #[test]
    fn test_delegate_mode() {
        let fixture = RegistryFixture::new();
        let text = render(ClientCallbackMode::Delegate, &receive_message(&fixture));

        assert!(text.contains("public global::System.Action<string, string> ReceiveMessage;"));
        assert!(text.contains("if (ReceiveMessage != null)"));
        assert!(text.contains("ReceiveMessage(user, message);"));
        assert!(text.contains("return global::System.Threading.Tasks.Task.CompletedTask;"));
    }

    #[test]
    fn test_partial_method_mode() {
        let fixture = RegistryFixture::new();
        let text = render(ClientCallbackMode::PartialMethod, &receive_message(&fixture));

        assert!(text.contains(
            "protected partial global::System.Threading.Tasks.Task OnReceiveMessage(string user, string message);"
        ));
        assert!(!text.contains("public event"));
        assert!(text.contains("(args, state) => OnReceiveMessage("));
    }

    #[test]
    fn test_none_mode() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let mapper = TypeMapper::new(&symbols);
        let contract = RuntimeContract::resolve(&mapper).unwrap();

        let binding = synthesize(
            &contract,
            &mapper,
            ClientCallbackMode::None,
            "Chat.ChatHub",
            &receive_message(&fixture),
        )
        .unwrap();
        assert!(binding.is_none());
    }

    #[test]
    fn test_parameterless_callback() {
        let fixture = RegistryFixture::new();
        let ping = method("Ping", &[], fixture.task(), MethodAccessFlags::PUBLIC.bits());

        let text = render(ClientCallbackMode::Event, &ping);
        assert!(text.contains(
            "public event global::System.Func<global::System.Threading.Tasks.Task> Ping;"
        ));
        assert!(text.contains("new global::System.Type[0], (args, state) => OnPing(), null"));

        let text = render(ClientCallbackMode::Delegate, &ping);
        assert!(text.contains("public global::System.Action Ping;"));
    }

    #[test]
    fn test_keyword_callback_name() {
        let fixture = RegistryFixture::new();
        let lock = method(
            "lock",
            &[("object", primitive(PrimitiveKind::String))],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        );

        let text = render(ClientCallbackMode::Event, &lock);
        assert!(text.contains(
            "public event global::System.Func<string, global::System.Threading.Tasks.Task> @lock;"
        ), "{}", text);
        assert!(text.contains("protected global::System.Threading.Tasks.Task Onlock(string @object)"));
        assert!(text.contains(
            "return @lock == null ? global::System.Threading.Tasks.Task.CompletedTask : @lock(@object);"
        ));
        assert!(text.contains("HubConnection.On(\"lock\", "));

        let text = render(ClientCallbackMode::Delegate, &lock);
        assert!(text.contains("public global::System.Action<string> @lock;"));
        assert!(text.contains("if (@lock != null)"));
    }

    #[test]
    fn test_arity_ceiling() {
        let fixture = RegistryFixture::new();
        let symbols = SymbolTable::platform();
        let mapper = TypeMapper::new(&symbols);
        let contract = RuntimeContract::resolve(&mapper).unwrap();
        let int = primitive(PrimitiveKind::I4);

        let names: Vec<String> = (0..17).map(|i| format!("p{}", i)).collect();
        let params: Vec<(&str, _)> = names.iter().map(|n| (n.as_str(), int.clone())).collect();
        let wide = method("Broadcast", &params, fixture.task(), MethodAccessFlags::PUBLIC.bits());

        let result = synthesize(&contract, &mapper, ClientCallbackMode::Event, "Chat.WideHub", &wide);
        assert!(matches!(
            result,
            Err(Error::Arity { ref hub, ref method, arity: 18, max: 17 })
                if hub == "Chat.WideHub" && method == "Broadcast"
        ));

        let result = synthesize(&contract, &mapper, ClientCallbackMode::Delegate, "Chat.WideHub", &wide);
        assert!(matches!(result, Err(Error::Arity { arity: 17, max: 16, .. })));

        // No delegate is needed for a partial raiser
        let result = synthesize(&contract, &mapper, ClientCallbackMode::PartialMethod, "Chat.WideHub", &wide);
        assert!(result.is_ok());

        let sixteen = method(
            "Broadcast",
            &params[..16],
            fixture.task(),
            MethodAccessFlags::PUBLIC.bits(),
        );
        let result = synthesize(&contract, &mapper, ClientCallbackMode::Event, "Chat.WideHub", &sixteen);
        assert!(result.is_ok());
    }
}
