use crate::metadata::{
    method::{MethodDescriptor, MethodModifiers, ParamDescriptor},
    token::Token,
    typesystem::{MethodBuilder, PrimitiveKind, TypeBuilder, TypeRc, TypeRegistry},
};

/// Methods passed to the fixture builders: name, parameters, return type
pub type MethodSpec<'a> = (&'a str, Vec<(&'a str, TypeRc)>, TypeRc);

/// A registry pre-populated with the SignalR and task types hub analysis depends on
pub struct RegistryFixture {
    registry: TypeRegistry,
}

impl RegistryFixture {
    pub fn new() -> Self {
        let registry = TypeRegistry::new();
        let object = registry.get_primitive(PrimitiveKind::Object).unwrap();
        let void = registry.get_primitive(PrimitiveKind::Void).unwrap();

        let task = TypeBuilder::new(&registry)
            .class("System.Threading.Tasks", "Task")
            .referenced("System.Runtime")
            .build()
            .unwrap();
        TypeBuilder::new(&registry)
            .class("System.Threading.Tasks", "Task`1")
            .referenced("System.Runtime")
            .extends(&task)
            .generic_params(&["TResult"])
            .build()
            .unwrap();

        let hub = TypeBuilder::new(&registry)
            .class("Microsoft.AspNetCore.SignalR", "Hub")
            .referenced("Microsoft.AspNetCore.SignalR.Core")
            .abstract_type()
            .method(
                MethodBuilder::new("get_Context")
                    .returns(&object)
                    .modifiers(MethodModifiers::SPECIAL_NAME),
            )
            .method(MethodBuilder::new("OnConnectedAsync").returns(&task).virtual_method())
            .method(MethodBuilder::new("Dispose").returns(&void))
            .build()
            .unwrap();
        TypeBuilder::new(&registry)
            .class("Microsoft.AspNetCore.SignalR", "Hub`1")
            .referenced("Microsoft.AspNetCore.SignalR.Core")
            .extends(&hub)
            .abstract_type()
            .generic_params(&["T"])
            .method(
                MethodBuilder::new("get_Clients")
                    .returns(&object)
                    .modifiers(MethodModifiers::SPECIAL_NAME),
            )
            .build()
            .unwrap();

        RegistryFixture { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn named(&self, fullname: &str) -> TypeRc {
        self.registry.get_by_fullname(fullname).unwrap()
    }

    /// `Microsoft.AspNetCore.SignalR.Hub`
    pub fn hub(&self) -> TypeRc {
        self.named("Microsoft.AspNetCore.SignalR.Hub")
    }

    /// The open ``Microsoft.AspNetCore.SignalR.Hub`1``
    pub fn generic_hub(&self) -> TypeRc {
        self.named("Microsoft.AspNetCore.SignalR.Hub`1")
    }

    /// ``Hub`1`` closed over `client`
    pub fn closed_generic_hub(&self, client: &TypeRc) -> TypeRc {
        TypeBuilder::new(&self.registry)
            .instantiate(&self.generic_hub(), &[client.clone()])
            .build()
            .unwrap()
    }

    pub fn task(&self) -> TypeRc {
        self.named("System.Threading.Tasks.Task")
    }

    pub fn task_of(&self) -> TypeRc {
        self.named("System.Threading.Tasks.Task`1")
    }

    /// A public interface whose methods are all abstract
    pub fn interface(&self, namespace: &str, name: &str, methods: Vec<MethodSpec>) -> TypeRc {
        let mut builder = TypeBuilder::new(&self.registry).interface(namespace, name);
        for (method, params, returns) in methods {
            builder = builder.method(method_builder(method, &params, &returns).abstract_method());
        }
        builder.build().unwrap()
    }

    /// A public class with public instance methods
    pub fn class(
        &self,
        namespace: &str,
        name: &str,
        base: Option<TypeRc>,
        methods: Vec<MethodSpec>,
    ) -> TypeRc {
        let mut builder = TypeBuilder::new(&self.registry).class(namespace, name);
        if let Some(base) = &base {
            builder = builder.extends(base);
        }
        for (method, params, returns) in methods {
            builder = builder.method(method_builder(method, &params, &returns));
        }
        builder.build().unwrap()
    }
}

fn method_builder(name: &str, params: &[(&str, TypeRc)], returns: &TypeRc) -> MethodBuilder {
    params
        .iter()
        .fold(MethodBuilder::new(name), |builder, (param, param_type)| {
            builder.param(param, param_type)
        })
        .returns(returns)
}

/// A primitive type outside of any fixture; identity is by canonical name anyway
pub fn primitive(kind: PrimitiveKind) -> TypeRc {
    TypeRegistry::new().get_primitive(kind).unwrap()
}

/// A free-standing method descriptor declared on `Chat.ChatHub`
pub fn method(name: &str, params: &[(&str, TypeRc)], returns: TypeRc, flags: u32) -> MethodDescriptor {
    MethodDescriptor {
        token: Token::new(0x0600_0001),
        name: name.to_string(),
        declaring_type: "Chat.ChatHub".to_string(),
        params: params
            .iter()
            .map(|(param, param_type)| ParamDescriptor {
                name: (*param).to_string(),
                param_type: param_type.clone(),
            })
            .collect(),
        return_type: returns,
        flags,
    }
}
