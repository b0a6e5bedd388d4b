//! Method eligibility.
//!
//! Both filters follow the same rule shape: a member is part of the generated surface when it
//! was introduced by user code, not when it was inherited from the hub infrastructure.
//!
//! A hub method is proxied when it is public, instance, not special-named, not a constructor,
//! not abstract, is declared neither on the marker nor on anything the marker derives from nor
//! on an instantiation of the generic marker, and does not re-declare an infrastructure
//! signature (overrides such as `OnConnectedAsync`). Methods of user-defined intermediate base
//! classes are proxied.
//!
//! A client-interface method is bound when it is public, instance, not special-named, and
//! returns exactly `System.Threading.Tasks.Task`. Anything else is left out and reported.

use std::collections::HashSet;

use crate::{
    codegen::symbols::TASK,
    generator::{diagnostics::Diagnostic, discovery::HubCandidate},
    metadata::{method::MethodRc, typesystem::TypeRc},
    Result,
};

/// Client-interface methods selected for binding, with the findings about the rest
#[derive(Debug, Default)]
pub struct CallbackSelection {
    /// Methods to bind, in declaration order
    pub methods: Vec<MethodRc>,
    /// One warning per excluded method
    pub diagnostics: Vec<Diagnostic>,
}

/// Select the hub methods that get a proxy method
///
/// # Errors
/// Returns [`crate::Error::RecursionLimit`] if the hub's base chain is broken.
pub fn proxy_methods(candidate: &HubCandidate) -> Result<Vec<MethodRc>> {
    let mut infrastructure = HashSet::new();
    let mut infrastructure_signatures = HashSet::new();

    for ancestor in candidate.infrastructure() {
        infrastructure.insert(ancestor.identity_name());
        if let Some(definition) = ancestor.generic_definition() {
            infrastructure.insert(definition.identity_name());
        }
        for method in ancestor.declared_methods() {
            if !method.is_constructor() && !method.is_static() {
                infrastructure_signatures.insert(method.signature_hash());
            }
        }
    }

    let eligible = candidate
        .hub
        .all_methods()?
        .into_iter()
        .filter(|method| {
            method.is_public()
                && !method.is_static()
                && !method.is_special_name()
                && !method.is_constructor()
                && !method.is_abstract()
                && !infrastructure.contains(&method.declaring_type)
        })
        .filter(|method| {
            if infrastructure_signatures.contains(&method.signature_hash()) {
                log::debug!(
                    "{}: {} overrides a hub infrastructure method, not proxied",
                    candidate.hub_name(),
                    method.name
                );
                return false;
            }
            true
        })
        .collect();

    Ok(eligible)
}

/// Select the client-interface methods that get a callback binding
#[must_use]
pub fn callback_methods(hub: &str, client: &TypeRc) -> CallbackSelection {
    let mut selection = CallbackSelection::default();
    let client_name = client.identity_name();

    for method in client.declared_methods() {
        if !method.is_public() || method.is_static() || method.is_special_name() {
            continue;
        }

        let return_type = method.return_type.identity_name();
        if return_type == TASK {
            selection.methods.push(method.clone());
        } else {
            let diagnostic =
                Diagnostic::non_task_callback(hub, &client_name, &method.name, &return_type);
            log::warn!("{}", diagnostic);
            selection.diagnostics.push(diagnostic);
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use crate::{
        generator::discovery::hub_candidate,
        metadata::{
            method::MethodAccessFlags,
            typesystem::{MethodBuilder, PrimitiveKind, TypeBuilder},
        },
        test::{primitive, RegistryFixture},
    };

    use super::*;

    fn names(methods: &[MethodRc]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_infrastructure_methods_excluded() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        let string = primitive(PrimitiveKind::String);

        let hub = TypeBuilder::new(fixture.registry())
            .class("Chat", "ChatHub")
            .extends(&fixture.hub())
            .method(
                MethodBuilder::new("SendMessage")
                    .param("user", &string)
                    .param("message", &string)
                    .returns(&task),
            )
            .method(MethodBuilder::new("OnConnectedAsync").returns(&task).virtual_method())
            .method(MethodBuilder::new("Shared").returns(&task).static_method())
            .method(
                MethodBuilder::new("Internal")
                    .returns(&task)
                    .access(MethodAccessFlags::ASSEM),
            )
            .build()
            .unwrap();

        let candidate = hub_candidate(&hub).unwrap().unwrap();
        let methods = proxy_methods(&candidate).unwrap();
        assert_eq!(names(&methods), vec!["SendMessage"]);
    }

    #[test]
    fn test_intermediate_base_methods_included() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        let client = fixture.interface("Chat.Shared", "IChatClient", Vec::new());

        let base = fixture.class(
            "Chat",
            "ChatHubBase",
            Some(fixture.closed_generic_hub(&client)),
            vec![("Leave", vec![], task.clone())],
        );
        let hub = fixture.class(
            "Chat",
            "ChatHub",
            Some(base),
            vec![("Join", vec![], task)],
        );

        let candidate = hub_candidate(&hub).unwrap().unwrap();
        let methods = proxy_methods(&candidate).unwrap();
        assert_eq!(names(&methods), vec!["Join", "Leave"]);
        assert!(methods
            .iter()
            .all(|m| !m.declaring_type.starts_with("Microsoft.AspNetCore.SignalR")));
    }

    #[test]
    fn test_callback_selection_reports_non_task() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        let string = primitive(PrimitiveKind::String);
        let int = primitive(PrimitiveKind::I4);

        let client = fixture.interface(
            "Chat.Shared",
            "IChatClient",
            vec![
                ("ReceiveMessage", vec![("user", string.clone())], task),
                ("Count", vec![], int),
                ("Notify", vec![("text", string)], primitive(PrimitiveKind::Void)),
            ],
        );

        let selection = callback_methods("Chat.ChatHub", &client);
        assert_eq!(names(&selection.methods), vec!["ReceiveMessage"]);
        assert_eq!(selection.diagnostics.len(), 2);
        assert!(selection.diagnostics.iter().all(|d| d.code == "HPG001"));
        assert!(selection.diagnostics[0].message.contains("Chat.Shared.IChatClient.Count"));
        assert!(selection.diagnostics[1].message.contains("System.Void"));
    }

    #[test]
    fn test_task_of_callback_excluded() {
        let fixture = RegistryFixture::new();
        let task_of_int = TypeBuilder::new(fixture.registry())
            .instantiate(&fixture.task_of(), &[primitive(PrimitiveKind::I4)])
            .build()
            .unwrap();
        let client = fixture.interface(
            "Chat.Shared",
            "IQueryClient",
            vec![("Ask", vec![], task_of_int)],
        );

        let selection = callback_methods("Chat.QueryHub", &client);
        assert!(selection.methods.is_empty());
        assert_eq!(selection.diagnostics.len(), 1);
    }
}
