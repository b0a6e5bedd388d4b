//! Hub proxy generation.
//!
//! This module drives one [`GenerationRequest`] from a loaded type universe to one emitted
//! source unit. The pipeline is strictly ordered:
//!
//! 1. validate the request (eager, before any type is looked at)
//! 2. resolve the runtime contract in the target symbol space
//! 3. discover concrete hubs in declaration order
//! 4. synthesize every hub independently, in parallel
//! 5. assemble the classes in declaration order and render
//!
//! Any error in step 4 fails the whole request: the first failing hub in declaration order is
//! reported and nothing is emitted. Independent requests never influence each other, see
//! [`HubProxyGenerator::run_requests`].
//!
//! # Key Components
//!
//! - [`HubProxyGenerator`] - Entry point
//! - [`GenerationRequest`] / [`ClientCallbackMode`] - Per-request configuration
//! - [`EmittedSource`] - The rendered unit together with its structure and diagnostics
//! - [`discovery`], [`filter`], [`proxy`], [`callbacks`], [`delegates`] - The individual stages
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hubscope::prelude::*;
//!
//! let universe = TypeRegistry::new();
//! let symbols = Arc::new(SymbolTable::platform());
//!
//! let generator = HubProxyGenerator::new(symbols);
//! let source = generator.generate(&GenerationRequest::new("Chat.Server.dll"), &universe)?;
//!
//! assert_eq!(source.hint_name, "HubProxy.cs");
//! assert!(source.unit.classes.is_empty());
//! # Ok::<(), hubscope::Error>(())
//! ```

pub mod callbacks;
pub mod delegates;
pub mod diagnostics;
pub mod discovery;
pub mod filter;
pub mod proxy;
mod request;

use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;

pub use diagnostics::{Diagnostic, Severity};
pub use request::{
    ClientCallbackMode, GenerationRequest, CORE_LIBRARY_FILE_NAME, DEFAULT_TYPE_NAME_FORMAT,
};

use crate::{
    codegen::{
        contract::RuntimeContract,
        mapper::{TypeMapper, TypeSyntax},
        symbols::{Symbol, SymbolResolver},
        syntax::{ClassDecl, CompilationUnit, Member, Modifiers},
        writer::CodeWriter,
    },
    generator::discovery::{discover_hubs, resolve_client_interface, HubCandidate},
    metadata::{
        loader::UniverseLoader,
        typesystem::{TypeRc, TypeUniverse},
    },
    Error::{Resolution, TypeError},
    Result,
};

/// The result of one successful generation request
#[derive(Debug, Clone)]
pub struct EmittedSource {
    /// File name hint for the host
    pub hint_name: String,
    /// Rendered source text
    pub text: String,
    /// The structure `text` was rendered from
    pub unit: CompilationUnit,
    /// Non-fatal findings, in hub declaration order
    pub diagnostics: Vec<Diagnostic>,
}

/// One synthesized proxy class and what was found while building it
struct SynthesizedHub {
    class: ClassDecl,
    diagnostics: Vec<Diagnostic>,
}

/// Generates strongly typed client proxies for the hubs of a type universe
pub struct HubProxyGenerator {
    symbols: Arc<dyn SymbolResolver>,
}

impl HubProxyGenerator {
    /// Create a generator emitting against the given target symbol space
    ///
    /// The symbol space must be fully populated; it is only read during generation.
    #[must_use]
    pub fn new(symbols: Arc<dyn SymbolResolver>) -> Self {
        HubProxyGenerator { symbols }
    }

    /// Generate the proxy unit for one request
    ///
    /// ## Arguments
    /// * 'request' - The configuration of this request
    /// * 'universe' - The reflected types of the hub assembly, owned by this request
    ///
    /// # Errors
    /// - [`crate::Error::Configuration`] if the request does not validate
    /// - [`crate::Error::Resolution`] if a platform type, the explicit client type or any type
    ///   used by a proxied member cannot be found
    /// - [`crate::Error::Arity`] if a client callback needs a delegate beyond the platform ceiling
    /// - [`crate::Error::TypeError`] if two generated members of one proxy would collide
    pub fn generate(
        &self,
        request: &GenerationRequest,
        universe: &dyn TypeUniverse,
    ) -> Result<EmittedSource> {
        request.validate()?;

        let mapper = TypeMapper::new(self.symbols.as_ref());
        let contract = RuntimeContract::resolve(&mapper)?;

        let explicit_client = match &request.explicit_client_type {
            Some(name) => Some(
                universe
                    .resolve(name)
                    .ok_or_else(|| Resolution { name: name.clone() })?,
            ),
            None => None,
        };

        let hubs = discover_hubs(universe)?;
        log::debug!(
            "{}: discovered {} hub(s)",
            request.source_name(),
            hubs.len()
        );

        let synthesizer = HubSynthesizer {
            request,
            contract: &contract,
            mapper: &mapper,
            explicit_client: explicit_client.as_ref(),
        };
        let results: Vec<Result<SynthesizedHub>> = hubs
            .par_iter()
            .map(|hub| synthesizer.synthesize(hub))
            .collect();

        let mut unit = CompilationUnit::new(request.root_namespace.clone());
        let mut diagnostics = Vec::new();
        for result in results {
            let hub = result?;
            diagnostics.extend(hub.diagnostics);
            unit.classes.push(hub.class);
        }

        let text = CodeWriter::render(&unit);
        log::info!(
            "{}: emitted {} with {} proxy class(es)",
            request.source_name(),
            unit.hint_name,
            unit.classes.len()
        );

        Ok(EmittedSource {
            hint_name: unit.hint_name.clone(),
            text,
            unit,
            diagnostics,
        })
    }

    /// Run independent requests concurrently.
    ///
    /// Every request gets its own universe from `loader`. Results are returned in request order;
    /// each failure is wrapped in [`crate::Error::Request`] naming the hub assembly path and
    /// never affects the other requests.
    pub fn run_requests(
        &self,
        loader: &dyn UniverseLoader,
        requests: &[GenerationRequest],
    ) -> Vec<Result<EmittedSource>> {
        requests
            .par_iter()
            .map(|request| {
                request
                    .validate()
                    .and_then(|()| loader.load(request))
                    .and_then(|universe| self.generate(request, universe.as_ref()))
                    .map_err(|error| {
                        log::warn!("{}: {}", request.source_name(), error);
                        error.in_request(request.source_name())
                    })
            })
            .collect()
    }
}

/// Read-only state shared by the per-hub synthesis tasks of one request
struct HubSynthesizer<'a> {
    request: &'a GenerationRequest,
    contract: &'a RuntimeContract,
    mapper: &'a TypeMapper<'a>,
    explicit_client: Option<&'a TypeRc>,
}

impl HubSynthesizer<'_> {
    fn synthesize(&self, hub: &HubCandidate) -> Result<SynthesizedHub> {
        let hub_name = hub.hub_name();
        let class_name = self.request.proxy_name(hub.simple_name())?;
        log::debug!("Synthesizing {} for {}", class_name, hub_name);

        let full_name = match &self.request.root_namespace {
            Some(namespace) => format!("{}.{}", namespace, class_name),
            None => class_name.clone(),
        };
        let proxy_type = TypeSyntax::Named(Arc::new(Symbol::from_metadata_name(&full_name)));

        let mut members = self.contract.lifecycle_members(&proxy_type);

        for method in filter::proxy_methods(hub)? {
            if let Some(decl) = proxy::synthesize(self.contract, self.mapper, &method)? {
                members.push(Member::Method(decl));
            }
        }

        let mut diagnostics = Vec::new();
        let mut registrations = Vec::new();
        let mode = self.request.client_callback_mode;
        if mode != ClientCallbackMode::None {
            let client = self
                .explicit_client
                .cloned()
                .or_else(|| resolve_client_interface(hub));

            match client {
                Some(client) => {
                    let selection = filter::callback_methods(&hub_name, &client);
                    diagnostics = selection.diagnostics;
                    for method in &selection.methods {
                        if let Some(binding) =
                            callbacks::synthesize(self.contract, self.mapper, mode, &hub_name, method)?
                        {
                            members.extend(binding.members);
                            registrations.push(binding.registration);
                        }
                    }
                }
                None => log::debug!("{} has no client interface", hub_name),
            }
        }

        members.push(self.contract.bind_callbacks_method(registrations));
        check_member_collisions(&class_name, &members)?;

        Ok(SynthesizedHub {
            class: ClassDecl {
                doc: Some(format!(
                    "Strongly typed client proxy for the <c>{}</c> hub.",
                    hub_name
                )),
                modifiers: Modifiers::PUBLIC | Modifiers::PARTIAL,
                name: class_name,
                bases: self.contract.interfaces(),
                members,
            },
            diagnostics,
        })
    }
}

/// Fail if two members share a name, unless they are method overloads with distinct parameters
fn check_member_collisions(class_name: &str, members: &[Member]) -> Result<()> {
    let mut seen: HashMap<&str, Vec<Option<Vec<String>>>> = HashMap::new();

    for member in members {
        let signature = match member {
            Member::Method(method) => Some(
                method
                    .params
                    .iter()
                    .map(|param| param.param_type.to_string())
                    .collect::<Vec<_>>(),
            ),
            Member::Field { .. } | Member::Property { .. } => None,
        };

        let previous = seen.entry(member.name()).or_default();
        let collides = previous.iter().any(|existing| match (existing, &signature) {
            (Some(existing), Some(signature)) => existing == signature,
            _ => true,
        });
        if collides {
            return Err(TypeError(format!(
                "The generated proxy {} would declare the member {} twice",
                class_name,
                member.name()
            )));
        }
        previous.push(signature);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        codegen::symbols::SymbolTable,
        metadata::typesystem::{MethodBuilder, PrimitiveKind, TypeBuilder},
        test::{primitive, RegistryFixture},
        Error,
    };

    use super::*;

    fn generator(fixture: &RegistryFixture) -> HubProxyGenerator {
        let symbols = SymbolTable::platform();
        symbols.import_universe(fixture.registry());
        HubProxyGenerator::new(Arc::new(symbols))
    }

    #[test]
    fn test_empty_universe() {
        let fixture = RegistryFixture::new();
        let source = generator(&fixture)
            .generate(&GenerationRequest::new("Empty.dll"), fixture.registry())
            .unwrap();

        assert!(source.unit.classes.is_empty());
        assert!(source.diagnostics.is_empty());
        assert!(source.text.starts_with("// <auto-generated>"));
    }

    #[test]
    fn test_invalid_request_fails_before_analysis() {
        let fixture = RegistryFixture::new();
        let request = GenerationRequest::new("Chat.dll").with_type_name_format("Proxy");
        assert!(matches!(
            generator(&fixture).generate(&request, fixture.registry()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_explicit_client() {
        let fixture = RegistryFixture::new();
        let request =
            GenerationRequest::new("Chat.dll").with_explicit_client_type("Chat.IMissingClient");
        assert!(matches!(
            generator(&fixture).generate(&request, fixture.registry()),
            Err(Error::Resolution { name }) if name == "Chat.IMissingClient"
        ));
    }

    #[test]
    fn test_member_order() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        let string = primitive(PrimitiveKind::String);
        let client = fixture.interface(
            "Chat.Shared",
            "IChatClient",
            vec![("ReceiveMessage", vec![("message", string.clone())], task.clone())],
        );
        fixture.class(
            "Chat",
            "ChatHub",
            Some(fixture.closed_generic_hub(&client)),
            vec![("SendMessage", vec![("message", string)], task)],
        );

        let source = generator(&fixture)
            .generate(&GenerationRequest::new("Chat.dll"), fixture.registry())
            .unwrap();
        let class = &source.unit.classes[0];
        let names: Vec<&str> = class.members.iter().map(Member::name).collect();
        assert_eq!(
            names,
            vec![
                "HubConnection",
                "ClientCallbackHandlers",
                "IsInitialized",
                "Create",
                "BeginInit",
                "EndInit",
                "StartAsync",
                "StopAsync",
                "DisposeAsync",
                "SendMessage",
                "ReceiveMessage",
                "OnReceiveMessage",
                "BindClientCallbacks",
            ]
        );
    }

    #[test]
    fn test_member_collision() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        TypeBuilder::new(fixture.registry())
            .class("Chat", "ChatHub")
            .extends(&fixture.hub())
            .method(MethodBuilder::new("StartAsync").returns(&task))
            .build()
            .unwrap();

        let result =
            generator(&fixture).generate(&GenerationRequest::new("Chat.dll"), fixture.registry());
        assert!(matches!(result, Err(Error::TypeError(message)) if message.contains("StartAsync")));
    }

    #[test]
    fn test_overloads_allowed() {
        let fixture = RegistryFixture::new();
        let task = fixture.task();
        let string = primitive(PrimitiveKind::String);
        let int = primitive(PrimitiveKind::I4);
        fixture.class(
            "Chat",
            "ChatHub",
            Some(fixture.hub()),
            vec![
                ("Send", vec![("text", string)], task.clone()),
                ("Send", vec![("code", int)], task),
            ],
        );

        let source = generator(&fixture)
            .generate(&GenerationRequest::new("Chat.dll"), fixture.registry())
            .unwrap();
        assert_eq!(source.text.matches("public async global::System.Threading.Tasks.Task Send(").count(), 2);
    }
}
