// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # hubscope
//!
//! Generates strongly typed client proxies for ASP.NET Core SignalR hubs from reflected .NET
//! metadata.
//!
//! Given the types of a compiled hub assembly, `hubscope` finds every concrete hub, works out
//! which of its methods form the RPC surface and which client interface it calls back into, and
//! synthesizes one C# source unit. Each generated proxy class exposes one awaitable method per
//! hub method and one subscribable slot per client callback, wired to a
//! `Microsoft.AspNetCore.SignalR.Client.HubConnection`.
//!
//! ## Features
//!
//! - **🔍 Hub discovery** - Base-chain walk to the hub marker, abstract and open generic hubs skipped
//! - **🧩 Client resolution** - From the first ``Hub`1`` instantiation, or an explicit override
//! - **⚡ Parallel synthesis** - Per hub and per request, with deterministic output order
//! - **🛡️ All-or-nothing requests** - A failing hub fails its request, never its neighbours
//! - **📊 Structural output** - The emitted syntax tree is available next to the rendered text
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hubscope::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! let hub = TypeBuilder::new(&registry)
//!     .class("Microsoft.AspNetCore.SignalR", "Hub")
//!     .referenced("Microsoft.AspNetCore.SignalR.Core")
//!     .abstract_type()
//!     .build()?;
//! let task = TypeBuilder::new(&registry)
//!     .class("System.Threading.Tasks", "Task")
//!     .referenced("System.Runtime")
//!     .build()?;
//! let string = registry.get_primitive(PrimitiveKind::String)?;
//!
//! TypeBuilder::new(&registry)
//!     .class("Chat", "ChatHub")
//!     .extends(&hub)
//!     .method(
//!         MethodBuilder::new("SendMessage")
//!             .param("user", &string)
//!             .param("message", &string)
//!             .returns(&task),
//!     )
//!     .build()?;
//!
//! let generator = HubProxyGenerator::new(Arc::new(SymbolTable::platform()));
//! let request = GenerationRequest::new("Chat.Server.dll").with_root_namespace("Chat.Client");
//! let source = generator.generate(&request, &registry)?;
//!
//! assert!(source.text.contains("public partial class ChatHubProxy"));
//! assert!(source.text.contains("SendMessage(string user, string message"));
//! # Ok::<(), hubscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - The reflected type system and the loader boundary
//! - [`codegen`] - Target symbol space, type mapping, syntax model, writer and runtime contract
//! - [`generator`] - Discovery, eligibility, synthesis and request orchestration
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! `hubscope` logs through the [`log`](https://docs.rs/log) facade and never installs a logger:
//! skipped members and per-hub progress at `debug`, each emitted unit at `info`, excluded client
//! methods and failed requests at `warn`.
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use hubscope::prelude::*;
///
/// let request = GenerationRequest::new("Chat.Server.dll")
///     .with_client_callback_mode(ClientCallbackMode::AsyncDelegate);
/// assert!(request.validate().is_ok());
/// ```
pub mod prelude;

/// Reflected .NET metadata consumed by the generator
///
/// # Key Components
///
/// - [`metadata::typesystem`] - Type descriptors, the type registry and builders
/// - [`metadata::method`] - Method descriptors and their attribute flags
/// - [`metadata::token`] - Identity of descriptors inside one universe
/// - [`metadata::loader`] - The boundary to whatever turns assemblies into a universe
pub mod metadata;

/// Synthesis of C# source text
pub mod codegen;

/// Hub analysis and proxy generation
pub mod generator;

/// `hubscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `hubscope` Error type
///
/// The main error type for all operations in this crate. Errors are always local to a single
/// generation request.
pub use error::Error;

pub use generator::{EmittedSource, GenerationRequest, HubProxyGenerator};
