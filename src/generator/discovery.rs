//! Hub discovery and client-interface resolution.
//!
//! A type is a hub when walking its base chain reaches the hub marker by canonical name. Abstract
//! types and open generic definitions cannot back a concrete proxy and are rejected. A hub's
//! client interface is the type argument of the first ancestor instantiating the generic marker.

use crate::{
    metadata::typesystem::{TypeRc, TypeUniverse},
    Result,
};

/// Canonical name of the root hub marker
pub const HUB_MARKER: &str = "Microsoft.AspNetCore.SignalR.Hub";
/// Canonical name of the open hub-with-client marker
pub const HUB_WITH_CLIENT_MARKER: &str = "Microsoft.AspNetCore.SignalR.Hub`1";

/// A concrete hub type together with its base chain up to the marker
#[derive(Debug, Clone)]
pub struct HubCandidate {
    /// The hub type
    pub hub: TypeRc,
    /// Ancestors, nearest first; the last element is always the marker
    pub chain: Vec<TypeRc>,
    /// Ancestors of the marker itself (e.g. `System.Object`)
    pub marker_bases: Vec<TypeRc>,
}

impl HubCandidate {
    /// The marker type ending the chain
    #[must_use]
    pub fn marker(&self) -> Option<&TypeRc> {
        self.chain.last()
    }

    /// Simple name of the hub, as used for the proxy class name
    #[must_use]
    pub fn simple_name(&self) -> &str {
        match self.hub.name.rsplit_once('+') {
            Some((_, inner)) => inner,
            None => &self.hub.name,
        }
    }

    /// Canonical name of the hub, used in diagnostics and errors
    #[must_use]
    pub fn hub_name(&self) -> String {
        self.hub.identity_name()
    }

    /// Types whose members are infrastructure rather than hub surface: the marker, everything
    /// it derives from, and every instantiation of the generic marker in the chain.
    #[must_use]
    pub fn infrastructure(&self) -> Vec<&TypeRc> {
        let generic_markers = self.chain.iter().filter(|ancestor| is_generic_marker(ancestor));
        generic_markers
            .chain(self.marker())
            .chain(self.marker_bases.iter())
            .collect()
    }
}

fn is_generic_marker(descriptor: &TypeRc) -> bool {
    descriptor.is_generic_instance()
        && descriptor
            .generic_definition()
            .is_some_and(|definition| definition.fullname() == HUB_WITH_CLIENT_MARKER)
}

/// Check one type against the hub marker, returning its candidate if it is a concrete hub
///
/// # Errors
/// Returns [`crate::Error::RecursionLimit`] if the base chain is broken.
pub fn hub_candidate(descriptor: &TypeRc) -> Result<Option<HubCandidate>> {
    let bases = descriptor.base_chain()?;
    let Some(position) = bases
        .iter()
        .position(|ancestor| ancestor.canonical_name().as_deref() == Some(HUB_MARKER))
    else {
        return Ok(None);
    };

    if descriptor.is_abstract() {
        log::debug!(
            "Skipping abstract hub {}",
            descriptor.identity_name()
        );
        return Ok(None);
    }
    if descriptor.is_generic_definition() {
        log::debug!(
            "Skipping open generic hub {}",
            descriptor.identity_name()
        );
        return Ok(None);
    }

    let mut chain = bases;
    let marker_bases = chain.split_off(position + 1);
    Ok(Some(HubCandidate {
        hub: descriptor.clone(),
        chain,
        marker_bases,
    }))
}

/// Enumerate all concrete hubs of a universe, in declaration order
///
/// # Errors
/// Returns [`crate::Error::RecursionLimit`] if a base chain is broken.
pub fn discover_hubs(universe: &dyn TypeUniverse) -> Result<Vec<HubCandidate>> {
    let mut hubs = Vec::new();
    for descriptor in universe.defined_types() {
        if let Some(candidate) = hub_candidate(&descriptor)? {
            hubs.push(candidate);
        }
    }
    Ok(hubs)
}

/// Resolve the client interface from the first instantiation of the generic marker
#[must_use]
pub fn resolve_client_interface(candidate: &HubCandidate) -> Option<TypeRc> {
    candidate
        .chain
        .iter()
        .find(|ancestor| is_generic_marker(ancestor))
        .and_then(|marker| marker.generic_args.first().cloned())
}
