//! Boundary to the collaborator that loads hub assemblies into a type universe.
//!
//! Reading PE files is not part of generation itself. A host pipeline hands every request to a
//! [`UniverseLoader`], which returns an isolated [`TypeUniverse`] for that request only. This
//! module also computes the [`LoadPlan`]: the hub assembly plus every reference assembly a
//! loader should make resolvable, in a deterministic order.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hubscope::prelude::*;
//!
//! let loader = StaticUniverseLoader::new();
//! loader.register("Chat.Server.dll", Arc::new(TypeRegistry::new()));
//!
//! let universe = loader.load(&GenerationRequest::new("Chat.Server.dll"))?;
//! assert!(universe.defined_types().is_empty());
//! # Ok::<(), hubscope::Error>(())
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{generator::GenerationRequest, metadata::typesystem::TypeUniverse, Result};

/// File extension of loadable assemblies
const ASSEMBLY_EXTENSION: &str = "dll";

/// Produces the type universe a generation request is analyzed against.
///
/// Each call must return a universe that is not shared with any other request.
pub trait UniverseLoader: Send + Sync {
    /// Load the hub assembly of `request` together with its references
    ///
    /// # Errors
    /// Returns an error if the hub assembly cannot be located or loaded.
    fn load(&self, request: &GenerationRequest) -> Result<Arc<dyn TypeUniverse>>;
}

/// A loader serving universes prepared in memory, keyed by hub assembly path.
///
/// Used by hosts that reflect assemblies through other means, and by tests.
#[derive(Default)]
pub struct StaticUniverseLoader {
    universes: DashMap<PathBuf, Arc<dyn TypeUniverse>>,
}

impl StaticUniverseLoader {
    /// Create an empty loader
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the universe returned for `hub_assembly_path`
    pub fn register(&self, hub_assembly_path: impl Into<PathBuf>, universe: Arc<dyn TypeUniverse>) {
        self.universes.insert(hub_assembly_path.into(), universe);
    }

    /// Number of registered universes
    #[must_use]
    pub fn len(&self) -> usize {
        self.universes.len()
    }

    /// Returns true if no universe is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.universes.is_empty()
    }
}

impl UniverseLoader for StaticUniverseLoader {
    fn load(&self, request: &GenerationRequest) -> Result<Arc<dyn TypeUniverse>> {
        match self.universes.get(&request.hub_assembly_path) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(configuration_error!(
                "Hub assembly '{}' could not be loaded",
                request.hub_assembly_path.display()
            )),
        }
    }
}

/// The assemblies a loader needs for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// The assembly containing the hubs
    pub hub_assembly: PathBuf,
    /// Reference assemblies, sorted by path, at most one per file name
    pub references: Vec<PathBuf>,
}

impl LoadPlan {
    /// Compute the load plan of a request.
    ///
    /// Collects every `*.dll` below the hub assemblies directory and below each additional
    /// search directory. Files named in the exclusion list are skipped (case-insensitive), as is
    /// any file sharing the hub assemblies file name. When several directories contain the same
    /// file name, the first path in sorted order wins.
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if the hub assembly does not exist, or
    /// [`crate::Error::FileError`] if a directory cannot be read.
    pub fn resolve(request: &GenerationRequest) -> Result<LoadPlan> {
        let hub_assembly = request.hub_assembly_path.clone();
        if !hub_assembly.is_file() {
            return Err(configuration_error!(
                "Hub assembly '{}' does not exist",
                hub_assembly.display()
            ));
        }

        let excluded: HashSet<String> = request
            .excluded_file_names
            .iter()
            .map(|name| name.to_lowercase())
            .collect();

        let mut candidates = Vec::new();
        if let Some(directory) = hub_assembly.parent() {
            let directory = if directory.as_os_str().is_empty() {
                Path::new(".")
            } else {
                directory
            };
            collect_assemblies(directory, &mut candidates)?;
        }
        for directory in &request.additional_search_directories {
            collect_assemblies(directory, &mut candidates)?;
        }
        candidates.sort();

        let mut seen = HashSet::new();
        if let Some(name) = file_key(&hub_assembly) {
            seen.insert(name);
        }

        let references = candidates
            .into_iter()
            .filter(|path| match file_key(path) {
                Some(name) => !excluded.contains(&name) && seen.insert(name),
                None => false,
            })
            .collect();

        Ok(LoadPlan {
            hub_assembly,
            references,
        })
    }

    /// Hub assembly followed by all references
    pub fn assemblies(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.hub_assembly.as_path()).chain(self.references.iter().map(PathBuf::as_path))
    }
}

fn file_key(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

fn collect_assemblies(directory: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    if !directory.is_dir() {
        log::debug!(
            "Skipping missing search directory '{}'",
            directory.display()
        );
        return Ok(());
    }

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_assemblies(&path, found)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ASSEMBLY_EXTENSION))
        {
            found.push(path);
        }
    }

    Ok(())
}
