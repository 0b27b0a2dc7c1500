//! Immutable scanner registry.
//!
//! Every `with_*` call returns a new registry; the receiver never changes,
//! so a registry shared between threads is never observed mid-update.
//! Tier maps are `Arc`-shared and copied only when a builder call touches them.

use std::fmt;
use std::sync::{Arc, OnceLock};

use callkit_core::errors::ScanError;
use callkit_core::types::FxHashMap;
use callkit_core::{Capability, Kind, TypeDescriptor, Value};

use super::coerce::default_scan;

/// A coercion function. Receives the registry so it can recurse into
/// element and inner types.
pub type Scanner =
    Arc<dyn Fn(&str, &TypeDescriptor, &ScannerRegistry) -> Result<Value, ScanError> + Send + Sync>;

#[derive(Clone)]
pub struct ScannerRegistry {
    exact: Arc<FxHashMap<TypeDescriptor, Scanner>>,
    capabilities: Arc<Vec<(Capability, Scanner)>>,
    kinds: Arc<FxHashMap<Kind, Scanner>>,
    default: Option<Scanner>,
}

impl ScannerRegistry {
    /// A registry with no entries and no default scanner.
    pub fn empty() -> Self {
        Self {
            exact: Arc::new(FxHashMap::default()),
            capabilities: Arc::new(Vec::new()),
            kinds: Arc::new(FxHashMap::default()),
            default: None,
        }
    }

    /// The standard registry: the default scanner plus the text-parse
    /// capability entry that calls an opaque type's own parse hook.
    pub fn new() -> Self {
        Self::empty()
            .with_default(default_scan)
            .with_capability(Capability::TextParse, parse_hook_scan)
    }

    pub fn with_exact<F>(&self, ty: TypeDescriptor, scanner: F) -> Self
    where
        F: Fn(&str, &TypeDescriptor, &ScannerRegistry) -> Result<Value, ScanError>
            + Send
            + Sync
            + 'static,
    {
        let mut exact = (*self.exact).clone();
        exact.insert(ty, Arc::new(scanner));
        Self {
            exact: Arc::new(exact),
            ..self.clone()
        }
    }

    /// Append a capability entry. Capability entries are tried in registration order.
    pub fn with_capability<F>(&self, capability: Capability, scanner: F) -> Self
    where
        F: Fn(&str, &TypeDescriptor, &ScannerRegistry) -> Result<Value, ScanError>
            + Send
            + Sync
            + 'static,
    {
        let mut capabilities = (*self.capabilities).clone();
        capabilities.push((capability, Arc::new(scanner)));
        Self {
            capabilities: Arc::new(capabilities),
            ..self.clone()
        }
    }

    pub fn with_kind<F>(&self, kind: Kind, scanner: F) -> Self
    where
        F: Fn(&str, &TypeDescriptor, &ScannerRegistry) -> Result<Value, ScanError>
            + Send
            + Sync
            + 'static,
    {
        let mut kinds = (*self.kinds).clone();
        kinds.insert(kind, Arc::new(scanner));
        Self {
            kinds: Arc::new(kinds),
            ..self.clone()
        }
    }

    pub fn with_default<F>(&self, scanner: F) -> Self
    where
        F: Fn(&str, &TypeDescriptor, &ScannerRegistry) -> Result<Value, ScanError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            default: Some(Arc::new(scanner)),
            ..self.clone()
        }
    }

    pub fn exact(&self, ty: &TypeDescriptor) -> Option<&Scanner> {
        self.exact.get(ty)
    }

    /// Capability entries the target exposes, in registration order.
    pub fn capabilities_for<'a>(
        &'a self,
        ty: &'a TypeDescriptor,
    ) -> impl Iterator<Item = (Capability, &'a Scanner)> + 'a {
        self.capabilities
            .iter()
            .filter(move |(capability, _)| ty.has_capability(*capability))
            .map(|(capability, scanner)| (*capability, scanner))
    }

    pub fn kind(&self, kind: Kind) -> Option<&Scanner> {
        self.kinds.get(&kind)
    }

    pub fn default_scanner(&self) -> Option<&Scanner> {
        self.default.as_ref()
    }

    /// Coerce `text` into `target` with this registry.
    pub fn coerce(&self, text: &str, target: &TypeDescriptor) -> Result<Value, ScanError> {
        super::coerce::coerce(text, target, self)
    }
}

impl Default for ScannerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScannerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerRegistry")
            .field("exact", &self.exact.keys().map(ToString::to_string).collect::<Vec<_>>())
            .field(
                "capabilities",
                &self.capabilities.iter().map(|(c, _)| c.name()).collect::<Vec<_>>(),
            )
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// The process-wide standard registry.
pub fn standard_registry() -> &'static ScannerRegistry {
    static STANDARD: OnceLock<ScannerRegistry> = OnceLock::new();
    STANDARD.get_or_init(ScannerRegistry::new)
}

/// Capability scanner: defer to the opaque type's parse hook.
fn parse_hook_scan(
    text: &str,
    target: &TypeDescriptor,
    _registry: &ScannerRegistry,
) -> Result<Value, ScanError> {
    match target {
        TypeDescriptor::Opaque(opaque) => match opaque.parser() {
            Some(parse) => parse(text).map_err(|cause| ScanError::invalid(text, target, cause)),
            None => Err(ScanError::type_not_supported(target)),
        },
        _ => Err(ScanError::type_not_supported(target)),
    }
}
