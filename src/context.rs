//! Per-call server context: caller identity, transport metadata, and
//! protocol extension negotiation.
//!
//! Every dispatcher builds one [`ServerCallContext`] per incoming call and
//! shares it (via `Arc`) with the interceptor chain and the business
//! handler. Extension activation is the only mutable piece; it is
//! mutex-guarded so interceptors and the handler can both record
//! activations.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// HTTP header / gRPC metadata key carrying protocol extension URIs.
///
/// On requests it lists the extensions the caller wants; on responses it
/// lists the extensions the server actually activated.
pub const EXTENSIONS_HEADER: &str = "x-a2a-extensions";

/// An authenticated (or unauthenticated) caller identity.
pub trait User: Send + Sync {
    /// Whether the caller presented valid credentials.
    fn is_authenticated(&self) -> bool;

    /// A display name for the caller.
    fn user_name(&self) -> &str;
}

/// The identity used when no authentication is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnauthenticatedUser;

impl User for UnauthenticatedUser {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn user_name(&self) -> &str {
        "anonymous"
    }
}

/// Transport-neutral view of the incoming call's metadata.
///
/// Keys are lowercased; repeated keys keep the first value. Built from
/// HTTP headers or gRPC metadata by the dispatchers.
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    entries: HashMap<String, String>,
}

impl CallMetadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair. The key is lowercased.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .entry(key.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Look up a value by (case-insensitive) key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds a [`User`] from the incoming call's metadata.
///
/// Implement this to plug an authentication scheme into the dispatchers;
/// the default [`NoopUserBuilder`] yields [`UnauthenticatedUser`] for
/// every call.
pub trait UserBuilder: Send + Sync {
    /// Resolve the caller identity for one incoming call.
    fn build(&self, metadata: &CallMetadata) -> Arc<dyn User>;
}

/// Default builder: every caller is anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUserBuilder;

impl UserBuilder for NoopUserBuilder {
    fn build(&self, _metadata: &CallMetadata) -> Arc<dyn User> {
        Arc::new(UnauthenticatedUser)
    }
}

/// Per-call context shared between dispatcher, interceptors, and handler.
pub struct ServerCallContext {
    user: Arc<dyn User>,
    metadata: CallMetadata,
    requested_extensions: Vec<String>,
    activated_extensions: Mutex<BTreeSet<String>>,
}

impl ServerCallContext {
    /// Create a context for one incoming call.
    ///
    /// `requested_extensions` is the parsed value of the
    /// [`EXTENSIONS_HEADER`] request header, order-preserving.
    pub fn new(
        user: Arc<dyn User>,
        metadata: CallMetadata,
        requested_extensions: Vec<String>,
    ) -> Self {
        ServerCallContext {
            user,
            metadata,
            requested_extensions,
            activated_extensions: Mutex::new(BTreeSet::new()),
        }
    }

    /// Build a context from transport metadata using the given user builder,
    /// parsing the extension header along the way.
    pub fn from_metadata(metadata: CallMetadata, user_builder: &dyn UserBuilder) -> Arc<Self> {
        let requested = metadata
            .get(EXTENSIONS_HEADER)
            .map(parse_extensions_header)
            .unwrap_or_default();
        let user = user_builder.build(&metadata);
        Arc::new(Self::new(user, metadata, requested))
    }

    /// The caller identity.
    pub fn user(&self) -> &Arc<dyn User> {
        &self.user
    }

    /// The raw call metadata (lowercased header/metadata keys).
    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    /// Extension URIs the caller requested, in request order.
    pub fn requested_extensions(&self) -> &[String] {
        &self.requested_extensions
    }

    /// Whether the caller requested the given extension URI.
    pub fn is_extension_requested(&self, uri: &str) -> bool {
        self.requested_extensions.iter().any(|e| e == uri)
    }

    /// Record that the server honored an extension for this call.
    ///
    /// Activated extensions are echoed back to the caller in the
    /// response's [`EXTENSIONS_HEADER`].
    pub fn activate_extension(&self, uri: impl Into<String>) {
        if let Ok(mut set) = self.activated_extensions.lock() {
            set.insert(uri.into());
        }
    }

    /// The extensions activated so far, sorted.
    pub fn activated_extensions(&self) -> Vec<String> {
        self.activated_extensions
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for ServerCallContext {
    fn default() -> Self {
        Self::new(Arc::new(UnauthenticatedUser), CallMetadata::new(), Vec::new())
    }
}

impl std::fmt::Debug for ServerCallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCallContext")
            .field("user", &self.user.user_name())
            .field("requested_extensions", &self.requested_extensions)
            .field("activated_extensions", &self.activated_extensions())
            .finish()
    }
}

/// Parse a comma-separated extension header value into URIs,
/// trimming whitespace and dropping empty segments.
pub fn parse_extensions_header(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join activated extension URIs into a response header value.
pub fn format_extensions_header(extensions: &[String]) -> String {
    extensions.join(", ")
}
