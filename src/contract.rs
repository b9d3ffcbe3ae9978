//! # contract: collaborator interfaces for the projection pipeline
//!
//! This module defines the two seams the projection core depends on and the
//! raw record types that cross them:
//!
//! - [`ContentClient`]: read-only access to the CMS (content type
//!   definitions and content items). Implemented by the Delivery API client
//!   and by test mocks.
//! - [`GraphHost`]: the build system's node store — schema registration,
//!   node creation, and the delegated identity/fingerprint generators.
//!
//! All async methods return boxed error trait objects; retries, rate limits
//! and pagination are the implementor's concern, never the core's. Both
//! traits are annotated for `mockall` so tests can script deterministic
//! collaborators.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaBatch;
use crate::value::{ElementKind, ElementValue};

/// Boxed error used across collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// System record of a content type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSystem {
    pub codename: String,
}

/// One element definition within a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    pub codename: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
}

/// A content type definition as fetched from the CMS. Read-only; fetched
/// once per run and used only to emit schema types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeDef {
    pub system: TypeSystem,
    pub elements: Vec<ElementDef>,
}

/// System record of a content item. `type_codename` and `id` together are
/// the item's stable identity; both are required for node identity and
/// their absence is fatal for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSystem {
    pub id: String,
    pub name: String,
    pub codename: String,
    pub language: String,
    #[serde(rename = "type")]
    pub type_codename: String,
    #[serde(rename = "lastModified", alias = "last_modified", default)]
    pub last_modified: Option<String>,
}

/// A content item as fetched from the CMS: system record plus the raw,
/// still-untyped element properties keyed by element codename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub system: ItemSystem,
    #[serde(default)]
    pub elements: BTreeMap<String, Value>,
}

/// Result of one items fetch: the root result set plus every item reachable
/// from a root item via modular content or rich text embeds. Linked items
/// are first-class items, not inlined copies.
#[derive(Debug, Clone, Default)]
pub struct ItemsResponse {
    pub items: Vec<RawItem>,
    pub linked_items: Vec<RawItem>,
}

/// The node handed to the host store: normalized system + elements, the
/// generated identity, and the internal descriptor the host uses for
/// typing and change detection. Created once per unique item per run and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedNode {
    pub system: ItemSystem,
    pub elements: BTreeMap<String, ElementValue>,
    pub id: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub internal: NodeInternal,
}

/// Host-facing node descriptor. `content_digest` is computed over
/// {system, elements} only, never over the generated id or type name, so
/// identical content fingerprints identically across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInternal {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    #[serde(rename = "contentDigest")]
    pub content_digest: String,
}

/// Read-only access to the CMS project. Both calls are independent network
/// reads and may be issued concurrently; neither retries.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch every content type definition in the project.
    async fn list_content_types(&self) -> Result<Vec<ContentTypeDef>, BoxError>;

    /// Fetch every content item plus the transitively linked items.
    async fn list_content_items(&self) -> Result<ItemsResponse, BoxError>;
}

/// The build system's node store and generator callbacks. The store is an
/// append-only sink: the core never reads back what it wrote.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait GraphHost: Send + Sync {
    /// Register the full schema batch. Must complete before any
    /// [`GraphHost::create_node`] call so emitted nodes validate against
    /// declared types. Additive only.
    async fn register_schema(&self, batch: SchemaBatch) -> Result<(), BoxError>;

    /// Append one projected node to the store.
    async fn create_node(&self, node: ProjectedNode) -> Result<(), BoxError>;

    /// Derive the opaque node id from a stable identity key.
    fn make_node_id(&self, identity_key: &str) -> String;

    /// Fingerprint canonical content for change detection.
    fn make_fingerprint(&self, content: &Value) -> String;
}

/// Why a projection run failed. There is no partial-success mode: the first
/// error aborts the run and nothing further is registered.
#[derive(Debug)]
pub enum ProjectError {
    /// An upstream fetch failed. Not retried here.
    Fetch(BoxError),
    /// An item is missing the identity fields node identity is derived
    /// from. Carries whatever raw identity was available.
    MalformedItem {
        codename: Option<String>,
        reason: String,
    },
    /// The host refused a schema registration or node creation.
    Host(BoxError),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Fetch(e) => write!(f, "upstream fetch failed: {e}"),
            ProjectError::MalformedItem { codename, reason } => match codename {
                Some(code) => write!(f, "malformed item '{code}': {reason}"),
                None => write!(f, "malformed item: {reason}"),
            },
            ProjectError::Host(e) => write!(f, "host operation failed: {e}"),
        }
    }
}

impl std::error::Error for ProjectError {}
