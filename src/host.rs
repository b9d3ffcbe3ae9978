//! In-memory [`GraphHost`]: collects the schema batch and projected nodes
//! for CLI demo runs and integration tests.
//!
//! Identity and fingerprint generation live here so the core stays a pure
//! projection: node ids are namespaced sha256 over the identity key, and
//! fingerprints are sha256 over a key-canonicalized JSON rendering of the
//! content. Both are stable across runs for identical input, which is what
//! the host-side diffing relies on.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::contract::{BoxError, GraphHost, ProjectedNode};
use crate::schema::SchemaBatch;

#[derive(Default)]
struct HostState {
    schema: Option<SchemaBatch>,
    nodes: Vec<ProjectedNode>,
}

/// Append-only in-memory node store with local id/digest generators.
pub struct InMemoryHost {
    namespace: String,
    state: Mutex<HostState>,
}

/// Rewrites every object with its keys in sorted order, so equal content
/// renders to equal text no matter the insertion order it was built with.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(&String, &Value)> = object.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key.clone(), canonicalize(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

impl InMemoryHost {
    pub fn new(namespace: impl Into<String>) -> Self {
        InMemoryHost {
            namespace: namespace.into(),
            state: Mutex::new(HostState::default()),
        }
    }

    /// Read access that tolerates poisoning: the state is a plain data
    /// snapshot, valid even if a writer panicked mid-run.
    fn read_state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> Result<MutexGuard<'_, HostState>, BoxError> {
        self.state
            .lock()
            .map_err(|e| BoxError::from(format!("host state lock poisoned: {e}")))
    }

    /// The registered schema batch, if phase 1 has run.
    pub fn schema(&self) -> Option<SchemaBatch> {
        self.read_state().schema.clone()
    }

    /// Snapshot of every node created so far.
    pub fn nodes(&self) -> Vec<ProjectedNode> {
        self.read_state().nodes.clone()
    }

    pub fn node_count(&self) -> usize {
        self.read_state().nodes.len()
    }
}

#[async_trait]
impl GraphHost for InMemoryHost {
    async fn register_schema(&self, batch: SchemaBatch) -> Result<(), BoxError> {
        let mut state = self.write_state()?;
        if !state.nodes.is_empty() {
            return Err("schema must be registered before any node is created".into());
        }
        debug!(declarations = batch.decls.len(), "Registered schema batch");
        state.schema = Some(batch);
        Ok(())
    }

    async fn create_node(&self, node: ProjectedNode) -> Result<(), BoxError> {
        let mut state = self.write_state()?;
        if state.schema.is_none() {
            return Err("cannot create a node before schema registration".into());
        }
        debug!(node_id = %node.id, node_type = %node.internal.type_name, "Created node");
        state.nodes.push(node);
        Ok(())
    }

    fn make_node_id(&self, identity_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update(b">>");
        hasher.update(identity_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn make_fingerprint(&self, content: &Value) -> String {
        let text = canonicalize(content).to_string();
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}
