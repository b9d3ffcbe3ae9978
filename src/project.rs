//! High-level pipeline: fetch → project types → project items → emit nodes.
//!
//! This module orchestrates one projection run against a CMS project:
//!   - Fetches content type definitions and content items from the
//!     [`ContentClient`] (the two reads are independent and issued
//!     concurrently)
//!   - Phase 1: derives the graph schema and registers it with the
//!     [`GraphHost`]
//!   - Phase 2: deduplicates and normalizes every item and appends one node
//!     per unique item to the host store
//!   - Aggregates and returns a [`ProjectReport`] of what was registered
//!     and created.
//!
//! # Two-phase contract
//! Schema registration must complete before any node is created so emitted
//! nodes validate against declared types. [`project`] enforces the order;
//! callers driving [`project_types`] and [`project_items`] directly must
//! sequence them the same way.
//!
//! # Error Handling
//! Fail-fast, no partial success: the first fetch, malformed-item or host
//! error aborts the run and nothing further is registered. Retries are the
//! client implementor's concern, never this module's.

use futures::future::try_join;
use tracing::{debug, error, info};

use crate::contract::{
    ContentClient, ContentTypeDef, GraphHost, ItemsResponse, ProjectError,
};
use crate::items;
use crate::schema;

/// Output report of one projection run, for downstream audit.
#[derive(Debug)]
pub struct ProjectReport {
    pub types_registered: usize,
    pub nodes_created: usize,
    pub node_ids: Vec<String>,
}

/// Phase 1: derive the schema from content type definitions and register
/// it with the host in one batch.
pub async fn project_types<H>(defs: &[ContentTypeDef], host: &H) -> Result<usize, ProjectError>
where
    H: GraphHost,
{
    info!(
        content_types = defs.len(),
        "[PROJECT] Building schema batch"
    );
    let batch = schema::build_schema(defs);
    let declared = batch.decls.len();
    host.register_schema(batch).await.map_err(|e| {
        error!(error = ?e, "[PROJECT][ERROR] Schema registration failed");
        ProjectError::Host(e)
    })?;
    info!(declarations = declared, "[PROJECT] Schema registered");
    Ok(declared)
}

/// Phase 2: union, normalize and emit one node per unique item. Must only
/// run after [`project_types`] has returned success.
pub async fn project_items<H>(
    response: ItemsResponse,
    host: &H,
) -> Result<Vec<String>, ProjectError>
where
    H: GraphHost,
{
    let roots = response.items.len();
    let linked = response.linked_items.len();
    let merged = items::union_items(response.items, response.linked_items);
    info!(
        roots,
        linked,
        unique = merged.len(),
        "[PROJECT] Unioned root and linked items"
    );

    let mut node_ids: Vec<String> = Vec::with_capacity(merged.len());
    for item in &merged {
        let node = items::build_node(item, host)?;
        debug!(
            codename = %item.system.codename,
            node_id = %node.id,
            digest = %node.internal.content_digest,
            "[PROJECT] Projected item"
        );
        let id = node.id.clone();
        host.create_node(node).await.map_err(|e| {
            error!(
                codename = %item.system.codename,
                error = ?e,
                "[PROJECT][ERROR] Node creation failed"
            );
            ProjectError::Host(e)
        })?;
        node_ids.push(id);
    }
    info!(nodes = node_ids.len(), "[PROJECT] All items projected");
    Ok(node_ids)
}

/// Entrypoint: run the full projection pipeline for one CMS project.
///
/// The two upstream reads overlap; the two projection phases do not.
pub async fn project<C, H>(client: &C, host: &H) -> Result<ProjectReport, ProjectError>
where
    C: ContentClient,
    H: GraphHost,
{
    info!("[PROJECT] Starting projection run");

    let (defs, items_response) = try_join(
        client.list_content_types(),
        client.list_content_items(),
    )
    .await
    .map_err(|e| {
        error!(error = ?e, "[PROJECT][ERROR] Upstream fetch failed");
        ProjectError::Fetch(e)
    })?;

    let types_registered = project_types(&defs, host).await?;
    let node_ids = project_items(items_response, host).await?;

    Ok(ProjectReport {
        types_registered,
        nodes_created: node_ids.len(),
        node_ids,
    })
}
