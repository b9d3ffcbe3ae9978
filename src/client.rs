//! Kontent Delivery API client: the concrete [`ContentClient`] used by the
//! CLI and end-to-end runs.
//!
//! Glue, not engineering: one GET per accessor, no pagination, no retries,
//! no authentication. The items endpoint returns linked items as a
//! codename-keyed `modular_content` map; this client flattens that map into
//! the `linked_items` list the core expects. Content type definitions
//! arrive with elements as a codename-keyed object and are rebuilt into the
//! ordered element sequence of [`ContentTypeDef`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::ProjectConfig;
use crate::contract::{
    BoxError, ContentClient, ContentTypeDef, ElementDef, ItemsResponse, RawItem, TypeSystem,
};
use crate::value::ElementKind;

/// Production Delivery API endpoint.
pub const DELIVERY_BASE_URL: &str = "https://deliver.kontent.ai";

/// Wire shape of one content type: elements keyed by codename.
/// `serde_json::Map` keeps the wire's declaration order (the crate's
/// `preserve_order` feature), which carries through to the generated
/// elements type.
#[derive(Deserialize)]
struct WireType {
    system: TypeSystem,
    elements: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct WireTypeElement {
    #[serde(rename = "type")]
    kind: ElementKind,
}

/// Rebuilds a [`ContentTypeDef`] from its wire shape, preserving element
/// declaration order. Element entries that do not carry a kind tag are a
/// malformed response and fail the fetch.
fn content_type_from_wire(wire: WireType) -> Result<ContentTypeDef, BoxError> {
    let mut elements = Vec::with_capacity(wire.elements.len());
    for (codename, raw) in wire.elements {
        let element: WireTypeElement = serde_json::from_value(raw).map_err(|e| {
            BoxError::from(format!(
                "malformed element '{codename}' in content type '{}': {e}",
                wire.system.codename
            ))
        })?;
        elements.push(ElementDef {
            codename,
            kind: element.kind,
        });
    }
    Ok(ContentTypeDef {
        system: wire.system,
        elements,
    })
}

#[derive(Deserialize)]
struct TypesEnvelope {
    types: Vec<WireType>,
}

#[derive(Deserialize)]
struct ItemsEnvelope {
    items: Vec<RawItem>,
    #[serde(default)]
    modular_content: BTreeMap<String, RawItem>,
}

/// HTTP client for one project of the Delivery API.
pub struct DeliveryClient {
    base_url: String,
    project_id: String,
    language: Option<String>,
    depth: u32,
    http: Client,
}

impl DeliveryClient {
    pub fn new(config: &ProjectConfig) -> Self {
        DeliveryClient {
            base_url: DELIVERY_BASE_URL.to_owned(),
            project_id: config.project_id.clone(),
            language: config.language.clone(),
            depth: config.depth,
            http: Client::new(),
        }
    }

    /// Points the client at a different base URL, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BoxError> {
        info!(url = %url, "Fetching from Delivery API");
        let response = self.http.get(url).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Delivery API request failed");
            BoxError::from(format!("request to {url} failed: {e}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            error!(status = %status, url = %url, "Delivery API returned error. Response body: {body}");
            return Err(format!("Delivery API error: url={url} status={status} body={body}").into());
        }
        response.json::<T>().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to decode Delivery API response");
            BoxError::from(format!("malformed Delivery API response from {url}: {e}"))
        })
    }
}

#[async_trait]
impl ContentClient for DeliveryClient {
    async fn list_content_types(&self) -> Result<Vec<ContentTypeDef>, BoxError> {
        let url = format!("{}/{}/types", self.base_url, self.project_id);
        let envelope: TypesEnvelope = self.get_json(&url).await?;
        let defs = envelope
            .types
            .into_iter()
            .map(content_type_from_wire)
            .collect::<Result<Vec<_>, _>>()?;
        info!(content_types = defs.len(), "Fetched content type definitions");
        Ok(defs)
    }

    async fn list_content_items(&self) -> Result<ItemsResponse, BoxError> {
        let mut url = format!(
            "{}/{}/items?depth={}",
            self.base_url, self.project_id, self.depth
        );
        if let Some(language) = &self.language {
            url.push_str(&format!("&language={language}"));
        }
        let envelope: ItemsEnvelope = self.get_json(&url).await?;
        let response = ItemsResponse {
            items: envelope.items,
            linked_items: envelope.modular_content.into_values().collect(),
        };
        info!(
            items = response.items.len(),
            linked_items = response.linked_items.len(),
            "Fetched content items"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_elements_keep_wire_declaration_order() {
        let wire: WireType = serde_json::from_str(
            r#"{
                "system": {"codename": "page"},
                "elements": {
                    "zeta": {"type": "text", "name": "Zeta"},
                    "alpha": {"type": "number", "name": "Alpha"},
                    "mid_field": {"type": "url_slug", "name": "Mid"}
                }
            }"#,
        )
        .expect("wire type should deserialize");
        let def = content_type_from_wire(wire).expect("conversion should succeed");
        let codenames: Vec<&str> = def.elements.iter().map(|e| e.codename.as_str()).collect();
        assert_eq!(codenames, vec!["zeta", "alpha", "mid_field"]);
        assert_eq!(def.elements[1].kind, ElementKind::Number);
    }

    #[test]
    fn element_without_a_kind_tag_fails_the_fetch() {
        let wire: WireType = serde_json::from_str(
            r#"{
                "system": {"codename": "page"},
                "elements": {"broken": {"name": "no kind here"}}
            }"#,
        )
        .expect("wire type should deserialize");
        let err = content_type_from_wire(wire).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("broken"), "should name the element: {msg}");
        assert!(msg.contains("page"), "should name the content type: {msg}");
    }
}
