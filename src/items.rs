//! Item Projection: normalizes raw content items into projected nodes.
//!
//! Three responsibilities, in order:
//!
//! 1. **Union by identity** — root items and transitively linked items are
//!    merged into one set keyed by item codename, first occurrence wins, so
//!    an item that is both a root result and a link target emits exactly
//!    one node.
//! 2. **Element normalization** — each raw element property is matched on
//!    its kind tag and rebuilt as a typed [`ElementValue`]. Only the
//!    normalized fields are ever constructed, so raw transport payloads
//!    (pre-resolved linked items, SDK-internal fields) are dropped by
//!    construction rather than by a serialization round-trip.
//! 3. **Identity and fingerprint** — node identity is derived from the
//!    stable (type codename, item id) key via the host's id generator, and
//!    the change-detection fingerprint covers the canonical
//!    {system, elements} content only.
//!
//! Each item's projection is a pure function of that item's data; items
//! share no mutable state.

use std::collections::{BTreeMap, HashSet};

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::contract::{GraphHost, NodeInternal, ProjectError, ProjectedNode, RawItem};
use crate::naming;
use crate::value::{
    Asset, ElementKind, ElementValue, RichTextImage, RichTextLink, TaxonomyTerm,
};

/// Media type recorded on every projected node.
pub const NODE_MEDIA_TYPE: &str = "text/html";

/// Merges root and linked items into one deduplicated set keyed by item
/// codename. Root items come first; the first occurrence of a codename
/// wins.
pub fn union_items(items: Vec<RawItem>, linked_items: Vec<RawItem>) -> Vec<RawItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<RawItem> = Vec::with_capacity(items.len() + linked_items.len());
    for item in items.into_iter().chain(linked_items) {
        if seen.insert(item.system.codename.clone()) {
            out.push(item);
        } else {
            debug!(
                codename = %item.system.codename,
                "Skipping duplicate item already present in the union"
            );
        }
    }
    out
}

fn str_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}

fn int_field(object: &Map<String, Value>, key: &str) -> Option<i64> {
    object.get(key).and_then(|v| v.as_i64())
}

/// Linked-item codenames from a raw value: an array of codename strings,
/// or an array of pre-resolved item objects (in which case only the
/// codename survives).
fn codename_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(codename) => Some(codename.clone()),
            Value::Object(object) => object
                .get("system")
                .and_then(|s| s.get("codename"))
                .and_then(|c| c.as_str())
                .map(str::to_owned),
            _ => None,
        })
        .collect()
}

/// Rich text embeds arrive either as an id-keyed map (wire shape) or as an
/// already-flattened array. Both collapse to the same normalized list.
fn rich_text_images(value: Option<&Value>) -> Vec<RichTextImage> {
    let mut out = Vec::new();
    match value {
        Some(Value::Object(by_id)) => {
            for (id, image) in by_id {
                let Some(object) = image.as_object() else {
                    continue;
                };
                out.push(RichTextImage {
                    description: str_field(object, "description"),
                    width: int_field(object, "width"),
                    height: int_field(object, "height"),
                    image_id: str_field(object, "image_id").unwrap_or_else(|| id.clone()),
                    url: str_field(object, "url"),
                });
            }
        }
        Some(Value::Array(images)) => {
            for image in images {
                let Some(object) = image.as_object() else {
                    continue;
                };
                let Some(image_id) =
                    str_field(object, "image_id").or_else(|| str_field(object, "imageId"))
                else {
                    continue;
                };
                out.push(RichTextImage {
                    description: str_field(object, "description"),
                    width: int_field(object, "width"),
                    height: int_field(object, "height"),
                    image_id,
                    url: str_field(object, "url"),
                });
            }
        }
        _ => {}
    }
    out
}

fn rich_text_links(value: Option<&Value>) -> Vec<RichTextLink> {
    let mut out = Vec::new();
    match value {
        Some(Value::Object(by_id)) => {
            for (id, link) in by_id {
                let Some(object) = link.as_object() else {
                    continue;
                };
                out.push(RichTextLink {
                    codename: str_field(object, "codename"),
                    link_id: str_field(object, "link_id").unwrap_or_else(|| id.clone()),
                    link_type: str_field(object, "type"),
                    url_slug: str_field(object, "url_slug")
                        .or_else(|| str_field(object, "urlSlug")),
                });
            }
        }
        Some(Value::Array(links)) => {
            for link in links {
                let Some(object) = link.as_object() else {
                    continue;
                };
                let Some(link_id) =
                    str_field(object, "link_id").or_else(|| str_field(object, "linkId"))
                else {
                    continue;
                };
                out.push(RichTextLink {
                    codename: str_field(object, "codename"),
                    link_id,
                    link_type: str_field(object, "type"),
                    url_slug: str_field(object, "url_slug")
                        .or_else(|| str_field(object, "urlSlug")),
                });
            }
        }
        _ => {}
    }
    out
}

/// Deserializes each entry of a list-valued element individually, so one
/// malformed entry drops only itself, never the well-formed rest of the
/// list. Skipped entries are logged.
fn entry_list<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    element: &str,
    entry_kind: &str,
) -> Vec<T> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(
                    element = %element,
                    error = %e,
                    "Skipping {} entry with an unrecognized shape",
                    entry_kind
                );
                None
            }
        })
        .collect()
}

/// Selected options of a multiple choice element collapse to one string
/// value: option codenames joined with a comma. A plain string passes
/// through unchanged.
fn choice_value(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(options)) => {
            let codenames: Vec<String> = options
                .iter()
                .filter_map(|option| {
                    option
                        .get("codename")
                        .and_then(|c| c.as_str())
                        .map(str::to_owned)
                })
                .collect();
            if codenames.is_empty() {
                None
            } else {
                Some(codenames.join(","))
            }
        }
        _ => None,
    }
}

/// Normalizes one raw element property into its typed value.
///
/// Returns `None` when the property carries no recognizable kind tag —
/// such properties are item metadata, not elements, and are excluded from
/// the node. An unrecognized kind string is NOT an error: it degrades to
/// [`ElementValue::Unknown`] so CMS schema evolution never aborts a run.
pub fn normalize_element(raw: &Value) -> Option<ElementValue> {
    let object = raw.as_object()?;
    let kind_code = object.get("type")?.as_str()?;
    let kind = ElementKind::from(kind_code.to_owned());
    let name = str_field(object, "name").unwrap_or_default();

    Some(match kind {
        ElementKind::Text => ElementValue::Text {
            name,
            value: str_field(object, "value"),
        },
        ElementKind::Number => ElementValue::Number {
            name,
            value: object.get("value").and_then(|v| v.as_f64()),
        },
        ElementKind::DateTime => ElementValue::DateTime {
            name,
            value: str_field(object, "value"),
        },
        ElementKind::UrlSlug => ElementValue::UrlSlug {
            name,
            value: str_field(object, "value"),
        },
        ElementKind::MultipleChoice => ElementValue::MultipleChoice {
            name,
            value: choice_value(object.get("value")),
        },
        ElementKind::Asset => {
            let assets: Vec<Asset> = entry_list(object.get("value"), &name, "asset");
            ElementValue::Asset { name, assets }
        }
        ElementKind::ModularContent => ElementValue::ModularContent {
            name,
            linked_items: codename_list(object.get("value")),
        },
        ElementKind::RichText => {
            let linked_items = match object.get("modular_content") {
                Some(list @ Value::Array(_)) => codename_list(Some(list)),
                _ => codename_list(
                    object
                        .get("linkedItemCodenames")
                        .or_else(|| object.get("linked_item_codenames")),
                ),
            };
            ElementValue::RichText {
                name,
                value: str_field(object, "value").unwrap_or_default(),
                images: rich_text_images(object.get("images")),
                links: rich_text_links(object.get("links")),
                linked_items,
            }
        }
        ElementKind::Taxonomy => {
            let terms: Vec<TaxonomyTerm> =
                entry_list(object.get("value"), &name, "taxonomy term");
            ElementValue::Taxonomy {
                name,
                taxonomy_group: str_field(object, "taxonomy_group")
                    .or_else(|| str_field(object, "taxonomyGroup")),
                terms,
            }
        }
        ElementKind::Unknown(code) => {
            warn!(kind = %code, element = %name, "Element kind outside the catalog; projecting as string value");
            ElementValue::Unknown {
                name,
                kind: code,
                value: str_field(object, "value"),
            }
        }
    })
}

/// Normalizes every element property of one item, keyed by generated field
/// name. Properties without a kind tag are excluded; field-name collisions
/// after case folding keep the last value, logged.
pub fn normalize_elements(item: &RawItem) -> BTreeMap<String, ElementValue> {
    let mut elements = BTreeMap::new();
    for (codename, raw) in &item.elements {
        match normalize_element(raw) {
            Some(value) => {
                let field = naming::field_name(codename);
                if elements.insert(field.clone(), value).is_some() {
                    warn!(
                        item = %item.system.codename,
                        field = %field,
                        "Element codenames collide after case folding; last value wins"
                    );
                }
            }
            None => {
                debug!(
                    item = %item.system.codename,
                    property = %codename,
                    "Skipping property without an element kind tag"
                );
            }
        }
    }
    elements
}

fn validate_identity(item: &RawItem) -> Result<(), ProjectError> {
    let codename = if item.system.codename.is_empty() {
        None
    } else {
        Some(item.system.codename.clone())
    };
    if item.system.id.is_empty() {
        return Err(ProjectError::MalformedItem {
            codename,
            reason: "missing system.id".to_owned(),
        });
    }
    if item.system.type_codename.is_empty() {
        return Err(ProjectError::MalformedItem {
            codename,
            reason: "missing system.type".to_owned(),
        });
    }
    Ok(())
}

/// Projects one raw item into its node: normalized content, stable
/// identity, content fingerprint. Pure apart from the two delegated host
/// generator calls; never touches the node store.
pub fn build_node<H>(item: &RawItem, host: &H) -> Result<ProjectedNode, ProjectError>
where
    H: GraphHost + ?Sized,
{
    validate_identity(item)?;

    let elements = normalize_elements(item);

    // Fingerprint covers normalized content only, never the generated
    // identity or type name.
    let content = json!({
        "system": &item.system,
        "elements": &elements,
    });
    let content_digest = host.make_fingerprint(&content);

    let key = naming::identity_key(&item.system.type_codename, &item.system.id);
    let id = host.make_node_id(&key);

    Ok(ProjectedNode {
        system: item.system.clone(),
        elements,
        id,
        parent: None,
        children: Vec::new(),
        internal: NodeInternal {
            type_name: naming::type_name(&item.system.type_codename),
            media_type: NODE_MEDIA_TYPE.to_owned(),
            content_digest,
        },
    })
}
