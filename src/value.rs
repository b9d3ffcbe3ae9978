//! Element kinds and normalized element values.
//!
//! The CMS delivers elements as loosely-typed JSON tagged with a kind
//! string. This module is the typed boundary: [`ElementKind`] is the closed
//! catalog of kinds (with an explicit unknown variant for CMS schema
//! evolution), and [`ElementValue`] is the discriminated union every element
//! is normalized into before it reaches a node. Serialization of an
//! [`ElementValue`] emits only the normalized shape, so raw transport fields
//! can never leak into the graph.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The closed catalog of element kinds the projection understands.
///
/// Any kind string outside the catalog round-trips through
/// [`ElementKind::Unknown`] rather than failing deserialization, so a CMS
/// that grows a new element kind degrades to a string-valued element
/// instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Text,
    Number,
    DateTime,
    Asset,
    RichText,
    ModularContent,
    Taxonomy,
    MultipleChoice,
    UrlSlug,
    Unknown(String),
}

/// The nine catalog kinds, in declaration order. Base schema types are
/// generated once per entry; the order is fixed so schema output is stable.
pub const KIND_CATALOG: [ElementKind; 9] = [
    ElementKind::Text,
    ElementKind::Number,
    ElementKind::DateTime,
    ElementKind::Asset,
    ElementKind::RichText,
    ElementKind::ModularContent,
    ElementKind::Taxonomy,
    ElementKind::MultipleChoice,
    ElementKind::UrlSlug,
];

impl ElementKind {
    /// The CMS-side codename for this kind (`rich_text`, `url_slug`, ...).
    pub fn codename(&self) -> &str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Number => "number",
            ElementKind::DateTime => "date_time",
            ElementKind::Asset => "asset",
            ElementKind::RichText => "rich_text",
            ElementKind::ModularContent => "modular_content",
            ElementKind::Taxonomy => "taxonomy",
            ElementKind::MultipleChoice => "multiple_choice",
            ElementKind::UrlSlug => "url_slug",
            ElementKind::Unknown(code) => code,
        }
    }
}

impl From<String> for ElementKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => ElementKind::Text,
            "number" => ElementKind::Number,
            "date_time" => ElementKind::DateTime,
            "asset" => ElementKind::Asset,
            "rich_text" => ElementKind::RichText,
            "modular_content" => ElementKind::ModularContent,
            "taxonomy" => ElementKind::Taxonomy,
            "multiple_choice" => ElementKind::MultipleChoice,
            "url_slug" => ElementKind::UrlSlug,
            other => ElementKind::Unknown(other.to_owned()),
        }
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.codename().to_owned()
    }
}

/// One asset attached to an asset element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    pub url: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// An image embedded inside a rich text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextImage {
    pub description: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    #[serde(rename = "imageId")]
    pub image_id: String,
    pub url: Option<String>,
}

/// A content link embedded inside a rich text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextLink {
    pub codename: Option<String>,
    #[serde(rename = "linkId")]
    pub link_id: String,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    #[serde(rename = "urlSlug")]
    pub url_slug: Option<String>,
}

/// One term selected on a taxonomy element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub name: Option<String>,
    pub codename: Option<String>,
}

/// A normalized element value, keyed by kind.
///
/// Each variant carries exactly the externalized fields for its kind and
/// nothing else. Linked content (modular content, rich text embeds) is held
/// as identity-only codename lists; resolution to nodes is the host's
/// link-following concern.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Text {
        name: String,
        value: Option<String>,
    },
    Number {
        name: String,
        value: Option<f64>,
    },
    DateTime {
        name: String,
        value: Option<String>,
    },
    Asset {
        name: String,
        assets: Vec<Asset>,
    },
    RichText {
        name: String,
        value: String,
        images: Vec<RichTextImage>,
        links: Vec<RichTextLink>,
        linked_items: Vec<String>,
    },
    ModularContent {
        name: String,
        linked_items: Vec<String>,
    },
    Taxonomy {
        name: String,
        taxonomy_group: Option<String>,
        terms: Vec<TaxonomyTerm>,
    },
    MultipleChoice {
        name: String,
        value: Option<String>,
    },
    UrlSlug {
        name: String,
        value: Option<String>,
    },
    Unknown {
        name: String,
        kind: String,
        value: Option<String>,
    },
}

impl ElementValue {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementValue::Text { .. } => ElementKind::Text,
            ElementValue::Number { .. } => ElementKind::Number,
            ElementValue::DateTime { .. } => ElementKind::DateTime,
            ElementValue::Asset { .. } => ElementKind::Asset,
            ElementValue::RichText { .. } => ElementKind::RichText,
            ElementValue::ModularContent { .. } => ElementKind::ModularContent,
            ElementValue::Taxonomy { .. } => ElementKind::Taxonomy,
            ElementValue::MultipleChoice { .. } => ElementKind::MultipleChoice,
            ElementValue::UrlSlug { .. } => ElementKind::UrlSlug,
            ElementValue::Unknown { kind, .. } => ElementKind::Unknown(kind.clone()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ElementValue::Text { name, .. }
            | ElementValue::Number { name, .. }
            | ElementValue::DateTime { name, .. }
            | ElementValue::Asset { name, .. }
            | ElementValue::RichText { name, .. }
            | ElementValue::ModularContent { name, .. }
            | ElementValue::Taxonomy { name, .. }
            | ElementValue::MultipleChoice { name, .. }
            | ElementValue::UrlSlug { name, .. }
            | ElementValue::Unknown { name, .. } => name,
        }
    }

    /// Externalizes the value into the universal structured form (strings,
    /// numbers, null, lists, string-keyed maps). This is the only
    /// serialization path for element values, so nodes can only ever carry
    /// the normalized shape.
    pub fn to_canonical(&self) -> Value {
        let kind = self.kind();
        match self {
            ElementValue::Text { name, value }
            | ElementValue::DateTime { name, value }
            | ElementValue::MultipleChoice { name, value }
            | ElementValue::UrlSlug { name, value } => json!({
                "name": name,
                "type": kind.codename(),
                "value": value,
            }),
            ElementValue::Number { name, value } => json!({
                "name": name,
                "type": kind.codename(),
                "value": value,
            }),
            ElementValue::Asset { name, assets } => json!({
                "name": name,
                "type": kind.codename(),
                "value": assets,
            }),
            ElementValue::RichText {
                name,
                value,
                images,
                links,
                linked_items,
            } => json!({
                "name": name,
                "type": kind.codename(),
                "value": value,
                "images": images,
                "links": links,
                "linkedItems": linked_items,
            }),
            ElementValue::ModularContent { name, linked_items } => json!({
                "name": name,
                "type": kind.codename(),
                "linkedItems": linked_items,
            }),
            ElementValue::Taxonomy {
                name,
                taxonomy_group,
                terms,
            } => json!({
                "name": name,
                "type": kind.codename(),
                "taxonomyGroup": taxonomy_group,
                "terms": terms,
            }),
            ElementValue::Unknown { name, kind, value } => json!({
                "name": name,
                "type": kind,
                "value": value,
            }),
        }
    }
}

impl Serialize for ElementValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_canonical().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_its_codename() {
        for kind in KIND_CATALOG {
            let code = kind.codename().to_owned();
            assert_eq!(ElementKind::from(code), kind);
        }
    }

    #[test]
    fn unrecognised_kind_becomes_unknown_not_an_error() {
        let kind = ElementKind::from("new_kind_v2".to_owned());
        assert_eq!(kind, ElementKind::Unknown("new_kind_v2".to_owned()));
        assert_eq!(kind.codename(), "new_kind_v2");
    }

    #[test]
    fn rich_text_canonical_form_has_only_normalized_fields() {
        let value = ElementValue::RichText {
            name: "Body".to_owned(),
            value: "<p>hi</p>".to_owned(),
            images: vec![],
            links: vec![],
            linked_items: vec!["c1".to_owned()],
        };
        let canonical = value.to_canonical();
        let object = canonical.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["images", "linkedItems", "links", "name", "type", "value"]
        );
        assert_eq!(canonical["value"], "<p>hi</p>");
        assert_eq!(canonical["linkedItems"], json!(["c1"]));
    }

    #[test]
    fn modular_content_canonical_form_is_identity_only() {
        let value = ElementValue::ModularContent {
            name: "Related".to_owned(),
            linked_items: vec!["a".to_owned(), "b".to_owned()],
        };
        let canonical = value.to_canonical();
        let object = canonical.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(canonical["linkedItems"], json!(["a", "b"]));
    }
}
