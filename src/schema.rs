//! Type Projection: derives graph schema declarations from the CMS's
//! content type definitions.
//!
//! The output of this module is a [`SchemaBatch`] — the full, ordered set
//! of type declarations registered with the host in one call before any
//! node is created. A batch always contains:
//!
//! 1. Fixed base declarations, independent of project content: the
//!    `KontentItem` interface ("any content item"), the system object type,
//!    the supporting value records (asset, rich text image/link, taxonomy
//!    term), the `KontentElement` capability interface, and one value type
//!    per kind in the fixed nine-kind catalog.
//! 2. Per content type: an elements object type (one field per element
//!    definition, order-preserving) and the item object type itself.
//!
//! Element kinds outside the catalog still receive a concrete value type,
//! generated on first sight as a plain string-valued element, so a CMS that
//! grows a new kind never drops a field or aborts the projection.

use serde::Serialize;
use tracing::{debug, warn};

use crate::contract::ContentTypeDef;
use crate::naming;
use crate::value::{ElementKind, KIND_CATALOG};

/// One field of a generated object or interface type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: String,
    pub required: bool,
}

impl FieldDecl {
    fn new(name: &str, field_type: &str) -> Self {
        FieldDecl {
            name: name.to_owned(),
            field_type: field_type.to_owned(),
            required: false,
        }
    }

    fn required(name: &str, field_type: &str) -> Self {
        FieldDecl {
            name: name.to_owned(),
            field_type: field_type.to_owned(),
            required: true,
        }
    }
}

/// An interface declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// An object type declaration, possibly implementing interfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDecl {
    pub name: String,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDecl>,
}

/// One declaration in a schema batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decl", rename_all = "lowercase")]
pub enum TypeDecl {
    Interface(InterfaceDecl),
    Object(ObjectDecl),
}

/// The full, ordered schema registration for one run. Building a batch is
/// pure; handing it to the host is the only side effect of Type Projection.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SchemaBatch {
    pub decls: Vec<TypeDecl>,
}

impl SchemaBatch {
    /// Renders the batch as SDL text. Deterministic: the same definitions
    /// always render byte-identically.
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();
        for decl in &self.decls {
            match decl {
                TypeDecl::Interface(interface) => {
                    out.push_str(&format!("interface {} {{\n", interface.name));
                    render_fields(&mut out, &interface.fields);
                }
                TypeDecl::Object(object) => {
                    if object.implements.is_empty() {
                        out.push_str(&format!("type {} {{\n", object.name));
                    } else {
                        out.push_str(&format!(
                            "type {} implements {} {{\n",
                            object.name,
                            object.implements.join(" & ")
                        ));
                    }
                    render_fields(&mut out, &object.fields);
                }
            }
            out.push_str("}\n\n");
        }
        out
    }
}

fn render_fields(out: &mut String, fields: &[FieldDecl]) {
    for field in fields {
        let bang = if field.required { "!" } else { "" };
        out.push_str(&format!("  {}: {}{}\n", field.name, field.field_type, bang));
    }
}

/// Name of the "any content item" interface.
pub const ITEM_INTERFACE: &str = "KontentItem";
/// Name of the system object type shared by every item type.
pub const SYSTEM_TYPE: &str = "KontentItemSystem";
/// Name of the capability interface every element value type implements.
pub const ELEMENT_INTERFACE: &str = "KontentElement";
/// The host's generic node capability every item type implements.
pub const NODE_INTERFACE: &str = "Node";

fn system_fields() -> Vec<FieldDecl> {
    vec![
        FieldDecl::required("codename", "String"),
        FieldDecl::required("id", "String"),
        FieldDecl::required("language", "String"),
        FieldDecl::new("lastModified", "String"),
        FieldDecl::required("name", "String"),
        FieldDecl::required("type", "String"),
    ]
}

/// Kind-specific fields of an element value type, beyond the shared
/// name + type capability fields.
fn kind_fields(kind: &ElementKind) -> Vec<FieldDecl> {
    match kind {
        ElementKind::Text
        | ElementKind::MultipleChoice
        | ElementKind::UrlSlug
        | ElementKind::Unknown(_) => vec![FieldDecl::new("value", "String")],
        ElementKind::Number => vec![FieldDecl::new("value", "Float")],
        ElementKind::DateTime => vec![FieldDecl::new("value", "String")],
        ElementKind::Asset => vec![FieldDecl::new("value", "[KontentAsset]")],
        ElementKind::RichText => vec![
            FieldDecl::new("value", "String"),
            FieldDecl::new("images", "[KontentRichTextImage]"),
            FieldDecl::new("links", "[KontentRichTextLink]"),
            FieldDecl::new("linkedItems", "[String]"),
        ],
        ElementKind::ModularContent => vec![FieldDecl::new("linkedItems", "[String]")],
        ElementKind::Taxonomy => vec![
            FieldDecl::new("taxonomyGroup", "String"),
            FieldDecl::new("terms", "[KontentTaxonomyTerm]"),
        ],
    }
}

fn element_value_decl(kind: &ElementKind) -> TypeDecl {
    let mut fields = vec![
        FieldDecl::new("name", "String"),
        FieldDecl::required("type", "String"),
    ];
    fields.extend(kind_fields(kind));
    TypeDecl::Object(ObjectDecl {
        name: naming::element_value_type_name(kind.codename()),
        implements: vec![ELEMENT_INTERFACE.to_owned()],
        fields,
    })
}

/// The fixed declarations emitted once per run, regardless of project
/// content.
pub fn base_declarations() -> Vec<TypeDecl> {
    let mut decls = vec![
        TypeDecl::Interface(InterfaceDecl {
            name: ITEM_INTERFACE.to_owned(),
            fields: vec![
                FieldDecl::required("id", "ID"),
                FieldDecl::required("system", SYSTEM_TYPE),
            ],
        }),
        TypeDecl::Object(ObjectDecl {
            name: SYSTEM_TYPE.to_owned(),
            implements: vec![],
            fields: system_fields(),
        }),
        TypeDecl::Object(ObjectDecl {
            name: "KontentAsset".to_owned(),
            implements: vec![],
            fields: vec![
                FieldDecl::new("name", "String"),
                FieldDecl::new("description", "String"),
                FieldDecl::new("type", "String"),
                FieldDecl::new("size", "Int"),
                FieldDecl::new("url", "String"),
                FieldDecl::new("width", "Int"),
                FieldDecl::new("height", "Int"),
            ],
        }),
        TypeDecl::Object(ObjectDecl {
            name: "KontentRichTextImage".to_owned(),
            implements: vec![],
            fields: vec![
                FieldDecl::new("description", "String"),
                FieldDecl::new("width", "Int"),
                FieldDecl::new("height", "Int"),
                FieldDecl::required("imageId", "String"),
                FieldDecl::new("url", "String"),
            ],
        }),
        TypeDecl::Object(ObjectDecl {
            name: "KontentRichTextLink".to_owned(),
            implements: vec![],
            fields: vec![
                FieldDecl::new("codename", "String"),
                FieldDecl::required("linkId", "String"),
                FieldDecl::new("type", "String"),
                FieldDecl::new("urlSlug", "String"),
            ],
        }),
        TypeDecl::Object(ObjectDecl {
            name: "KontentTaxonomyTerm".to_owned(),
            implements: vec![],
            fields: vec![
                FieldDecl::new("name", "String"),
                FieldDecl::new("codename", "String"),
            ],
        }),
        TypeDecl::Interface(InterfaceDecl {
            name: ELEMENT_INTERFACE.to_owned(),
            fields: vec![
                FieldDecl::new("name", "String"),
                FieldDecl::required("type", "String"),
            ],
        }),
    ];
    for kind in &KIND_CATALOG {
        decls.push(element_value_decl(kind));
    }
    decls
}

/// The elements object type for one content type: one field per element
/// definition, in definition order. Field names collide when two codenames
/// case-fold to the same camelCase name; the later definition wins and the
/// collision is logged rather than silently absorbed.
fn elements_decl(def: &ContentTypeDef) -> ObjectDecl {
    let mut fields: Vec<FieldDecl> = Vec::with_capacity(def.elements.len());
    for element in &def.elements {
        let name = naming::field_name(&element.codename);
        let field_type = naming::element_value_type_name(element.kind.codename());
        if let Some(existing) = fields.iter_mut().find(|f| f.name == name) {
            warn!(
                content_type = %def.system.codename,
                field = %name,
                "Element codenames collide after case folding; last definition wins"
            );
            existing.field_type = field_type;
        } else {
            fields.push(FieldDecl::new(&name, &field_type));
        }
    }
    ObjectDecl {
        name: naming::elements_type_name(&def.system.codename),
        implements: vec![],
        fields,
    }
}

/// Builds the full schema batch for the given content type definitions.
/// Pure: the same definitions always yield an equal batch.
pub fn build_schema(defs: &[ContentTypeDef]) -> SchemaBatch {
    let mut decls = base_declarations();

    // Value types for kinds outside the catalog, declared once each in
    // order of first appearance.
    let mut unknown_kinds: Vec<ElementKind> = Vec::new();
    for def in defs {
        for element in &def.elements {
            if let ElementKind::Unknown(_) = element.kind {
                if !unknown_kinds.contains(&element.kind) {
                    debug!(
                        kind = %element.kind.codename(),
                        content_type = %def.system.codename,
                        "Declaring value type for element kind outside the catalog"
                    );
                    unknown_kinds.push(element.kind.clone());
                }
            }
        }
    }
    for kind in &unknown_kinds {
        decls.push(element_value_decl(kind));
    }

    for def in defs {
        let elements = elements_decl(def);
        let elements_name = elements.name.clone();
        decls.push(TypeDecl::Object(elements));
        decls.push(TypeDecl::Object(ObjectDecl {
            name: naming::type_name(&def.system.codename),
            implements: vec![NODE_INTERFACE.to_owned(), ITEM_INTERFACE.to_owned()],
            fields: vec![
                FieldDecl::required("system", SYSTEM_TYPE),
                FieldDecl::new("elements", &elements_name),
            ],
        }));
    }

    SchemaBatch { decls }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ElementDef, TypeSystem};

    fn blog_post() -> ContentTypeDef {
        ContentTypeDef {
            system: TypeSystem {
                codename: "blog_post".to_owned(),
            },
            elements: vec![ElementDef {
                codename: "title".to_owned(),
                kind: ElementKind::Text,
            }],
        }
    }

    #[test]
    fn base_declarations_cover_every_catalog_kind() {
        let decls = base_declarations();
        for kind in &KIND_CATALOG {
            let name = naming::element_value_type_name(kind.codename());
            assert!(
                decls.iter().any(|d| matches!(
                    d,
                    TypeDecl::Object(o) if o.name == name
                )),
                "missing value type for kind {}",
                kind.codename()
            );
        }
    }

    #[test]
    fn blog_post_projects_the_expected_pair_of_types() {
        let batch = build_schema(&[blog_post()]);
        let sdl = batch.to_sdl();
        assert!(sdl.contains("type KontentItemBlogPostElements {\n  title: KontentTextElement\n}"));
        assert!(sdl.contains(
            "type KontentItemBlogPost implements Node & KontentItem {\n  system: KontentItemSystem!\n  elements: KontentItemBlogPostElements\n}"
        ));
    }

    #[test]
    fn building_twice_yields_byte_identical_schema() {
        let defs = vec![blog_post()];
        let first = build_schema(&defs);
        let second = build_schema(&defs);
        assert_eq!(first, second);
        assert_eq!(first.to_sdl(), second.to_sdl());
    }

    #[test]
    fn unknown_kind_still_gets_a_concrete_value_type() {
        let def = ContentTypeDef {
            system: TypeSystem {
                codename: "widget".to_owned(),
            },
            elements: vec![ElementDef {
                codename: "payload".to_owned(),
                kind: ElementKind::Unknown("new_kind_v2".to_owned()),
            }],
        };
        let batch = build_schema(&[def]);
        let sdl = batch.to_sdl();
        assert!(sdl.contains("type KontentNewKindV2Element implements KontentElement"));
        assert!(sdl.contains("payload: KontentNewKindV2Element"));
    }

    #[test]
    fn colliding_field_names_keep_the_last_definition() {
        let def = ContentTypeDef {
            system: TypeSystem {
                codename: "page".to_owned(),
            },
            elements: vec![
                ElementDef {
                    codename: "url_slug".to_owned(),
                    kind: ElementKind::Text,
                },
                ElementDef {
                    codename: "url-slug".to_owned(),
                    kind: ElementKind::UrlSlug,
                },
            ],
        };
        let batch = build_schema(&[def]);
        let elements = batch
            .decls
            .iter()
            .find_map(|d| match d {
                TypeDecl::Object(o) if o.name == "KontentItemPageElements" => Some(o),
                _ => None,
            })
            .expect("elements type should be declared");
        assert_eq!(elements.fields.len(), 1);
        assert_eq!(elements.fields[0].name, "urlSlug");
        assert_eq!(elements.fields[0].field_type, "KontentUrlSlugElement");
    }
}
