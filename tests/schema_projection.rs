use kontent_source::contract::{ContentTypeDef, ElementDef, MockGraphHost, TypeSystem};
use kontent_source::project::project_types;
use kontent_source::schema::{build_schema, SchemaBatch, TypeDecl};
use kontent_source::value::ElementKind;

fn content_type(codename: &str, elements: Vec<(&str, ElementKind)>) -> ContentTypeDef {
    ContentTypeDef {
        system: TypeSystem {
            codename: codename.to_owned(),
        },
        elements: elements
            .into_iter()
            .map(|(code, kind)| ElementDef {
                codename: code.to_owned(),
                kind,
            })
            .collect(),
    }
}

fn object_names(batch: &SchemaBatch) -> Vec<&str> {
    batch
        .decls
        .iter()
        .filter_map(|d| match d {
            TypeDecl::Object(o) => Some(o.name.as_str()),
            TypeDecl::Interface(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_project_types_registers_one_batch_with_the_host() {
    let defs = vec![content_type("blog_post", vec![("title", ElementKind::Text)])];

    let mut host = MockGraphHost::new();
    host.expect_register_schema()
        .times(1)
        .withf(|batch: &SchemaBatch| {
            let names = batch
                .decls
                .iter()
                .filter_map(|d| match d {
                    TypeDecl::Object(o) => Some(o.name.clone()),
                    TypeDecl::Interface(i) => Some(i.name.clone()),
                })
                .collect::<Vec<_>>();
            names.contains(&"KontentItemBlogPost".to_owned())
                && names.contains(&"KontentItemBlogPostElements".to_owned())
                && names.contains(&"KontentItem".to_owned())
        })
        .returning(|_| Ok(()));

    let declared = project_types(&defs, &host)
        .await
        .expect("type projection should succeed");
    assert!(declared > 9, "base catalog plus generated types expected");
}

#[tokio::test]
async fn test_schema_registration_failure_is_fatal() {
    let defs = vec![content_type("blog_post", vec![("title", ElementKind::Text)])];

    let mut host = MockGraphHost::new();
    host.expect_register_schema()
        .return_once(|_| Err("host rejected the batch".into()));

    let err = project_types(&defs, &host).await.unwrap_err();
    assert!(err.to_string().contains("host"), "got: {err}");
}

#[test]
fn test_schema_is_idempotent_and_byte_identical() {
    let defs = vec![
        content_type(
            "blog_post",
            vec![
                ("title", ElementKind::Text),
                ("published", ElementKind::DateTime),
                ("hero", ElementKind::Asset),
                ("body", ElementKind::RichText),
                ("related", ElementKind::ModularContent),
            ],
        ),
        content_type("author", vec![("name", ElementKind::Text)]),
    ];
    let first = build_schema(&defs);
    let second = build_schema(&defs);
    assert_eq!(first, second);
    assert_eq!(first.to_sdl(), second.to_sdl());
}

#[test]
fn test_every_catalog_kind_has_a_value_type_before_any_content_type() {
    let batch = build_schema(&[]);
    let names = object_names(&batch);
    for expected in [
        "KontentTextElement",
        "KontentNumberElement",
        "KontentDateTimeElement",
        "KontentAssetElement",
        "KontentRichTextElement",
        "KontentModularContentElement",
        "KontentTaxonomyElement",
        "KontentMultipleChoiceElement",
        "KontentUrlSlugElement",
    ] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

#[test]
fn test_unknown_kind_does_not_abort_type_projection() {
    let defs = vec![content_type(
        "gadget",
        vec![
            ("title", ElementKind::Text),
            ("extra", ElementKind::Unknown("new_kind_v2".to_owned())),
        ],
    )];
    let batch = build_schema(&defs);
    let names = object_names(&batch);
    assert!(names.contains(&"KontentNewKindV2Element"));
    assert!(names.contains(&"KontentItemGadget"));
}

#[test]
fn test_elements_type_preserves_definition_order() {
    let defs = vec![content_type(
        "page",
        vec![
            ("zeta", ElementKind::Text),
            ("alpha", ElementKind::Number),
            ("mid_field", ElementKind::UrlSlug),
        ],
    )];
    let batch = build_schema(&defs);
    let elements = batch
        .decls
        .iter()
        .find_map(|d| match d {
            TypeDecl::Object(o) if o.name == "KontentItemPageElements" => Some(o),
            _ => None,
        })
        .expect("elements type declared");
    let field_names: Vec<&str> = elements.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, vec!["zeta", "alpha", "midField"]);
}
