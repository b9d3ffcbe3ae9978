//! Naming layer: converts CMS codenames into the conventions the graph
//! schema requires.
//!
//! Codenames arrive as snake_case, kebab-case or free text. Downstream we
//! need PascalCase for type names, camelCase for field names and kebab-case
//! for composite identity keys. All functions here are pure and total over
//! non-empty input; an empty codename is a caller contract violation and is
//! passed through untouched.

/// Prefix shared by every generated item type name.
pub const TYPE_PREFIX: &str = "KontentItem";

/// Prefix shared by every generated element value type name.
pub const ELEMENT_PREFIX: &str = "Kontent";

/// Suffix shared by every generated element value type name.
pub const ELEMENT_SUFFIX: &str = "Element";

/// Splits a codename into lowercase words on `_`, `-`, whitespace and
/// lower-to-upper case boundaries.
fn words(codename: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in codename.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                out.push(current.clone());
                current.clear();
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(current.clone());
            current.clear();
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// PascalCase over an arbitrary codename: `blog_post` → `BlogPost`.
pub fn pascal_case(codename: &str) -> String {
    words(codename).iter().map(|w| capitalise(w)).collect()
}

/// camelCase over an arbitrary codename: `url_slug` → `urlSlug`.
pub fn camel_case(codename: &str) -> String {
    let ws = words(codename);
    let mut out = String::new();
    for (i, w) in ws.iter().enumerate() {
        if i == 0 {
            out.push_str(w);
        } else {
            out.push_str(&capitalise(w));
        }
    }
    out
}

/// kebab-case over an arbitrary codename: `blog_post` → `blog-post`.
pub fn kebab_case(codename: &str) -> String {
    words(codename).join("-")
}

/// The generated object type name for a content type codename:
/// `blog_post` → `KontentItemBlogPost`.
pub fn type_name(codename: &str) -> String {
    format!("{}{}", TYPE_PREFIX, pascal_case(codename))
}

/// The generated elements object type name for a content type codename:
/// `blog_post` → `KontentItemBlogPostElements`.
pub fn elements_type_name(codename: &str) -> String {
    format!("{}Elements", type_name(codename))
}

/// The generated field name for an element codename.
pub fn field_name(codename: &str) -> String {
    camel_case(codename)
}

/// The stable identity key for one content item, fed to the host's node id
/// generator. Pure function of (type codename, item id) so the same item
/// reproduces the same identity across runs.
pub fn identity_key(type_codename: &str, item_id: &str) -> String {
    format!("{}-{}", kebab_case(type_codename), item_id)
}

/// The generated value type name for an element kind codename:
/// `rich_text` → `KontentRichTextElement`.
pub fn element_value_type_name(kind: &str) -> String {
    format!("{}{}{}", ELEMENT_PREFIX, pascal_case(kind), ELEMENT_SUFFIX)
}
