use once_cell::sync::Lazy;
use regex::Regex;

/// The type everything coerces to.
pub const TEXT: &str = "text";

/// The coercion tree as `(type, parent)`; a value of a type can be
/// represented by any of its ancestors.
const COERCIONS: &[(&str, Option<&str>)] = &[
    (TEXT, None),
    ("double precision", Some(TEXT)),
    ("real", Some("double precision")),
    ("bigint", Some("real")),
    ("integer", Some("bigint")),
    ("smallint", Some("integer")),
    ("bytea", Some("smallint")),
    ("boolean", Some("smallint")),
    ("timestamp", Some(TEXT)),
    ("date", Some("timestamp")),
    ("time", Some("timestamp")),
    ("file", Some(TEXT)),
    ("box", Some(TEXT)),
    ("spoint", Some(TEXT)),
    ("scircle", Some(TEXT)),
    ("spoly", Some(TEXT)),
    ("sbox", Some("spoly")),
];

static STRING_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:character varying|varchar|char)\(\d*\)").expect("valid string type pattern")
});
static ARRAY_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^\[]*)(?:\[\d*\])+").expect("valid array type pattern"));

fn canonical(name: &str) -> Option<&'static str> {
    let name = match name {
        "double" => "double precision",
        "float" => "real",
        "int" => "integer",
        other => other,
    };
    COERCIONS.iter().find(|(known, _)| *known == name).map(|(known, _)| *known)
}

fn parent(name: &str) -> Option<&'static str> {
    COERCIONS.iter().find(|(known, _)| *known == name).and_then(|(_, parent)| *parent)
}

/// `name` followed by its ancestors up to the root.
fn lineage(name: &'static str) -> Vec<&'static str> {
    let mut chain = vec![name];
    let mut current = name;
    while let Some(up) = parent(current) {
        chain.push(up);
        current = up;
    }
    chain
}

/// The nearest type that is an ancestor of both.
fn unify(a: &'static str, b: &'static str) -> &'static str {
    let above_a = lineage(a);
    lineage(b).into_iter().find(|t| above_a.contains(t)).unwrap_or(TEXT)
}

/// The least general SQL type able to represent values of all `types`.
///
/// Sized strings coerce to `text`, unknown types and an empty input give
/// `text` too. Arrays are unified by element type and stay arrays.
pub fn subsuming_type<'a>(types: impl IntoIterator<Item = &'a str>) -> String {
    let mut is_array = false;
    let mut elements = Vec::new();
    for sql_type in types {
        let sql_type = sql_type.trim().to_lowercase();
        if STRING_TYPE.is_match(&sql_type) {
            return TEXT.to_string();
        }
        let element = match ARRAY_TYPE.captures(&sql_type).and_then(|c| c.get(1)) {
            Some(element) => {
                is_array = true;
                element.as_str().trim().to_string()
            }
            None => sql_type,
        };
        elements.push(element);
    }

    let known: Option<Vec<&'static str>> = elements.iter().map(|e| canonical(e)).collect();
    let subsuming = known
        .and_then(|known| known.into_iter().reduce(unify))
        .unwrap_or(TEXT);
    if is_array {
        format!("{}[]", subsuming)
    } else {
        subsuming.to_string()
    }
}

/// Type of a value combining two optionally typed operands.
pub fn combine_types(a: Option<&str>, b: Option<&str>) -> Option<String> {
    match (a, b) {
        (None, None) => None,
        (Some(t), None) | (None, Some(t)) => Some(t.to_string()),
        (Some(a), Some(b)) => Some(subsuming_type([a, b])),
    }
}
