use serde::{Deserialize, Serialize};

use crate::catalog::{combine_types, subsuming_type};

/// Identifies a catalog column contributing to a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSource {
    pub table: String,
    pub column: String,
}

/// Reference to a coordinate frame, possibly broken by mixing frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StcInfo {
    pub frame: String,
    /// Set when values in different frames were combined.
    pub broken: Option<String>,
}

impl StcInfo {
    pub fn frame(frame: &str) -> Self {
        Self { frame: frame.to_uppercase(), broken: None }
    }

    pub fn is_broken(&self) -> bool {
        self.broken.is_some()
    }
}

/// Physical metadata of a column or expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldInfo {
    pub unit: String,
    pub ucd: String,
    pub stc: Option<StcInfo>,
    pub tainted: bool,
    pub user_data: Vec<ColumnSource>,
    /// PostgreSQL type of the values, when known.
    #[serde(default)]
    pub sql_type: Option<String>,
}

/// Equality ignores provenance.
impl PartialEq for FieldInfo {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit
            && self.ucd == other.ucd
            && self.stc == other.stc
            && self.tainted == other.tainted
            && self.sql_type == other.sql_type
    }
}

impl FieldInfo {
    pub fn new(unit: &str, ucd: &str) -> Self {
        Self { unit: unit.to_string(), ucd: ucd.to_string(), ..Default::default() }
    }

    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn with_stc(mut self, frame: &str) -> Self {
        self.stc = Some(StcInfo::frame(frame));
        self
    }

    pub fn with_type(mut self, sql_type: &str) -> Self {
        self.sql_type = Some(sql_type.to_string());
        self
    }

    pub fn with_source(mut self, table: &str, column: &str) -> Self {
        self.user_data.push(ColumnSource { table: table.to_string(), column: column.to_string() });
        self
    }

    pub fn tainted(mut self) -> Self {
        self.tainted = true;
        self
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.is_empty()
    }

    /// Same metadata and same provenance.
    pub fn same_column(&self, other: &FieldInfo) -> bool {
        self == other && self.user_data == other.user_data
    }

    /// Metadata of `a * b` (or `a / b` when `divide` is set).
    pub fn from_mul_expression(divide: bool, a: &FieldInfo, b: &FieldInfo) -> FieldInfo {
        let user_data = concat_user_data([a, b]);
        let stc = combine_stc(a.stc.as_ref(), b.stc.as_ref());
        let sql_type = combine_types(a.sql_type.as_deref(), b.sql_type.as_deref());

        let (unit, ucd, tainted) = match (a.is_dimensionless(), b.is_dimensionless()) {
            (true, true) => (String::new(), String::new(), a.tainted || b.tainted),
            (true, false) => (b.unit.clone(), b.ucd.clone(), true),
            (false, true) => (a.unit.clone(), a.ucd.clone(), true),
            (false, false) => {
                let unit = if divide {
                    format!("{}/({})", a.unit, b.unit)
                } else {
                    format!("{}*{}", a.unit, b.unit)
                };
                (unit, String::new(), a.tainted || b.tainted)
            }
        };
        FieldInfo { unit, ucd, stc, tainted, user_data, sql_type }
    }

    /// Metadata of `a + b` or `a - b`.
    pub fn from_add_expression(a: &FieldInfo, b: &FieldInfo) -> FieldInfo {
        let user_data = concat_user_data([a, b]);
        let stc = combine_stc(a.stc.as_ref(), b.stc.as_ref());
        let sql_type = combine_types(a.sql_type.as_deref(), b.sql_type.as_deref());

        if a.unit == b.unit && a.ucd == b.ucd {
            FieldInfo { unit: a.unit.clone(), ucd: a.ucd.clone(), stc, tainted: false, user_data, sql_type }
        } else {
            FieldInfo { unit: String::new(), ucd: String::new(), stc, tainted: true, user_data, sql_type }
        }
    }

    /// Metadata of a set function (`COUNT`, `SUM`, `AVG`, `MIN`, `MAX`) applied to `arg`.
    pub fn from_set_function(name: &str, arg: Option<&FieldInfo>) -> FieldInfo {
        let base = arg.cloned().unwrap_or_default();
        let stat = |prefix: &str| if base.ucd.is_empty() {
            String::new()
        } else {
            format!("{};{}", prefix, base.ucd)
        };

        match name.to_uppercase().as_str() {
            "COUNT" => FieldInfo {
                unit: String::new(),
                ucd: "meta.number".to_string(),
                stc: None,
                tainted: false,
                user_data: base.user_data,
                sql_type: Some("bigint".to_string()),
            },
            "SUM" => FieldInfo { ucd: String::new(), ..base },
            "AVG" => FieldInfo {
                ucd: stat("stat.mean"),
                sql_type: base.sql_type.as_ref().map(|_| "double precision".to_string()),
                ..base.clone()
            },
            "MIN" => FieldInfo { ucd: stat("stat.min"), ..base.clone() },
            "MAX" => FieldInfo { ucd: stat("stat.max"), ..base.clone() },
            _ => FieldInfo { user_data: base.user_data, ..FieldInfo::dimensionless() },
        }
    }

    /// Metadata of a combination of operands of which nothing is known,
    /// like string concatenation: dimensionless, tainted once metadata was dropped.
    pub fn from_opaque<'a>(operands: impl IntoIterator<Item = &'a FieldInfo>) -> FieldInfo {
        let operands: Vec<&FieldInfo> = operands.into_iter().collect();
        FieldInfo {
            unit: String::new(),
            ucd: String::new(),
            stc: None,
            tainted: operands.iter().any(|fi| fi.tainted || !fi.unit.is_empty() || !fi.ucd.is_empty()),
            sql_type: opaque_type(&operands),
            user_data: concat_user_data(operands),
        }
    }
}

/// Type of an opaque combination; only known if every operand's type is.
fn opaque_type(operands: &[&FieldInfo]) -> Option<String> {
    if operands.is_empty() {
        return None;
    }
    let types: Option<Vec<&str>> = operands.iter().map(|fi| fi.sql_type.as_deref()).collect();
    types.map(|types| subsuming_type(types))
}

pub fn concat_user_data<'a>(infos: impl IntoIterator<Item = &'a FieldInfo>) -> Vec<ColumnSource> {
    infos.into_iter().flat_map(|fi| fi.user_data.iter().cloned()).collect()
}

/// Combines two frame references; differing concrete frames yield a broken marker.
pub fn combine_stc(a: Option<&StcInfo>, b: Option<&StcInfo>) -> Option<StcInfo> {
    match (a, b) {
        (None, None) => None,
        (Some(s), None) | (None, Some(s)) => Some(s.clone()),
        (Some(a), Some(_)) if a.is_broken() => Some(a.clone()),
        (Some(_), Some(b)) if b.is_broken() => Some(b.clone()),
        (Some(a), Some(b)) if a.frame == b.frame => Some(a.clone()),
        (Some(a), Some(b)) => Some(StcInfo {
            frame: a.frame.clone(),
            broken: Some(format!("ambiguous STC info: {} combined with {}", a.frame, b.frame)),
        }),
    }
}
