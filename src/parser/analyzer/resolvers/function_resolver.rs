use crate::{
    catalog::{concat_user_data, FieldInfo},
    parser::{
        analyzer::{info_of, AnalysisContext, AnalyzerError},
        ast::Node,
    },
};

/// How a numeric function's result relates to its first argument.
enum Propagation {
    /// same unit and UCD
    Keep,
    /// new unit, same UCD
    Unit(&'static str),
    /// new unit and UCD
    Replace(&'static str, &'static str),
    Dimensionless,
    /// nothing is known about the function
    Unknown,
}

fn propagation(name: &str) -> Propagation {
    match name {
        "ABS" | "CEILING" | "FLOOR" | "ROUND" | "TRUNCATE" | "MOD" => Propagation::Keep,
        "DEGREES" => Propagation::Unit("deg"),
        "RADIANS" => Propagation::Unit("rad"),
        "ACOS" | "ASIN" | "ATAN" | "ATAN2" => Propagation::Replace("rad", ""),
        "PI" | "RAND" | "EXP" | "LOG" | "LOG10" | "SQRT" | "SQUARE" | "POWER" => Propagation::Dimensionless,
        _ => Propagation::Unknown,
    }
}

pub struct FunctionResolver;

impl FunctionResolver {
    /// Metadata of a built-in numeric function. The result is tainted if
    /// an argument is, or if the function forces or drops a unit.
    pub fn numeric_function(node: &Node) -> FieldInfo {
        let args: Vec<FieldInfo> = (0..node.arguments().len())
            .map(|i| node.argument(i).map(|a| info_of(a)).unwrap_or_default())
            .collect();
        let user_data = concat_user_data(&args);
        let first = args.first().cloned().unwrap_or_default();
        let inherited = args.iter().any(|a| a.tainted);

        let name = node.function_name().unwrap_or_default();
        let (info, forced) = match propagation(name) {
            Propagation::Keep => (FieldInfo {
                stc: first.stc.clone(),
                sql_type: first.sql_type.clone(),
                ..FieldInfo::new(&first.unit, &first.ucd)
            }, false),
            Propagation::Unit(unit) => (FieldInfo::new(unit, &first.ucd), true),
            Propagation::Replace(unit, ucd) => (FieldInfo::new(unit, ucd), true),
            Propagation::Dimensionless => (FieldInfo::dimensionless(), args.iter().any(|a| !a.is_dimensionless())),
            Propagation::Unknown => (FieldInfo::dimensionless(), false),
        };
        let sql_type = match info.sql_type {
            Some(kept) => Some(kept),
            None if forced || matches!(propagation(name), Propagation::Dimensionless) => Some("double precision".to_string()),
            None => None,
        };
        FieldInfo { user_data, tainted: inherited || forced, sql_type, ..info }
    }

    /// Metadata of a user defined function; unknown names or wrong
    /// argument counts are errors.
    pub fn user_function(node: &Node, ctx: &AnalysisContext) -> Result<FieldInfo, AnalyzerError> {
        let name = node.function_name().unwrap_or_default();
        let ufunc = ctx.ufuncs.checked(name, node.arguments().len())?;
        let args: Vec<FieldInfo> = (0..node.arguments().len())
            .filter_map(|i| node.argument(i).map(|a| info_of(a)))
            .collect();
        Ok(FieldInfo { user_data: concat_user_data(&args), ..ufunc.field_info() })
    }
}
