use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::parser::WordComparer;

/// The keyword matchers of the grammar, built once per process.
pub static COMPARERS: Lazy<QueryComparers> = Lazy::new(QueryComparers::new);

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub top: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub natural: WordComparer,
    pub inner: WordComparer,
    pub left: WordComparer,
    pub right: WordComparer,
    pub full: WordComparer,
    pub outer: WordComparer,
    pub cross: WordComparer,
    pub join: WordComparer,
    pub on: WordComparer,
    pub using: WordComparer,
    pub r#where: WordComparer,
    pub group: WordComparer,
    pub by: WordComparer,
    pub having: WordComparer,
    pub order: WordComparer,
    pub asc: WordComparer,
    pub desc: WordComparer,
    pub offset: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub not: WordComparer,
    pub between: WordComparer,
    pub r#in: WordComparer,
    pub like: WordComparer,
    pub is: WordComparer,
    pub null: WordComparer,
    pub exists: WordComparer,
    pub concat: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::keyword("SELECT"),
            distinct: WordComparer::keyword("DISTINCT"),
            all: WordComparer::keyword("ALL"),
            top: WordComparer::keyword("TOP"),
            alias: WordComparer::keyword("AS"),
            from: WordComparer::keyword("FROM"),
            natural: WordComparer::keyword("NATURAL"),
            inner: WordComparer::keyword("INNER"),
            left: WordComparer::keyword("LEFT"),
            right: WordComparer::keyword("RIGHT"),
            full: WordComparer::keyword("FULL"),
            outer: WordComparer::keyword("OUTER"),
            cross: WordComparer::keyword("CROSS"),
            join: WordComparer::keyword("JOIN"),
            on: WordComparer::keyword("ON"),
            using: WordComparer::keyword("USING"),
            r#where: WordComparer::keyword("WHERE"),
            group: WordComparer::keyword("GROUP"),
            by: WordComparer::keyword("BY"),
            having: WordComparer::keyword("HAVING"),
            order: WordComparer::keyword("ORDER"),
            asc: WordComparer::keyword("ASC"),
            desc: WordComparer::keyword("DESC"),
            offset: WordComparer::keyword("OFFSET"),
            and: WordComparer::keyword("AND"),
            or: WordComparer::keyword("OR"),
            not: WordComparer::keyword("NOT"),
            between: WordComparer::keyword("BETWEEN"),
            r#in: WordComparer::keyword("IN"),
            like: WordComparer::keyword("LIKE"),
            is: WordComparer::keyword("IS"),
            null: WordComparer::keyword("NULL"),
            exists: WordComparer::keyword("EXISTS"),
            concat: WordComparer::new("||"),
        }
    }
}

static ADQL_RESERVED: &[&str] = &[
    "ABS", "ACOS", "AREA", "ASIN", "ATAN", "ATAN2", "BOX", "CEILING", "CENTROID",
    "CIRCLE", "CONTAINS", "COS", "COT", "DEGREES", "DISTANCE", "EXP", "FLOOR",
    "INTERSECTS", "LATITUDE", "LOG", "LOG10", "LONGITUDE", "COORD1", "COORD2",
    "COORDSYS", "MOD", "OFFSET", "PI", "POINT", "POLYGON", "POWER", "RADIANS",
    "RECTANGLE", "REGION", "RAND", "ROUND", "SIN", "SQUARE", "SQRT", "TOP", "TAN",
    "TRUNCATE",
];

static SQL_RESERVED: &[&str] = &[
    "ABSOLUTE", "ACTION", "ADD", "ALL", "ALLOCATE", "ALTER", "AND", "ANY",
    "ARE", "AS", "ASC", "ASSERTION", "AT", "AUTHORIZATION", "AVG", "BEGIN",
    "BETWEEN", "BIT", "BIT_LENGTH", "BOTH", "BY", "CASCADE", "CASCADED",
    "CASE", "CAST", "CATALOG", "CHAR", "CHARACTER", "CHAR_LENGTH",
    "CHARACTER_LENGTH", "CHECK", "CLOSE", "COALESCE", "COLLATE",
    "COLLATION", "COLUMN", "COMMIT", "CONNECT", "CONNECTION", "CONSTRAINT",
    "CONSTRAINTS", "CONTINUE", "CONVERT", "CORRESPONDING", "COUNT",
    "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATE", "DAY",
    "DEALLOCATE", "DECIMAL", "DECLARE", "DEFAULT", "DEFERRABLE", "DEFERRED",
    "DELETE", "DESC", "DESCRIBE", "DESCRIPTOR", "DIAGNOSTICS", "DISCONNECT",
    "DISTINCT", "DOMAIN", "DOUBLE", "DROP", "ELSE", "END", "END-EXEC",
    "ESCAPE", "EXCEPT", "EXCEPTION", "EXEC", "EXECUTE", "EXISTS",
    "EXTERNAL", "EXTRACT", "FALSE", "FETCH", "FIRST", "FLOAT", "FOR",
    "FOREIGN", "FOUND", "FROM", "FULL", "GET", "GLOBAL", "GO", "GOTO",
    "GRANT", "GROUP", "HAVING", "HOUR", "IDENTITY", "IMMEDIATE", "IN",
    "INDICATOR", "INITIALLY", "INNER", "INPUT", "INSENSITIVE", "INSERT",
    "INT", "INTEGER", "INTERSECT", "INTERVAL", "INTO", "IS", "ISOLATION",
    "JOIN", "KEY", "LANGUAGE", "LAST", "LEADING", "LEFT", "LEVEL", "LIKE",
    "LOCAL", "LOWER", "MATCH", "MAX", "MIN", "MINUTE", "MODULE", "MONTH",
    "NAMES", "NATIONAL", "NATURAL", "NCHAR", "NEXT", "NO", "NOT", "NULL",
    "NULLIF", "NUMERIC", "OCTET_LENGTH", "OF", "ON", "ONLY", "OPEN",
    "OPTION", "OR", "ORDER", "OUTER", "OUTPUT", "OVERLAPS", "PAD",
    "PARTIAL", "POSITION", "PRECISION", "PREPARE", "PRESERVE", "PRIMARY",
    "PRIOR", "PRIVILEGES", "PROCEDURE", "PUBLIC", "READ", "REAL",
    "REFERENCES", "RELATIVE", "RESTRICT", "REVOKE", "RIGHT", "ROLLBACK",
    "ROWS", "SCHEMA", "SCROLL", "SECOND", "SECTION", "SELECT", "SESSION",
    "SESSION_USER", "SET", "SIZE", "SMALLINT", "SOME", "SPACE", "SQL",
    "SQLCODE", "SQLERROR", "SQLSTATE", "SUBSTRING", "SUM", "SYSTEM_USER",
    "TABLE", "TEMPORARY", "THEN", "TIME", "TIMESTAMP", "TIMEZONE_HOUR",
    "TIMEZONE_MINUTE", "TO", "TRAILING", "TRANSACTION", "TRANSLATE",
    "TRANSLATION", "TRIM", "TRUE", "UNION", "UNIQUE", "UNKNOWN", "UPDATE",
    "UPPER", "USAGE", "USER", "USING", "VALUE", "VALUES", "VARCHAR",
    "VARYING", "VIEW", "WHEN", "WHENEVER", "WHERE", "WITH", "WORK", "WRITE",
    "YEAR", "ZONE",
];

/// SQL-92 and ADQL reserved words, uppercase.
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ADQL_RESERVED.iter().chain(SQL_RESERVED.iter()).copied().collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word.to_uppercase().as_str())
}

/// How the arguments of a built-in function are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionClass {
    /// `NAME()`
    Nullary,
    /// `NAME(x)`
    Unary,
    /// `NAME(x, y)`
    Binary,
    /// `RAND([seed])`
    Rand,
    /// `ROUND(x[, n])`, `TRUNCATE(x[, n])`
    Rounding,
    /// `AVG`, `MAX`, `MIN`, `SUM`, `COUNT`
    SetFunction,
    /// `CONTAINS`, `INTERSECTS`
    GeometryPredicate,
    Distance,
    /// `COORD1`, `COORD2`, `COORDSYS`
    PointAccessor,
    Area,
    Centroid,
    Point,
    Circle,
    Box,
    Polygon,
    Region,
}

static FUNCTION_CLASSES: Lazy<HashMap<&'static str, FunctionClass>> = Lazy::new(|| {
    let mut classes = HashMap::new();
    classes.insert("PI", FunctionClass::Nullary);
    for name in ["ACOS", "ASIN", "ATAN", "COS", "COT", "SIN", "TAN", "ABS", "CEILING",
        "DEGREES", "EXP", "FLOOR", "LOG", "LOG10", "RADIANS", "SQUARE", "SQRT"] {
        classes.insert(name, FunctionClass::Unary);
    }
    for name in ["ATAN2", "POWER", "MOD"] {
        classes.insert(name, FunctionClass::Binary);
    }
    classes.insert("RAND", FunctionClass::Rand);
    classes.insert("ROUND", FunctionClass::Rounding);
    classes.insert("TRUNCATE", FunctionClass::Rounding);
    for name in ["AVG", "MAX", "MIN", "SUM", "COUNT"] {
        classes.insert(name, FunctionClass::SetFunction);
    }
    classes.insert("CONTAINS", FunctionClass::GeometryPredicate);
    classes.insert("INTERSECTS", FunctionClass::GeometryPredicate);
    classes.insert("DISTANCE", FunctionClass::Distance);
    for name in ["COORD1", "COORD2", "COORDSYS"] {
        classes.insert(name, FunctionClass::PointAccessor);
    }
    classes.insert("AREA", FunctionClass::Area);
    classes.insert("CENTROID", FunctionClass::Centroid);
    classes.insert("POINT", FunctionClass::Point);
    classes.insert("CIRCLE", FunctionClass::Circle);
    classes.insert("BOX", FunctionClass::Box);
    classes.insert("RECTANGLE", FunctionClass::Box);
    classes.insert("POLYGON", FunctionClass::Polygon);
    classes.insert("REGION", FunctionClass::Region);
    classes
});

pub fn function_class(name: &str) -> Option<FunctionClass> {
    FUNCTION_CLASSES.get(name.to_uppercase().as_str()).copied()
}
