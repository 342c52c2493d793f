use std::fmt;

/// The closed set of parse tree node kinds, one per grammar production
/// that survives into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    QuerySpecification,
    SelectList,
    DerivedColumn,
    QualifiedStar,
    FromClause,
    TableName,
    PlainTableRef,
    DerivedTable,
    JoinedTable,
    JoinSpecification,
    Subquery,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    SortSpecification,

    SearchCondition,
    BooleanTerm,
    BooleanFactor,
    BooleanPrimary,
    ComparisonPredicate,
    BetweenPredicate,
    InPredicate,
    InValueList,
    LikePredicate,
    NullPredicate,
    ExistsPredicate,

    NumericValueExpression,
    Term,
    Factor,
    CharacterValueExpression,
    ColumnReference,
    UnsignedLiteral,
    CharacterStringLiteral,
    CountAll,
    SetFunction,
    NumericValueFunction,
    UserDefinedFunction,

    PredicateGeometryFunction,
    Distance,
    PointFunction,
    Area,
    Centroid,
    Point,
    Circle,
    Rectangle,
    Polygon,
    Region,
    StcRegion,

    SqlLiteral,
}

impl NodeKind {
    /// The grammar symbol this kind stands for.
    pub fn symbol(&self) -> &'static str {
        match self {
            NodeKind::QuerySpecification => "querySpecification",
            NodeKind::SelectList => "selectList",
            NodeKind::DerivedColumn => "derivedColumn",
            NodeKind::QualifiedStar => "qualifiedStar",
            NodeKind::FromClause => "fromClause",
            NodeKind::TableName => "tableName",
            NodeKind::PlainTableRef => "possiblyAliasedTable",
            NodeKind::DerivedTable => "derivedTable",
            NodeKind::JoinedTable => "joinedTable",
            NodeKind::JoinSpecification => "joinSpecification",
            NodeKind::Subquery => "subquery",
            NodeKind::WhereClause => "whereClause",
            NodeKind::GroupByClause => "groupByClause",
            NodeKind::HavingClause => "havingClause",
            NodeKind::OrderByClause => "orderByClause",
            NodeKind::SortSpecification => "sortSpecification",
            NodeKind::SearchCondition => "searchCondition",
            NodeKind::BooleanTerm => "booleanTerm",
            NodeKind::BooleanFactor => "booleanFactor",
            NodeKind::BooleanPrimary => "booleanPrimary",
            NodeKind::ComparisonPredicate => "comparisonPredicate",
            NodeKind::BetweenPredicate => "betweenPredicate",
            NodeKind::InPredicate => "inPredicate",
            NodeKind::InValueList => "inValueList",
            NodeKind::LikePredicate => "likePredicate",
            NodeKind::NullPredicate => "nullPredicate",
            NodeKind::ExistsPredicate => "existsPredicate",
            NodeKind::NumericValueExpression => "numericValueExpression",
            NodeKind::Term => "term",
            NodeKind::Factor => "factor",
            NodeKind::CharacterValueExpression => "characterValueExpression",
            NodeKind::ColumnReference => "columnReference",
            NodeKind::UnsignedLiteral => "unsignedLiteral",
            NodeKind::CharacterStringLiteral => "characterStringLiteral",
            NodeKind::CountAll => "countAll",
            NodeKind::SetFunction => "setFunctionSpecification",
            NodeKind::NumericValueFunction => "numericValueFunction",
            NodeKind::UserDefinedFunction => "userDefinedFunction",
            NodeKind::PredicateGeometryFunction => "predicateGeometryFunction",
            NodeKind::Distance => "distanceFunction",
            NodeKind::PointFunction => "pointFunction",
            NodeKind::Area => "area",
            NodeKind::Centroid => "centroid",
            NodeKind::Point => "point",
            NodeKind::Circle => "circle",
            NodeKind::Rectangle => "rectangle",
            NodeKind::Polygon => "polygon",
            NodeKind::Region => "region",
            NodeKind::StcRegion => "stcRegion",
            NodeKind::SqlLiteral => "sqlLiteral",
        }
    }

    /// Productions that stand aside when they matched exactly one node.
    pub fn is_collapsible(&self) -> bool {
        matches!(self,
            NodeKind::NumericValueExpression
                | NodeKind::Term
                | NodeKind::Factor
                | NodeKind::CharacterValueExpression
                | NodeKind::SearchCondition
                | NodeKind::BooleanTerm
                | NodeKind::BooleanFactor)
    }

    /// Calls rendered as `NAME(arg, ...)`, carrying a function name and
    /// split arguments.
    pub fn is_functional(&self) -> bool {
        matches!(self,
            NodeKind::SetFunction
                | NodeKind::NumericValueFunction
                | NodeKind::UserDefinedFunction
                | NodeKind::PredicateGeometryFunction
                | NodeKind::Distance
                | NodeKind::PointFunction
                | NodeKind::Area
                | NodeKind::Centroid
                | NodeKind::Point
                | NodeKind::Circle
                | NodeKind::Rectangle
                | NodeKind::Polygon
                | NodeKind::Region)
    }

    /// Geometry literals whose first argument names a coordinate frame.
    pub fn is_geometry_literal(&self) -> bool {
        matches!(self,
            NodeKind::Point | NodeKind::Circle | NodeKind::Rectangle | NodeKind::Polygon)
    }

    /// Value-producing nodes that receive a `FieldInfo` during annotation.
    pub fn has_field_info(&self) -> bool {
        matches!(self,
            NodeKind::DerivedColumn
                | NodeKind::NumericValueExpression
                | NodeKind::Term
                | NodeKind::Factor
                | NodeKind::CharacterValueExpression
                | NodeKind::ColumnReference
                | NodeKind::UnsignedLiteral
                | NodeKind::CharacterStringLiteral
                | NodeKind::CountAll
                | NodeKind::SetFunction
                | NodeKind::NumericValueFunction
                | NodeKind::UserDefinedFunction
                | NodeKind::PredicateGeometryFunction
                | NodeKind::Distance
                | NodeKind::PointFunction
                | NodeKind::Area
                | NodeKind::Centroid
                | NodeKind::Point
                | NodeKind::Circle
                | NodeKind::Rectangle
                | NodeKind::Polygon
                | NodeKind::Region
                | NodeKind::StcRegion)
    }

    /// Nodes exposing a column scope (`FieldInfos`) after annotation.
    pub fn is_column_bearing(&self) -> bool {
        matches!(self,
            NodeKind::QuerySpecification
                | NodeKind::FromClause
                | NodeKind::PlainTableRef
                | NodeKind::DerivedTable
                | NodeKind::JoinedTable
                | NodeKind::Subquery)
    }

    /// Kinds whose derived attributes are set by their producer and cannot
    /// be recomputed from children.
    pub fn has_intrinsic_attrs(&self) -> bool {
        matches!(self, NodeKind::SqlLiteral | NodeKind::StcRegion)
    }

    /// Kinds whose flattened form glues children without spaces.
    pub fn is_dotted(&self) -> bool {
        matches!(self,
            NodeKind::ColumnReference
                | NodeKind::TableName
                | NodeKind::QualifiedStar
                | NodeKind::SqlLiteral)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
