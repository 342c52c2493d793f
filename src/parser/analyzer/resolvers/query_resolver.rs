use std::rc::Rc;

use tracing::trace;

use crate::{
    catalog::FieldInfo,
    parser::{
        analyzer::{AnalysisContext, AnalyzerError, ExpressionResolver, FieldInfos, TableResolver},
        ast::{Child, Identifier, Node, NodeKind, QualifiedName},
    },
};

pub struct QueryResolver;

impl QueryResolver {
    /// Annotates a query specification: FROM first, so the select list
    /// and conditions see its columns, then every other clause in order.
    /// The result carries the select list's columns as its `FieldInfos`.
    pub fn annotate_query(query: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        let from = TableResolver::annotate_from(query.unique_child_of_kind(NodeKind::FromClause)?, ctx)?;
        let from_infos = from.field_infos().cloned().unwrap_or_default();

        ctx.push_scope(from_infos.clone());
        let result = Self::annotate_clauses(query, from, &from_infos, ctx);
        ctx.pop_scope();
        result
    }

    fn annotate_clauses(
        query: &Rc<Node>,
        from: Rc<Node>,
        from_infos: &FieldInfos,
        ctx: &mut AnalysisContext,
    ) -> Result<Rc<Node>, AnalyzerError> {
        let mut outputs = Rc::new(FieldInfos::new());
        let mut children = Vec::with_capacity(query.children().len());

        for child in query.children() {
            let node = match child {
                Child::Node(node) => node,
                Child::Token(_) => {
                    children.push(child.clone());
                    continue;
                }
            };
            let annotated = match node.kind() {
                NodeKind::FromClause => from.clone(),
                NodeKind::SelectList => {
                    let (list, columns) = Self::annotate_select_list(node, from_infos, ctx)?;
                    outputs = Rc::new(FieldInfos::for_query(columns));
                    list
                }
                NodeKind::GroupByClause | NodeKind::OrderByClause => {
                    ctx.expose_outputs(outputs.clone());
                    let annotated = ExpressionResolver::annotate(node, ctx);
                    ctx.hide_outputs();
                    annotated?
                }
                _ => ExpressionResolver::annotate(node, ctx)?,
            };
            children.push(annotated.into());
        }

        trace!(columns = outputs.len(), "query annotated");
        Ok(Rc::new(query.with_children(children).with_field_infos(outputs)))
    }

    /// Returns the annotated list and the columns it selects, with `*`
    /// and `t.*` expanded.
    fn annotate_select_list(
        list: &Rc<Node>,
        from_infos: &FieldInfos,
        ctx: &mut AnalysisContext,
    ) -> Result<(Rc<Node>, Vec<(Identifier, FieldInfo)>), AnalyzerError> {
        let mut columns = vec![];
        let mut children = Vec::with_capacity(list.children().len());

        for child in list.children() {
            match child {
                Child::Token(token) if token == "*" => {
                    columns.extend(from_infos.seq().iter().cloned());
                    children.push(child.clone());
                }
                Child::Token(_) => children.push(child.clone()),
                Child::Node(node) if node.kind() == NodeKind::QualifiedStar => {
                    let qualifier = Self::star_qualifier(node);
                    let table = ctx.locate_table(&qualifier)
                        .ok_or_else(|| AnalyzerError::TableNotFound(qualifier.to_sql()))?;
                    columns.extend(table.columns.iter().cloned());
                    children.push(child.clone());
                }
                Child::Node(node) => {
                    let annotated = ExpressionResolver::annotate(node, ctx)?;
                    let name = annotated.column_name()
                        .cloned()
                        .unwrap_or_else(|| Identifier::regular("expr"));
                    columns.push((name, annotated.field_info().cloned().unwrap_or_default()));
                    children.push(annotated.into());
                }
            }
        }
        Ok((Rc::new(list.with_children(children)), columns))
    }

    fn star_qualifier(star: &Node) -> QualifiedName {
        QualifiedName::new(star.children().iter()
            .filter_map(Child::token)
            .filter(|t| !matches!(*t, "." | "*"))
            .map(Identifier::from_lexeme)
            .collect())
    }
}
