use std::rc::Rc;

use tracing::debug;

use crate::parser::{
    analyzer::{AnalysisContext, AnalyzerError, ExpressionResolver, FieldInfos},
    ast::{Child, Identifier, JoinKind, Node, NodeKind},
};

pub struct TableResolver;

impl TableResolver {
    /// Annotates every FROM item; comma-separated items combine like a
    /// cross join.
    pub fn annotate_from(from: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        let mut infos: Option<FieldInfos> = None;
        let mut children = Vec::with_capacity(from.children().len());

        for child in from.children() {
            let Child::Node(item) = child else {
                children.push(child.clone());
                continue;
            };
            let annotated = Self::annotate_table_ref(item, ctx)?;
            let item_infos = annotated.field_infos().cloned().unwrap_or_default();
            infos = Some(match infos {
                None => (*item_infos).clone(),
                Some(previous) => FieldInfos::for_join(&JoinKind::Cross, &previous, &item_infos),
            });
            children.push(annotated.into());
        }

        let infos = Rc::new(infos.unwrap_or_default());
        Ok(Rc::new(from.with_children(children).with_field_infos(infos)))
    }

    pub fn annotate_table_ref(node: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        match node.kind() {
            NodeKind::PlainTableRef => Self::plain_table(node, ctx),
            NodeKind::DerivedTable => Self::derived_table(node, ctx),
            NodeKind::JoinedTable => Self::joined_table(node, ctx),
            _ => ExpressionResolver::annotate(node, ctx),
        }
    }

    fn plain_table(node: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        let name = node.table_name()
            .cloned()
            .ok_or_else(|| AnalyzerError::TableNotFound(node.flatten()))?;
        let columns = ctx.catalog.columns(&name)?;
        debug!(table = %name, columns = columns.len(), "table resolved");

        let infos = FieldInfos::for_table(name, node.correlation_name().cloned(), columns);
        Ok(Rc::new((**node).clone().with_field_infos(Rc::new(infos))))
    }

    /// A subquery in FROM; it sees enclosing queries but not its FROM siblings.
    fn derived_table(node: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        let alias = node.correlation_name()
            .cloned()
            .unwrap_or_else(|| Identifier::regular(""));
        let mut children = Vec::with_capacity(node.children().len());
        let mut query_infos = Rc::new(FieldInfos::new());

        for child in node.children() {
            match child {
                Child::Node(subquery) => {
                    let annotated = ExpressionResolver::annotate(subquery, ctx)?;
                    if let Some(infos) = annotated.field_infos() {
                        query_infos = infos.clone();
                    }
                    children.push(annotated.into());
                }
                Child::Token(_) => children.push(child.clone()),
            }
        }

        let infos = FieldInfos::for_derived(alias, &query_infos);
        Ok(Rc::new(node.with_children(children).with_field_infos(Rc::new(infos))))
    }

    fn joined_table(node: &Rc<Node>, ctx: &mut AnalysisContext) -> Result<Rc<Node>, AnalyzerError> {
        let kind = node.join_kind().cloned().unwrap_or(JoinKind::Cross);
        let mut children = Vec::with_capacity(node.children().len());
        let mut sides: Vec<Rc<FieldInfos>> = vec![];
        let mut spec: Option<(usize, Rc<Node>)> = None;

        for child in node.children() {
            match child {
                Child::Node(n) if n.kind() == NodeKind::JoinSpecification => {
                    spec = Some((children.len(), n.clone()));
                    children.push(child.clone());
                }
                Child::Node(n) => {
                    let annotated = Self::annotate_table_ref(n, ctx)?;
                    sides.push(annotated.field_infos().cloned().unwrap_or_default());
                    children.push(annotated.into());
                }
                Child::Token(_) => children.push(child.clone()),
            }
        }

        let infos = match sides.as_slice() {
            [inner] => (**inner).clone(),
            [left, right] => {
                if let JoinKind::Using(columns) = &kind {
                    Self::check_using(columns, left, right)?;
                }
                FieldInfos::for_join(&kind, left, right)
            }
            _ => FieldInfos::new(),
        };
        let infos = Rc::new(infos);

        // ON conditions see the columns of both sides
        if let Some((index, spec)) = spec {
            ctx.push_scope(infos.clone());
            let annotated = ExpressionResolver::annotate(&spec, ctx);
            ctx.pop_scope();
            if let Some(slot) = children.get_mut(index) {
                *slot = annotated?.into();
            }
        }

        Ok(Rc::new(node.with_children(children).with_field_infos(infos)))
    }

    fn check_using(columns: &[Identifier], left: &FieldInfos, right: &FieldInfos) -> Result<(), AnalyzerError> {
        for column in columns {
            for side in [left, right] {
                if side.get(column)?.is_none() {
                    return Err(AnalyzerError::ColumnNotFound { name: column.text.clone() });
                }
            }
        }
        Ok(())
    }
}
