use std::rc::Rc;

use tracing::debug;

use crate::{
    catalog::pgsphere_trafo,
    morph::{
        helpers::{collapse_comparison, select_boolean},
        MorphError, MorphState, Morpher,
    },
    parser::ast::{attrs::quote_string, Child, Node, NodeKind},
    region::StcRegion,
    ufuncs::UfuncRegistry,
};

macro_rules! parts {
    ($($part:expr),* $(,)?) => { [$(Part::from($part)),*] };
}

/// Square degrees per steradian; pgsphere areas come in steradians.
const SQ_DEG_PER_SR: &str = "3282.806350011744";

/// Rewrites ADQL geometry and function calls into PostgreSQL with the
/// pgsphere extension.
pub fn morph_pgsphere(tree: &Rc<Node>, ufuncs: &UfuncRegistry) -> Result<(MorphState, Rc<Node>), MorphError> {
    check_centroids(tree)?;

    let morpher = Morpher::new()
        .on(NodeKind::Point, |node, _| Ok(point(node)))
        .on(NodeKind::Circle, |node, _| Ok(circle(node)))
        .on(NodeKind::Rectangle, |node, _| Ok(rectangle(node)))
        .on(NodeKind::Polygon, |node, _| Ok(polygon(node)))
        .on(NodeKind::StcRegion, |node, _| Ok(stc_literal(node)))
        .on(NodeKind::PredicateGeometryFunction, predicate)
        .on(NodeKind::Distance, |node, _| Ok(template(node, &parts!["DEGREES((", 0usize, ") <-> (", 1usize, "))"])))
        .on(NodeKind::Area, |node, _| Ok(template(node, &parts![SQ_DEG_PER_SR, "*AREA(", 0usize, ")"])))
        .on(NodeKind::Centroid, |node, _| Ok(template(node, &parts!["@@(", 0usize, ")"])))
        .on(NodeKind::PointFunction, |node, _| Ok(point_function(node)))
        .on(NodeKind::NumericValueFunction, |node, _| Ok(numeric_function(node)))
        .on(NodeKind::UserDefinedFunction, |node, _| user_function(node, ufuncs))
        .on(NodeKind::ComparisonPredicate, collapse_comparison)
        .on(NodeKind::DerivedColumn, select_boolean);
    let (state, tree) = morpher.morph(tree)?;
    if state.has_pending() {
        return Err(MorphError::PseudoBooleanComparison("against 0 or 1".to_string()));
    }

    if tree.find_first(NodeKind::StcRegion).is_some() {
        return Err(MorphError::Unsupported(
            "Cannot serialize STC-S. Did you use Union or Intersection outside of CONTAINS or INTERSECTS?".to_string()));
    }
    debug!("pgsphere pass done");
    Ok((state, tree))
}

/// A template part: literal text or the index of an argument.
#[derive(Clone, Copy)]
enum Part<'a> {
    Text(&'a str),
    Arg(usize),
}

impl<'a> From<&'a str> for Part<'a> {
    fn from(text: &'a str) -> Self {
        Part::Text(text)
    }
}

impl From<usize> for Part<'_> {
    fn from(index: usize) -> Self {
        Part::Arg(index)
    }
}

/// The `index`-th argument of a call as a template child; arguments that
/// are not a single node fall back to their text.
fn arg(node: &Node, index: usize) -> Child {
    match node.argument(index) {
        Some(arg) => arg.clone().into(),
        None => node.arguments().get(index).cloned().unwrap_or_default().into(),
    }
}

fn template(node: &Node, parts: &[Part]) -> Rc<Node> {
    let children = parts.iter()
        .map(|part| match *part {
            Part::Text(text) => text.into(),
            Part::Arg(index) => arg(node, index),
        })
        .collect();
    Node::sql_template(node, children)
}

fn point(node: &Rc<Node>) -> Rc<Node> {
    template(node, &parts!["spoint(RADIANS(", 1usize, "), RADIANS(", 2usize, "))"])
}

fn circle(node: &Rc<Node>) -> Rc<Node> {
    template(node, &parts!["scircle(spoint(RADIANS(", 1usize, "), RADIANS(", 2usize, ")), RADIANS(", 3usize, "))"])
}

/// `spoly` built from an ordered list of `spoint` vertices.
fn spoly(node: &Node, vertices: Vec<Vec<Child>>) -> Rc<Node> {
    let mut children: Vec<Child> = vec!["(SELECT spoly(q.p) FROM (VALUES ".into()];
    for (index, vertex) in vertices.into_iter().enumerate() {
        if index > 0 {
            children.push(", ".into());
        }
        children.push(format!("({}, spoint(", index).into());
        children.extend(vertex);
        children.push("))".into());
    }
    children.push(" ORDER BY column1) as q(ind,p))".into());
    Node::sql_template(node, children)
}

fn rectangle(node: &Rc<Node>) -> Rc<Node> {
    let corner = |x_sign: &str, y_sign: &str| -> Vec<Child> {
        vec![
            "RADIANS(".into(), arg(node, 1), format!("){}RADIANS(", x_sign).into(), arg(node, 3), ")/2, ".into(),
            "RADIANS(".into(), arg(node, 2), format!("){}RADIANS(", y_sign).into(), arg(node, 4), ")/2".into(),
        ]
    };
    spoly(node, vec![corner("-", "-"), corner("-", "+"), corner("+", "+"), corner("+", "-")])
}

fn polygon(node: &Rc<Node>) -> Rc<Node> {
    let vertices = (1..node.arguments().len())
        .step_by(2)
        .map(|index| vec![
            "RADIANS(".into(), arg(node, index), "), RADIANS(".into(), arg(node, index + 1), ")".into(),
        ])
        .collect();
    spoly(node, vertices)
}

/// Simple STC-S shapes become constants; compound ones wait for the
/// predicate that distributes them.
fn stc_literal(node: &Rc<Node>) -> Rc<Node> {
    match node.region().and_then(StcRegion::to_pgsphere) {
        Some(literal) => Node::sql_literal_for(node, literal),
        None => node.clone(),
    }
}

fn compound(node: &Node) -> Option<&StcRegion> {
    node.region().filter(|region| region.is_compound())
}

/// `operand`, moved into another frame if `trafo` says so.
fn transformed(operand: &Rc<Node>, trafo: Option<&str>) -> Vec<Child> {
    match trafo {
        Some(trafo) => vec!["(".into(), operand.clone().into(), format!("){}", trafo).into()],
        None => vec![operand.clone().into()],
    }
}

/// CONTAINS and INTERSECTS become pgsphere operators. A frame
/// transformation goes on the first operand, or on the second one when
/// the first is a compound region spelled out as boolean logic.
fn predicate(node: &Rc<Node>, state: &mut MorphState) -> Result<Rc<Node>, MorphError> {
    let operator = match node.function_name() {
        Some("CONTAINS") => "@",
        Some("INTERSECTS") => "&&",
        _ => return Ok(node.clone()),
    };
    let (Some(first), Some(second)) = (node.argument(0), node.argument(1)) else {
        return Ok(node.clone());
    };
    let trafo = pgsphere_trafo(first.frame(), second.frame())?;

    let children = match (compound(first), compound(second)) {
        (Some(_), Some(_)) => return Err(MorphError::NoDualTransform),
        (Some(region), None) => {
            let other = transformed(second, trafo.as_deref());
            region.as_logic(&|literal| {
                let mut parts: Vec<Child> = vec![format!("({} {} (", literal, operator).into()];
                parts.extend(other.iter().cloned());
                parts.push("))".into());
                parts
            })
        }
        (None, Some(region)) => {
            let other = transformed(first, trafo.as_deref());
            region.as_logic(&|literal| {
                let mut parts: Vec<Child> = vec!["((".into()];
                parts.extend(other.iter().cloned());
                parts.push(format!(") {} {})", operator, literal).into());
                parts
            })
        }
        (None, None) => {
            let mut parts: Vec<Child> = vec!["((".into()];
            parts.extend(transformed(first, trafo.as_deref()));
            parts.push(format!(") {} (", operator).into());
            parts.push(second.clone().into());
            parts.push("))".into());
            parts
        }
    };

    let replacement = Node::sql_template(node, children);
    state.signal_boolean(&replacement);
    Ok(replacement)
}

fn point_function(node: &Rc<Node>) -> Rc<Node> {
    match node.function_name() {
        Some("COORD1") => template(node, &parts!["DEGREES(long(", 0usize, "))"]),
        Some("COORD2") => template(node, &parts!["DEGREES(lat(", 0usize, "))"]),
        Some("COORDSYS") => {
            let frame = node.argument(0)
                .and_then(|arg| arg.frame())
                .filter(|frame| !frame.is_empty())
                .unwrap_or("UNKNOWN");
            Node::sql_literal_for(node, quote_string(frame))
        }
        _ => node.clone(),
    }
}

/// Renames and emulations for functions PostgreSQL spells differently
/// or lacks.
fn numeric_function(node: &Rc<Node>) -> Rc<Node> {
    let arity = node.arguments().len();
    match (node.function_name(), arity) {
        (Some("LOG10"), 1) => template(node, &parts!["LOG(", 0usize, ")"]),
        (Some("LOG"), 1) => template(node, &parts!["LN(", 0usize, ")"]),
        (Some("RAND"), 0) => Node::sql_literal_for(node, "random()"),
        (Some("RAND"), 1) => template(node, &parts![
            "(SELECT random() FROM (SELECT setseed(", 0usize, "/2147483647.0)) AS seed)"]),
        (Some("ROUND"), 2) => template(node, &parts![
            "ROUND((", 0usize, ")*10^(", 1usize, ")) / 10^(", 1usize, ")"]),
        (Some("TRUNCATE"), 1) => template(node, &parts!["TRUNC(", 0usize, ")"]),
        (Some("TRUNCATE"), 2) => template(node, &parts![
            "TRUNC((", 0usize, ")*10^(", 1usize, ")) / 10^(", 1usize, ")"]),
        (Some("SQUARE"), 1) => template(node, &parts!["(", 0usize, ")^2"]),
        _ => node.clone(),
    }
}

fn user_function(node: &Rc<Node>, ufuncs: &UfuncRegistry) -> Result<Rc<Node>, MorphError> {
    let name = node.function_name().unwrap_or_default();
    let arity = node.arguments().len();
    let ufunc = ufuncs.checked(name, arity)?;
    let args: Vec<Child> = (0..arity).map(|index| arg(node, index)).collect();
    Ok(Node::sql_template(node, ufunc.expand(&args)))
}

/// pgsphere only knows the centers of circles and points.
fn check_centroids(tree: &Node) -> Result<(), MorphError> {
    for centroid in tree.find_all(NodeKind::Centroid) {
        let supported = match centroid.argument(0) {
            Some(arg) => match arg.kind() {
                NodeKind::Rectangle | NodeKind::Polygon => false,
                NodeKind::StcRegion => arg.region().is_some_and(StcRegion::has_center),
                _ => true,
            },
            None => true,
        };
        if !supported {
            return Err(MorphError::Unsupported(
                "Can only compute centroids of circles and points yet.".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parser::parse,
        region::RegionRegistry,
    };
    use pretty_assertions::assert_eq;

    fn morph(query: &str) -> Result<String, MorphError> {
        let tree = parse(query).expect("Failed to parse query");
        let tree = RegionRegistry::with_defaults().resolve_regions(&tree).expect("Failed to resolve regions");
        morph_pgsphere(&tree, &UfuncRegistry::default_registry()).map(|(_, tree)| tree.flatten())
    }

    fn morphed(query: &str) -> String {
        morph(query).expect("Failed to morph")
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            morphed("select point('ICRS', 1, 2), circle('ICRS', 2, 3, 4) from foo"),
            "SELECT spoint(RADIANS(1), RADIANS(2)), scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4)) FROM foo");
    }

    #[test]
    fn test_box_and_polygon() {
        assert_eq!(
            morphed("select box('ICRS', 2, 3, 4, 5) from foo"),
            "SELECT (SELECT spoly(q.p) FROM (VALUES \
                (0, spoint(RADIANS(2)-RADIANS(4)/2, RADIANS(3)-RADIANS(5)/2)), \
                (1, spoint(RADIANS(2)-RADIANS(4)/2, RADIANS(3)+RADIANS(5)/2)), \
                (2, spoint(RADIANS(2)+RADIANS(4)/2, RADIANS(3)+RADIANS(5)/2)), \
                (3, spoint(RADIANS(2)+RADIANS(4)/2, RADIANS(3)-RADIANS(5)/2)) \
                ORDER BY column1) as q(ind,p)) FROM foo");
        assert_eq!(
            morphed("select polygon('ICRS', 2, 3, 4, 5, 6, 7) from foo"),
            "SELECT (SELECT spoly(q.p) FROM (VALUES \
                (0, spoint(RADIANS(2), RADIANS(3))), \
                (1, spoint(RADIANS(4), RADIANS(5))), \
                (2, spoint(RADIANS(6), RADIANS(7))) \
                ORDER BY column1) as q(ind,p)) FROM foo");
    }

    #[test]
    fn test_frame_transformation() {
        assert_eq!(
            morphed("select * from foo where 1=CONTAINS(POINT('fk4', 1, 2), CIRCLE('Galactic', 2, 3, 4))"),
            "SELECT * FROM foo WHERE (((spoint(RADIANS(1), RADIANS(2)))\
                -strans(1.565186,-0.004859,-1.576368)+strans(1.346356,-1.097319,0.574771)) \
                @ (scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4))))");
    }

    #[test]
    fn test_negated_intersects() {
        assert_eq!(
            morphed("select * from foo where 0=INTERSECTS(CIRCLE('ICRS', 2, 3, 4), POLYGON('ICRS', 2, 3, 4, 5, 6, 7))"),
            "SELECT * FROM foo WHERE NOT ((scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4))) && \
                ((SELECT spoly(q.p) FROM (VALUES (0, spoint(RADIANS(2), RADIANS(3))), \
                (1, spoint(RADIANS(4), RADIANS(5))), (2, spoint(RADIANS(6), RADIANS(7))) \
                ORDER BY column1) as q(ind,p))))");
    }

    #[test]
    fn test_selected_predicate() {
        assert_eq!(
            morphed("select contains(coverage, circle('', 10, 10, 1)) from data"),
            "SELECT CASE WHEN ((coverage) @ (scircle(spoint(RADIANS(10), RADIANS(10)), RADIANS(1)))) \
                THEN 1 ELSE 0 END FROM data");
        assert_eq!(
            morphed("select contains(coverage, circle('', 10, 10, 1)) != 1 as outside from data"),
            "SELECT CASE WHEN NOT ((coverage) @ (scircle(spoint(RADIANS(10), RADIANS(10)), RADIANS(1)))) \
                THEN 1 ELSE 0 END AS outside FROM data");
    }

    #[test]
    fn test_unconsumed_predicate_is_rejected() {
        for query in [
            "select * from foo where contains(point('ICRS', 1, 2), circle('ICRS', 1, 2, 3))+1=2",
            "select ABS(contains(coverage, circle('', 10, 10, 1))) from data",
        ] {
            match morph(query) {
                Err(MorphError::PseudoBooleanComparison(message)) => assert_eq!(message, "against 0 or 1"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_point_functions() {
        assert_eq!(
            morphed("select DISTANCE(p1, p2), centroid(circle('ICRS', coord1(p1), coord2(p1), 5)) from foo"),
            "SELECT DEGREES((p1) <-> (p2)), @@(scircle(spoint(RADIANS(DEGREES(long(p1))), \
                RADIANS(DEGREES(lat(p1)))), RADIANS(5))) FROM foo");
        assert_eq!(
            morphed("select AREA(circle('ICRS', 1, 2, 3)), coordsys(point('fk5', 1, 2)), coordsys(p) from foo"),
            "SELECT 3282.806350011744*AREA(scircle(spoint(RADIANS(1), RADIANS(2)), RADIANS(3))), \
                'FK5', 'UNKNOWN' FROM foo");
    }

    #[test]
    fn test_numeric_functions() {
        assert_eq!(morphed("select log10(x), log(x), rand(), truncate(x) from foo"),
            "SELECT LOG(x), LN(x), random(), TRUNC(x) FROM foo");
        assert_eq!(morphed("select round(x, 2), truncate(x, -2) from foo"),
            "SELECT ROUND((x)*10^(2)) / 10^(2), TRUNC((x)*10^(-2)) / 10^(-2) FROM foo");
        assert_eq!(morphed("select truncate(round((x*2)+y, 4)) from foo"),
            "SELECT TRUNC(ROUND((( x * 2 ) + y)*10^(4)) / 10^(4)) FROM foo");
        assert_eq!(morphed("select square(x + x), rand(5), round(x) from foo"),
            "SELECT (x + x)^2, (SELECT random() FROM (SELECT setseed(5/2147483647.0)) AS seed), ROUND(x) FROM foo");
    }

    #[test]
    fn test_user_functions() {
        assert_eq!(morphed("select * from foo where gavo_match('x.*', name)=1"),
            "SELECT * FROM foo WHERE (CASE WHEN name ~ 'x.*' THEN 1 ELSE 0 END) = 1");
    }

    #[test]
    fn test_stcs_literals() {
        assert_eq!(
            morphed("select * from foo where 1=CONTAINS(REGION('Position ICRS 1 2'), x)"),
            "SELECT * FROM foo WHERE ((spoint '(0.0174532925,0.0349065850)') @ (x))");
        assert_eq!(
            morphed("select * from foo where 1=INTERSECTS(REGION('NOT (circle  1 2 3)'), x)"),
            "SELECT * FROM foo WHERE NOT ((scircle '< (0.0174532925, 0.0349065850), 0.0523598776 >' && (x)))");
    }

    #[test]
    fn test_compound_stcs() {
        assert_eq!(
            morphed("select * from foo where 1=CONTAINS(\
                REGION('Union ICRS (Position 1 2 Intersection (circle 1 2 3 box 1 2 3 4 circle 1 2 3))'), \
                circle('Galactic', 2, 3, 4))"),
            "SELECT * FROM foo WHERE \
                ((spoint '(0.0174532925,0.0349065850)' @ ((scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4)))\
                +strans(1.346356,-1.097319,0.574771)))) OR \
                (((scircle '< (0.0174532925, 0.0349065850), 0.0523598776 >' @ ((scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4)))\
                +strans(1.346356,-1.097319,0.574771)))) AND \
                ((spoly '{(-0.0087266463,0.0000000000),(-0.0087266463,0.0698131701),(0.0436332313,0.0698131701),(0.0436332313,0.0000000000)}' \
                @ ((scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4)))+strans(1.346356,-1.097319,0.574771)))) AND \
                ((scircle '< (0.0174532925, 0.0349065850), 0.0523598776 >' @ ((scircle(spoint(RADIANS(2), RADIANS(3)), RADIANS(4)))\
                +strans(1.346356,-1.097319,0.574771)))))");
    }

    #[test]
    fn test_unsupported_geometry() {
        assert_eq!(
            morph("select * from foo where 1=CONTAINS(REGION('Union (circle 1 2 3 circle 4 5 6)'), \
                REGION('Not (position 1 2)'))"),
            Err(MorphError::NoDualTransform));
        assert_eq!(
            morph("select centroid(polygon('ICRS', 12, 13, 14, 15, 15, 17)) from foo"),
            Err(MorphError::Unsupported("Can only compute centroids of circles and points yet.".to_string())));
        assert!(matches!(
            morph("select REGION('Union (circle 1 2 3 circle 4 5 6)') from foo"),
            Err(MorphError::Unsupported(_))));
        assert!(matches!(
            morph("select * from foo where 1=CONTAINS(point('ICRS', 1, 2), circle('FOO', 2, 3, 4))"),
            Err(MorphError::Geometry(_))));
    }
}
