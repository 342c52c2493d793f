use std::f64::consts::PI;

use crate::parser::ast::Child;

const DEG: f64 = PI / 180.0;

/// Geometry of an STC-S region; coordinates are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionShape {
    Position { x: f64, y: f64 },
    Circle { x: f64, y: f64, radius: f64 },
    Box { x: f64, y: f64, width: f64, height: f64 },
    Polygon(Vec<(f64, f64)>),
    Union(Vec<StcRegion>),
    Intersection(Vec<StcRegion>),
    Not(Box<StcRegion>),
}

/// A region given in STC-S, with the frame it was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct StcRegion {
    /// Uppercased frame name; `None` if unknown.
    pub frame: Option<String>,
    pub shape: RegionShape,
}

fn radians((x, y): (f64, f64)) -> String {
    format!("({:.10},{:.10})", x * DEG, y * DEG)
}

impl StcRegion {
    pub fn new(frame: Option<&str>, shape: RegionShape) -> Self {
        let frame = frame
            .map(|f| f.trim().to_uppercase())
            .filter(|f| !f.is_empty() && f != "UNKNOWNFRAME");
        Self { frame, shape }
    }

    /// Union, intersection or negation of other regions.
    pub fn is_compound(&self) -> bool {
        matches!(self.shape, RegionShape::Union(_) | RegionShape::Intersection(_) | RegionShape::Not(_))
    }

    /// Shapes whose center pgsphere can compute.
    pub fn has_center(&self) -> bool {
        matches!(self.shape, RegionShape::Position { .. } | RegionShape::Circle { .. })
    }

    /// Constant pgsphere literal, in radians; compound regions have none.
    pub fn to_pgsphere(&self) -> Option<String> {
        match &self.shape {
            RegionShape::Position { x, y } => Some(format!("spoint '{}'", radians((*x, *y)))),
            RegionShape::Circle { x, y, radius } => Some(format!(
                "scircle '< ({:.10}, {:.10}), {:.10} >'", x * DEG, y * DEG, radius * DEG)),
            RegionShape::Box { x, y, width, height } => {
                let (dx, dy) = (width / 2.0, height / 2.0);
                Some(Self::spoly(&[
                    (x - dx, y - dy),
                    (x - dx, y + dy),
                    (x + dx, y + dy),
                    (x + dx, y - dy),
                ]))
            }
            RegionShape::Polygon(points) => Some(Self::spoly(points)),
            RegionShape::Union(_) | RegionShape::Intersection(_) | RegionShape::Not(_) => None,
        }
    }

    fn spoly(points: &[(f64, f64)]) -> String {
        format!("spoly '{{{}}}'", points.iter().map(|p| radians(*p)).collect::<Vec<_>>().join(","))
    }

    /// Spells out a predicate on this region as boolean logic, applying
    /// `template` to the pgsphere literal of every simple shape. The
    /// parts are meant to be glued without separators.
    pub fn as_logic(&self, template: &dyn Fn(&str) -> Vec<Child>) -> Vec<Child> {
        let join = |operands: &[StcRegion], operator: &str| {
            let mut parts = vec![];
            for (index, operand) in operands.iter().enumerate() {
                if index > 0 {
                    parts.push(operator.into());
                }
                parts.push("(".into());
                parts.extend(operand.as_logic(template));
                parts.push(")".into());
            }
            parts
        };

        match &self.shape {
            RegionShape::Union(operands) => join(operands, " OR "),
            RegionShape::Intersection(operands) => join(operands, " AND "),
            RegionShape::Not(operand) => {
                let mut parts: Vec<Child> = vec!["NOT (".into()];
                parts.extend(operand.as_logic(template));
                parts.push(")".into());
                parts
            }
            _ => template(&self.to_pgsphere().unwrap_or_default()),
        }
    }
}
