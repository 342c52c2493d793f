use once_cell::sync::Lazy;
use regex::Regex;

use crate::region::{RegionError, RegionShape, StcRegion};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[()]|[^\s()]+").expect("invalid STC-S token regex"));

const FRAMES: [&str; 8] = ["ICRS", "FK4", "FK5", "GALACTIC", "RELOCATABLE", "UNKNOWN", "UNKNOWNFRAME", "BROKEN"];
const REFPOS: [&str; 7] = ["BARYCENTER", "GEOCENTER", "HELIOCENTER", "LSR", "TOPOCENTER", "RELOCATABLE", "UNKNOWNREFPOS"];
const FLAVORS: [&str; 3] = ["CARTESIAN2", "CARTESIAN3", "SPHERICAL2"];

/// Words an STC-S region starts with.
pub const STCS_OPENERS: [&str; 7] = ["POSITION", "CIRCLE", "BOX", "POLYGON", "UNION", "INTERSECTION", "NOT"];

/// Parses the STC-S subset TAP allows: simple shapes with an optional
/// frame, reference position and flavor, combined by Union,
/// Intersection and Not.
pub fn parse_stcs(text: &str) -> Result<StcRegion, RegionError> {
    let tokens: Vec<&str> = TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    let mut parser = StcsParser { tokens, position: 0 };
    let region = parser.region()?;
    match parser.peek() {
        None => Ok(region),
        Some(extra) => Err(RegionError::Invalid(format!("unexpected '{}' after region", extra))),
    }
}

struct StcsParser<'t> {
    tokens: Vec<&'t str>,
    position: usize,
}

impl<'t> StcsParser<'t> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<&'t str> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn accept(&mut self, choices: &[&str]) -> Option<&'t str> {
        match self.peek() {
            Some(token) if choices.iter().any(|c| token.eq_ignore_ascii_case(c)) => self.next(),
            _ => None,
        }
    }

    fn expect(&mut self, symbol: &str) -> Result<(), RegionError> {
        match self.next() {
            Some(token) if token == symbol => Ok(()),
            Some(token) => Err(RegionError::Invalid(format!("expected '{}', found '{}'", symbol, token))),
            None => Err(RegionError::Invalid(format!("expected '{}' at end of input", symbol))),
        }
    }

    fn region(&mut self) -> Result<StcRegion, RegionError> {
        let opener = self.next()
            .ok_or_else(|| RegionError::Invalid("empty region".to_string()))?
            .to_uppercase();
        match opener.as_str() {
            "NOT" => {
                self.expect("(")?;
                let inner = self.region()?;
                self.expect(")")?;
                Ok(StcRegion::new(None, RegionShape::Not(Box::new(inner))))
            }
            "UNION" | "INTERSECTION" => {
                let frame = self.system()?;
                self.expect("(")?;
                let mut operands = vec![self.region()?];
                while self.peek() != Some(")") {
                    operands.push(self.region()?);
                }
                self.expect(")")?;
                if operands.len() < 2 {
                    return Err(RegionError::Invalid(format!("{} wants at least two operands", opener)));
                }
                let shape = if opener == "UNION" {
                    RegionShape::Union(operands)
                } else {
                    RegionShape::Intersection(operands)
                };
                Ok(StcRegion::new(frame, shape))
            }
            "POSITION" | "CIRCLE" | "BOX" | "POLYGON" => {
                let frame = self.system()?;
                let coords = self.numbers()?;
                Ok(StcRegion::new(frame, Self::shape(&opener, &coords)?))
            }
            other => Err(RegionError::Invalid(format!("unknown region type '{}'", other))),
        }
    }

    /// Optional frame, reference position and flavor; returns the frame.
    fn system(&mut self) -> Result<Option<&'t str>, RegionError> {
        let frame = self.accept(&FRAMES);
        self.accept(&REFPOS);
        if let Some(flavor) = self.accept(&FLAVORS) {
            if !flavor.eq_ignore_ascii_case("SPHERICAL2") {
                return Err(RegionError::Invalid("Only SPHERICAL2 STC-S supported here".to_string()));
            }
        }
        Ok(frame)
    }

    fn numbers(&mut self) -> Result<Vec<f64>, RegionError> {
        let mut numbers = vec![];
        while let Some(value) = self.peek().and_then(|t| t.parse::<f64>().ok()) {
            numbers.push(value);
            self.position += 1;
        }
        if numbers.is_empty() {
            return Err(RegionError::Invalid("coordinates expected".to_string()));
        }
        Ok(numbers)
    }

    fn shape(kind: &str, coords: &[f64]) -> Result<RegionShape, RegionError> {
        match (kind, coords) {
            ("POSITION", &[x, y]) => Ok(RegionShape::Position { x, y }),
            ("POSITION", _) => Err(RegionError::Invalid("STC-S points want two coordinates.".to_string())),
            ("CIRCLE", &[x, y, radius]) => Ok(RegionShape::Circle { x, y, radius }),
            ("CIRCLE", _) => Err(RegionError::Invalid("STC-S circles want three numbers.".to_string())),
            ("BOX", &[x, y, width, height]) => Ok(RegionShape::Box { x, y, width, height }),
            ("BOX", _) => Err(RegionError::Invalid("STC-S boxes want four numbers.".to_string())),
            (_, coords) if coords.len() >= 6 && coords.len() % 2 == 0 => Ok(RegionShape::Polygon(
                coords.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())),
            _ => Err(RegionError::Invalid("STC-S polygons want at least three number pairs".to_string())),
        }
    }
}
