use std::{fmt, rc::Rc, sync::Arc};

use tracing::debug;

use crate::{
    morph::Morpher,
    parser::ast::{Node, NodeKind},
    region::{parse_stcs, RegionError, STCS_OPENERS},
};

/// Turns the text of a `REGION('...')` call into a geometry.
///
/// A resolver returns `Ok(None)` for text in a language it does not
/// speak; the first word of the text conventionally names the language.
pub trait RegionResolver: Send + Sync {
    fn resolve(&self, text: &str, original: &Node) -> Result<Option<Rc<Node>>, RegionError>;
}

/// STC-S regions like `Circle ICRS 10 20 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StcsResolver;

impl RegionResolver for StcsResolver {
    fn resolve(&self, text: &str, original: &Node) -> Result<Option<Rc<Node>>, RegionError> {
        let opener = text.trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_uppercase();
        if !STCS_OPENERS.contains(&opener.as_str()) {
            return Ok(None);
        }
        Ok(Some(Node::stc_region(parse_stcs(text)?, original)))
    }
}

/// Region resolvers, tried in registration order.
#[derive(Clone, Default)]
pub struct RegionRegistry {
    resolvers: Vec<Arc<dyn RegionResolver>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self { resolvers: vec![] }
    }

    /// A registry understanding STC-S.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(StcsResolver);
        registry
    }

    pub fn register<R: RegionResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.push(Arc::new(resolver));
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// The geometry the first willing resolver makes of `text`.
    pub fn resolve_text(&self, text: &str, original: &Node) -> Result<Rc<Node>, RegionError> {
        for resolver in &self.resolvers {
            if let Some(node) = resolver.resolve(text, original)? {
                return Ok(node);
            }
        }
        Err(RegionError::NoMatch(text.to_string()))
    }

    /// Replaces every `REGION` call in `tree` by its geometry.
    pub fn resolve_regions(&self, tree: &Rc<Node>) -> Result<Rc<Node>, RegionError> {
        let morpher: Morpher<'_, RegionError> = Morpher::new().on(NodeKind::Region, |node, _| {
            let text = node.argument(0)
                .and_then(|arg| arg.text_value())
                .ok_or_else(|| RegionError::Invalid(
                    "REGION only accepts string literals here.".to_string()))?;
            let resolved = self.resolve_text(text, node)?;
            debug!(region = text, kind = %resolved.kind(), "region resolved");
            Ok(resolved)
        });
        let (_, tree) = morpher.morph(tree)?;
        Ok(tree)
    }
}

impl fmt::Debug for RegionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionRegistry").field("resolvers", &self.resolvers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parser::parse,
        region::{NamedObjectResolver, RegionShape},
    };

    #[test]
    fn test_stcs_regions() {
        let tree = parse("SELECT * FROM t WHERE 1=CONTAINS(p, REGION('Circle ICRS 10 20 1'))")
            .expect("Failed to parse query");
        let resolved = RegionRegistry::with_defaults().resolve_regions(&tree).expect("Failed to resolve");

        assert!(resolved.find_first(NodeKind::Region).is_none());
        let region = resolved.find_first(NodeKind::StcRegion).expect("no region node");
        assert_eq!(region.frame(), Some("ICRS"));
        assert_eq!(
            region.region().map(|r| r.shape.clone()),
            Some(RegionShape::Circle { x: 10.0, y: 20.0, radius: 1.0 }));
        assert_eq!(resolved.flatten(), tree.flatten());
    }

    #[test]
    fn test_unmatched_region() {
        let tree = parse("SELECT * FROM t WHERE 1=CONTAINS(p, REGION('Frob 1 2'))").expect("Failed to parse query");
        match RegionRegistry::with_defaults().resolve_regions(&tree) {
            Err(error @ RegionError::NoMatch(_)) => {
                assert_eq!(error.to_string(), "'Frob 1 2' is not a region specification I understand.");
            }
            other => panic!("unexpected {:?}", other.map(|t| t.flatten())),
        }
        assert!(matches!(RegionRegistry::new().resolve_text("Circle 1 2 3", &tree), Err(RegionError::NoMatch(_))));
    }

    #[test]
    fn test_bad_stcs_and_arguments() {
        let tree = parse("SELECT * FROM t WHERE 1=CONTAINS(p, REGION('Circle ICRS 10 20'))").expect("Failed to parse query");
        assert!(matches!(RegionRegistry::with_defaults().resolve_regions(&tree), Err(RegionError::Invalid(_))));

        let tree = parse("SELECT * FROM t WHERE 1=CONTAINS(p, REGION(spec))").expect("Failed to parse query");
        assert!(matches!(RegionRegistry::with_defaults().resolve_regions(&tree), Err(RegionError::Invalid(_))));
    }

    #[test]
    fn test_resolvers_in_order() {
        let mut registry = RegionRegistry::with_defaults();
        registry.register(NamedObjectResolver::new("simbad", |name| match name {
            "Aldebaran" => Ok(Some((68.98, 16.509))),
            _ => Ok(None),
        }));
        assert_eq!(registry.len(), 2);

        let tree = parse("SELECT * FROM t WHERE 1=CONTAINS(REGION('simbad Aldebaran'), CIRCLE('ICRS', 1, 2, 3))")
            .expect("Failed to parse query");
        let resolved = registry.resolve_regions(&tree).expect("Failed to resolve");
        let point = resolved.find_first(NodeKind::Point).expect("no point");
        assert_eq!(point.flatten(), "POINT('ICRS', 68.98, 16.509)");
    }
}
