use std::{fmt, rc::Rc, sync::Arc};

use tracing::debug;

use crate::{
    parser::ast::{attrs::quote_string, Node, NodeKind},
    region::{RegionError, RegionResolver},
};

/// Resolves an object name to ICRS (ra, dec) in degrees; `Ok(None)` if
/// the service does not know it.
pub type ObjectLookup = dyn Fn(&str) -> Result<Option<(f64, f64)>, String> + Send + Sync;

/// Turns `REGION('<service> <object name>')` into a point at the
/// object's position.
#[derive(Clone)]
pub struct NamedObjectResolver {
    service: String,
    lookup: Arc<ObjectLookup>,
}

impl NamedObjectResolver {
    pub fn new(
        service: &str,
        lookup: impl Fn(&str) -> Result<Option<(f64, f64)>, String> + Send + Sync + 'static,
    ) -> Self {
        Self { service: service.to_string(), lookup: Arc::new(lookup) }
    }

    fn point(ra: f64, dec: f64) -> Rc<Node> {
        let number = |value: f64| Node::build(NodeKind::UnsignedLiteral, vec![format!("{}", value).into()]);
        Node::build(NodeKind::Point, vec![
            "POINT".into(),
            "(".into(),
            Node::build(NodeKind::CharacterStringLiteral, vec![quote_string("ICRS").into()]).into(),
            ",".into(),
            number(ra).into(),
            ",".into(),
            number(dec).into(),
            ")".into(),
        ])
    }
}

impl fmt::Debug for NamedObjectResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedObjectResolver").field("service", &self.service).finish()
    }
}

impl RegionResolver for NamedObjectResolver {
    fn resolve(&self, text: &str, _original: &Node) -> Result<Option<Rc<Node>>, RegionError> {
        let text = text.trim();
        let (service, name) = match text.split_once(char::is_whitespace) {
            Some((service, name)) => (service, name.trim()),
            None => return Ok(None),
        };
        if !service.eq_ignore_ascii_case(&self.service) || name.is_empty() {
            return Ok(None);
        }

        match (self.lookup)(name).map_err(RegionError::Resolver)? {
            Some((ra, dec)) => {
                debug!(service = %self.service, object = name, ra, dec, "object resolved");
                Ok(Some(Self::point(ra, dec)))
            }
            None => Err(RegionError::Resolver(format!("No object '{}' known to {}", name, self.service))),
        }
    }
}
