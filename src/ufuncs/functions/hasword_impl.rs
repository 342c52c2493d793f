use crate::{parser::ast::Child, ufuncs::{argument, as_flag, UfuncImpl}};

/// `ivo_hasword(haystack, needle)`: full text search of needle in haystack.
pub struct HaswordImpl;

impl UfuncImpl for HaswordImpl {
    fn name(&self) -> &'static str {
        "ivo_hasword"
    }

    fn signature(&self) -> &'static str {
        "(haystack TEXT, needle TEXT) -> INTEGER"
    }

    fn arity(&self) -> usize {
        2
    }

    fn expand(&self, args: &[Child]) -> Vec<Child> {
        as_flag(vec![
            "to_tsvector(".into(), argument(args, 0), ") @@ plainto_tsquery(".into(), argument(args, 1), ")".into(),
        ])
    }
}
