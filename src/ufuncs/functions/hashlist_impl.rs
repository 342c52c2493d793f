use crate::{parser::ast::Child, ufuncs::{argument, as_flag, UfuncImpl}};

/// `ivo_hashlist_has(list, item)`: whether item is one of the
/// `#`-separated words of list, compared case-insensitively.
pub struct HashlistHasImpl;

impl UfuncImpl for HashlistHasImpl {
    fn name(&self) -> &'static str {
        "ivo_hashlist_has"
    }

    fn signature(&self) -> &'static str {
        "(hashlist TEXT, item TEXT) -> INTEGER"
    }

    fn arity(&self) -> usize {
        2
    }

    fn expand(&self, args: &[Child]) -> Vec<Child> {
        as_flag(vec![
            "LOWER(".into(), argument(args, 1), ") = ANY(string_to_array(LOWER(".into(), argument(args, 0), "), '#'))".into(),
        ])
    }
}
