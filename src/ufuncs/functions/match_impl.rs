use crate::{parser::ast::Child, ufuncs::{argument, as_flag, UfuncImpl}};

/// `gavo_match(pattern, string)`: 1 if the POSIX regular expression
/// matches anything in string.
pub struct MatchImpl;

impl UfuncImpl for MatchImpl {
    fn name(&self) -> &'static str {
        "gavo_match"
    }

    fn signature(&self) -> &'static str {
        "(pattern TEXT, string TEXT) -> INTEGER"
    }

    fn arity(&self) -> usize {
        2
    }

    fn expand(&self, args: &[Child]) -> Vec<Child> {
        as_flag(vec![argument(args, 1), " ~ ".into(), argument(args, 0)])
    }
}
