use crate::{parser::ast::Child, ufuncs::{argument, as_flag, UfuncImpl}};

/// `ivo_nocasecmp(a, b)`: 1 if both compare equal after case folding.
pub struct NocasecmpImpl;

impl UfuncImpl for NocasecmpImpl {
    fn name(&self) -> &'static str {
        "ivo_nocasecmp"
    }

    fn signature(&self) -> &'static str {
        "(arg1 TEXT, arg2 TEXT) -> INTEGER"
    }

    fn arity(&self) -> usize {
        2
    }

    fn expand(&self, args: &[Child]) -> Vec<Child> {
        as_flag(vec!["LOWER(".into(), argument(args, 0), ") = LOWER(".into(), argument(args, 1), ")".into()])
    }
}
