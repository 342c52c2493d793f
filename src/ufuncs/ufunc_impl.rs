use crate::{catalog::FieldInfo, parser::ast::Child};

/// A user defined function: metadata plus the SQL it expands to.
/// Implementations are stateless and shared between compilations.
pub trait UfuncImpl: Send + Sync {
    /// Canonical lowercase name, including its prefix.
    fn name(&self) -> &'static str;

    /// Human readable signature, `(pattern TEXT, string TEXT) -> INTEGER`.
    fn signature(&self) -> &'static str;

    fn arity(&self) -> usize;

    /// Metadata of the result; 0/1 flags are dimensionless.
    fn field_info(&self) -> FieldInfo {
        FieldInfo::dimensionless()
    }

    /// The SQL replacing the call; `args` has already been checked
    /// against [`UfuncImpl::arity`].
    fn expand(&self, args: &[Child]) -> Vec<Child>;
}

/// `(CASE WHEN <condition> THEN 1 ELSE 0 END)` around a condition template.
pub fn as_flag(mut condition: Vec<Child>) -> Vec<Child> {
    condition.insert(0, "(CASE WHEN ".into());
    condition.push(" THEN 1 ELSE 0 END)".into());
    condition
}

/// The `index`-th argument, or `NULL` if the call was short of it.
pub fn argument(args: &[Child], index: usize) -> Child {
    args.get(index).cloned().unwrap_or_else(|| "NULL".into())
}
