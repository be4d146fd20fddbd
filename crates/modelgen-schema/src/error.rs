use serde::Serialize;
use std::fmt;

///
/// ErrorTree
///
/// Accumulates validation failures so a single pass can report every problem
/// in a schema instead of stopping at the first.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct ErrorTree {
    errors: Vec<String>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, err: impl fmt::Display) {
        self.errors.push(err.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the tree, returning `Err(self)` if anything was collected.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(String::as_str)
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            return write!(f, "{}", self.errors[0]);
        }

        write!(f, "{} errors", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

// err
/// Format a message and push it onto an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::ErrorTree;

    #[test]
    fn empty_tree_resolves_ok() {
        let errs = ErrorTree::new();
        assert!(errs.result().is_ok());
    }

    #[test]
    fn single_error_displays_without_count_header() {
        let mut errs = ErrorTree::new();
        err!(errs, "table '{}' is broken", "users");

        let err = errs.result().expect_err("one collected error must fail");
        assert_eq!(err.to_string(), "table 'users' is broken");
    }

    #[test]
    fn multiple_errors_display_with_count_header() {
        let mut errs = ErrorTree::new();
        err!(errs, "first");
        err!(errs, "second");

        let err = errs.result().expect_err("two collected errors must fail");
        let text = err.to_string();
        assert!(text.starts_with("2 errors"));
        assert!(text.contains("\n  - first"));
        assert!(text.contains("\n  - second"));
    }
}
