use std::fmt::{Display, Formatter};

/// Case-normalized log level. `"Error"`, `"ERROR"` and `"error"` are the
/// same severity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(String);

impl Severity {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Severity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
