//! SQL dialects understood by the clause builder

use crate::config::Backend;

/// Rendering rules that differ between engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
}

impl Dialect {
    /// Character used to quote identifiers that cannot appear bare
    pub fn identifier_quote(self) -> char {
        match self {
            Dialect::Sqlite => '"',
            Dialect::MySql => '`',
        }
    }

    /// Positional parameter placeholder
    pub fn placeholder(self) -> &'static str {
        "?"
    }
}

impl From<Backend> for Dialect {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sqlite => Dialect::Sqlite,
            Backend::MySql => Dialect::MySql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_quote() {
        assert_eq!(Dialect::Sqlite.identifier_quote(), '"');
        assert_eq!(Dialect::MySql.identifier_quote(), '`');
    }

    #[test]
    fn test_from_backend() {
        assert_eq!(Dialect::from(Backend::Sqlite), Dialect::Sqlite);
        assert_eq!(Dialect::from(Backend::MySql), Dialect::MySql);
    }
}
