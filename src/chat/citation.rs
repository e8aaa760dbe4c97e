//! Display names for citation source paths.
//!
//! Sources arrive as file paths from whatever host ran ingestion. The bundled
//! sample data is backslash-delimited.

use serde::{Deserialize, Serialize};

use crate::chat::types::Citation;

/// Turns a citation's source path into the short name shown to the user.
pub trait DisplayName: Send + Sync {
    fn display_name<'a>(&self, source_path: &'a str) -> &'a str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSeparator {
    #[default]
    Backslash,
    Slash,
    /// Split on whichever separator appears last.
    Any,
}

impl PathSeparator {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backslash" | "\\" => Some(Self::Backslash),
            "slash" | "/" => Some(Self::Slash),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

impl DisplayName for PathSeparator {
    fn display_name<'a>(&self, source_path: &'a str) -> &'a str {
        let split_at = match self {
            PathSeparator::Backslash => source_path.rfind('\\'),
            PathSeparator::Slash => source_path.rfind('/'),
            PathSeparator::Any => source_path.rfind(['\\', '/']),
        };
        match split_at {
            Some(index) => &source_path[index + 1..],
            None => source_path,
        }
    }
}

/// Formats one "Sources" entry, e.g. `policy.pdf — page 4`.
pub fn format_citation(citation: &Citation, names: &dyn DisplayName) -> String {
    format!(
        "{} — page {}",
        names.display_name(&citation.source_path),
        citation.page
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslash_paths() {
        let names = PathSeparator::Backslash;
        assert_eq!(names.display_name("C:\\docs\\policy.pdf"), "policy.pdf");
        assert_eq!(names.display_name("policy.pdf"), "policy.pdf");
        // Forward slashes are left alone in backslash mode
        assert_eq!(names.display_name("data/pdfs/policy.pdf"), "data/pdfs/policy.pdf");
    }

    #[test]
    fn test_slash_paths() {
        let names = PathSeparator::Slash;
        assert_eq!(names.display_name("data/pdfs/company_policy.pdf"), "company_policy.pdf");
        assert_eq!(names.display_name("C:\\docs\\policy.pdf"), "C:\\docs\\policy.pdf");
    }

    #[test]
    fn test_any_separator_uses_last_segment() {
        let names = PathSeparator::Any;
        assert_eq!(names.display_name("C:\\docs/sub\\policy.pdf"), "policy.pdf");
        assert_eq!(names.display_name("/srv/data\\x/handbook.pdf"), "handbook.pdf");
    }

    #[test]
    fn test_trailing_separator_yields_empty_name() {
        assert_eq!(PathSeparator::Backslash.display_name("C:\\docs\\"), "");
    }

    #[test]
    fn test_format_citation() {
        let citation = Citation::new("C:\\docs\\policy.pdf", 4);
        assert_eq!(
            format_citation(&citation, &PathSeparator::Backslash),
            "policy.pdf — page 4"
        );
    }

    #[test]
    fn test_parse_separator() {
        assert_eq!(PathSeparator::parse("Backslash"), Some(PathSeparator::Backslash));
        assert_eq!(PathSeparator::parse("/"), Some(PathSeparator::Slash));
        assert_eq!(PathSeparator::parse("any"), Some(PathSeparator::Any));
        assert_eq!(PathSeparator::parse("colon"), None);
    }
}
