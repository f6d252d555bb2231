//! Zone scoping by domain name
//!
//! A [`DomainFilter`] runs in exactly one mode, chosen at construction:
//! a regex include/exclude pair when an include expression is configured,
//! otherwise a pair of suffix lists.

use crate::config::DomainFilterConfig;
use crate::error::{Error, Result};
use regex::Regex;

/// Decides whether a zone name is in scope
#[derive(Debug, Clone)]
pub enum DomainFilter {
    /// Match the include pattern and not the exclude pattern
    Regex {
        include: Regex,
        /// `None` excludes nothing
        exclude: Option<Regex>,
    },

    /// Match an included suffix (or any name when the list is empty) and no
    /// excluded suffix
    Suffixes {
        include: Vec<String>,
        exclude: Vec<String>,
    },
}

impl DomainFilter {
    /// Suffix-list filter
    pub fn with_suffixes<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self::Suffixes {
            include: normalize_all(include),
            exclude: normalize_all(exclude),
        }
    }

    /// Regex filter; an empty `exclude` pattern excludes nothing
    pub fn with_regex(include: &str, exclude: &str) -> Result<Self> {
        let include = Regex::new(include)?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(Regex::new(exclude)?)
        };
        Ok(Self::Regex { include, exclude })
    }

    /// A filter that matches every name
    pub fn match_all() -> Self {
        Self::Suffixes {
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Whether `name` is in scope
    pub fn matches(&self, name: &str) -> bool {
        match self {
            DomainFilter::Regex { include, exclude } => {
                include.is_match(name) && !exclude.as_ref().is_some_and(|re| re.is_match(name))
            }
            DomainFilter::Suffixes { include, exclude } => {
                let name = normalize(name);
                let included =
                    include.is_empty() || include.iter().any(|s| has_suffix(&name, s));
                included && !exclude.iter().any(|s| has_suffix(&name, s))
            }
        }
    }

    /// Human-readable summary used in the startup log line
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        match self {
            DomainFilter::Regex { include, exclude } => {
                parts.push(format!("regexp domain filter: '{}'", include.as_str()));
                if let Some(exclude) = exclude {
                    parts.push(format!("with exclusion: '{}'", exclude.as_str()));
                }
            }
            DomainFilter::Suffixes { include, exclude } => {
                if !include.is_empty() {
                    parts.push(format!("domain filter: '{}'", include.join(",")));
                }
                if !exclude.is_empty() {
                    parts.push(format!("exclude domain filter: '{}'", exclude.join(",")));
                }
            }
        }

        if parts.is_empty() {
            "no kind of domain filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self::match_all()
    }
}

impl TryFrom<&DomainFilterConfig> for DomainFilter {
    type Error = Error;

    fn try_from(config: &DomainFilterConfig) -> Result<Self> {
        if !config.regex_domain_filter.is_empty() {
            return Self::with_regex(&config.regex_domain_filter, &config.regex_domain_exclusion);
        }
        Ok(Self::with_suffixes(
            &config.domain_filter,
            &config.exclude_domains,
        ))
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn normalize_all<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|s| normalize(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

// ".example.com" only matches strict subdomains
fn has_suffix(name: &str, suffix: &str) -> bool {
    if suffix.starts_with('.') {
        return name.ends_with(suffix);
    }
    name == suffix
        || (name.len() > suffix.len()
            && name.ends_with(suffix)
            && name.as_bytes()[name.len() - suffix.len() - 1] == b'.')
}
