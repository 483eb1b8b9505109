use std::fmt;

/// Outcome of matching a (possibly abbreviated) name against a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixMatch<'a> {
    Exact(&'a str),
    Unique(&'a str),
    Ambiguous(Vec<&'a str>),
    NoMatch,
}

/// Case-insensitive lookup: an exact match wins, otherwise a prefix must
/// select exactly one candidate.
pub fn match_prefix<'a, I>(name: &str, candidates: I) -> PrefixMatch<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = name.to_ascii_lowercase();
    let mut hits = Vec::new();
    for candidate in candidates {
        let lowered = candidate.to_ascii_lowercase();
        if lowered == needle {
            return PrefixMatch::Exact(candidate);
        }
        if !needle.is_empty() && lowered.starts_with(&needle) {
            hits.push(candidate);
        }
    }
    match hits.len() {
        0 => PrefixMatch::NoMatch,
        1 => PrefixMatch::Unique(hits[0]),
        _ => PrefixMatch::Ambiguous(hits),
    }
}

/// Legal values of an enumerated property, declared as `"a|{b}|c"` where the
/// braced entry is the default (the first entry otherwise).
#[derive(Debug, Clone, PartialEq)]
pub struct RadioValues {
    values: Vec<String>,
    default: usize,
}

impl RadioValues {
    pub fn parse(spec: &str) -> Self {
        let mut values = Vec::new();
        let mut default = 0;
        for (idx, raw) in spec.split('|').enumerate() {
            let raw = raw.trim();
            if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                default = idx;
                values.push(inner.to_string());
            } else {
                values.push(raw.to_string());
            }
        }
        RadioValues { values, default }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> &str {
        self.values
            .get(self.default)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Canonical spelling of `candidate`, if it selects exactly one value.
    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        match match_prefix(candidate, self.values.iter().map(String::as_str)) {
            PrefixMatch::Exact(v) | PrefixMatch::Unique(v) => Some(v),
            PrefixMatch::Ambiguous(_) | PrefixMatch::NoMatch => None,
        }
    }
}

impl fmt::Display for RadioValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            if idx == self.default {
                write!(f, "{{{value}}}")?;
            } else {
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braced_entry_is_default() {
        let radio = RadioValues::parse("left|{center}|right");
        assert_eq!(radio.default_value(), "center");
        assert_eq!(radio.to_string(), "left | {center} | right");
        assert_eq!(RadioValues::parse("on|off").default_value(), "on");
    }

    #[test]
    fn unique_prefix_resolves() {
        let radio = RadioValues::parse("left|{center}|right");
        assert_eq!(radio.resolve("ce"), Some("center"));
        assert_eq!(radio.resolve("RIGHT"), Some("right"));
        assert_eq!(radio.resolve("xyz"), None);
    }

    #[test]
    fn exact_match_beats_longer_prefix() {
        let names = ["xlim", "xlimmode"];
        assert_eq!(match_prefix("xlim", names), PrefixMatch::Exact("xlim"));
        assert_eq!(
            match_prefix("xl", names),
            PrefixMatch::Ambiguous(vec!["xlim", "xlimmode"])
        );
    }
}
