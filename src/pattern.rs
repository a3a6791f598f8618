//! Namespace pattern compiler
//!
//! Turns an enable string such as `"worker:*,-worker:noisy"` into two ordered
//! lists of anchored matchers:
//! - include matchers (plain tokens)
//! - exclude matchers (tokens with a leading `-`)
//!
//! Every character of a token is literal except `*`, which matches any run of
//! characters. Tokens are applied strictly left to right, and a token cancels
//! any earlier token of the opposite polarity that compiled to the same
//! pattern, so `"a,-a,a"` leaves `a` enabled.

use crate::error::Result;
use regex::{Regex, RegexBuilder};

/// Wildcard form of `*` inside a compiled pattern
const WILDCARD: &str = ".*?";

/// Compiled-program budget per matcher; long wildcard chains exceed regex's 10 MiB default
const SIZE_LIMIT: usize = 256 * (1 << 20);

/// One compiled enable/disable token
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Token as written by the user, without the exclusion prefix
    source: String,
    /// `^...$` anchored regex built from `source`
    regex: Regex,
}

impl Matcher {
    /// Compile a single token (without its `-` prefix)
    pub fn compile(source: &str) -> Result<Self> {
        let escaped = regex::escape(source).replace(r"\*", WILDCARD);
        let regex = RegexBuilder::new(&format!("^{}$", escaped))
            .size_limit(SIZE_LIMIT)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Token text this matcher was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Anchored pattern text; two matchers are the same rule iff these are equal
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Check whether a namespace matches in full
    pub fn is_match(&self, namespace: &str) -> bool {
        self.regex.is_match(namespace)
    }
}

/// Compiled include/exclude lists
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    includes: Vec<Matcher>,
    excludes: Vec<Matcher>,
}

impl PatternSet {
    /// Compile a raw enable string into a fresh set
    pub fn compile(raw: &str) -> Result<Self> {
        let mut set = Self::default();
        set.apply(raw)?;
        Ok(set)
    }

    /// Apply the tokens of `raw` on top of the current lists
    ///
    /// Tokens are separated by commas and/or whitespace; empty tokens are skipped.
    pub fn apply(&mut self, raw: &str) -> Result<()> {
        for token in tokens(raw) {
            if let Some(skip) = token.strip_prefix('-') {
                let matcher = Matcher::compile(skip)?;
                self.includes.retain(|m| m.pattern() != matcher.pattern());
                tracing::trace!(token, pattern = matcher.pattern(), "compiled exclude");
                self.excludes.push(matcher);
            } else {
                let matcher = Matcher::compile(token)?;
                self.excludes.retain(|m| m.pattern() != matcher.pattern());
                tracing::trace!(token, pattern = matcher.pattern(), "compiled include");
                self.includes.push(matcher);
            }
        }
        Ok(())
    }

    /// Check whether a namespace is enabled
    ///
    /// `"*"` is not matched literally: it asks whether anything is enabled at all.
    /// Excludes are checked first and always win.
    pub fn is_enabled(&self, namespace: &str) -> bool {
        if namespace == "*" {
            return !self.includes.is_empty();
        }

        if self.excludes.iter().any(|m| m.is_match(namespace)) {
            return false;
        }

        self.includes.iter().any(|m| m.is_match(namespace))
    }

    /// Rebuild an enable string: includes in order, then `-`-prefixed excludes
    pub fn to_namespaces(&self) -> String {
        self.includes
            .iter()
            .map(|m| m.source().to_string())
            .chain(self.excludes.iter().map(|m| format!("-{}", m.source())))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn includes(&self) -> &[Matcher] {
        &self.includes
    }

    pub fn excludes(&self) -> &[Matcher] {
        &self.excludes
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// Split an enable string on commas and whitespace runs
fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}
