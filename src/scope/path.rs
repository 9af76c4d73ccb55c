//! Scope path type: normalization, hierarchy traversal, and ordering
//!
//! A `ScopePath` is an ordered sequence of lowercase segments addressing one
//! node in the hierarchical namespace. The empty sequence is the root scope.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PermissionError, Result};

/// Canonical segment separator
pub(crate) const SEPARATOR: char = '/';

/// Separators accepted on parse and rewritten to the canonical one
pub(crate) const SEPARATOR_ALIASES: &[char] = &['\\', ':'];

/// Immutable hierarchical address
///
/// Invariants:
/// - segments are non-empty, lowercase, whitespace-free, and contain no
///   separator characters
/// - the empty segment sequence is the root scope
/// - equality and hashing are by ordered segment sequence
///
/// Ordering operators express the ancestor relation: `a <= b` holds when `b`
/// is `a` or a descendant of `a`. Disjoint paths are unordered, so a path is
/// `>=` itself but never `>` itself.
///
/// # Examples
///
/// ```
/// use scopegate::scope::ScopePath;
///
/// let scope = ScopePath::parse("Org:Acme\\Dept");
/// assert_eq!(scope.to_string(), "/org/acme/dept");
/// assert_eq!(scope.back(2), ScopePath::parse("/org"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    /// Returns the root scope (empty segment sequence)
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a scope path from raw segments, validating each one
    ///
    /// Fails fast on structural violations: empty segments, whitespace, or
    /// embedded separator characters.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validated = Vec::new();
        for segment in segments {
            let segment = segment.into();
            if segment.is_empty()
                || segment.chars().any(|c| {
                    c.is_whitespace() || c == SEPARATOR || SEPARATOR_ALIASES.contains(&c)
                })
            {
                return Err(PermissionError::InvalidSegment(segment));
            }
            validated.push(segment.to_lowercase());
        }
        Ok(Self { segments: validated })
    }

    /// Parses text into a scope path; never fails
    ///
    /// Normalization: alias separators (`\`, `:`) are rewritten to `/`, the
    /// text is lower-cased, whitespace is stripped, and empty segments are
    /// dropped. Empty or whitespace-only input yields the root scope.
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, SEPARATOR_ALIASES)
    }

    /// Parses text using a caller-supplied set of alias separators
    pub fn parse_with(text: &str, aliases: &[char]) -> Self {
        let mut normalized = text.to_lowercase();
        for alias in aliases {
            normalized = normalized.replace(*alias, "/");
        }

        let segments = normalized
            .split(SEPARATOR)
            .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|s| !s.is_empty())
            .collect();

        Self { segments }
    }

    /// Returns the ordered segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the segment count
    pub fn rank(&self) -> usize {
        self.segments.len()
    }

    /// Returns whether this is the root scope
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenates two paths; the root scope is the additive identity
    pub fn append(&self, other: &ScopePath) -> ScopePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        ScopePath { segments }
    }

    /// Drops the last `n` segments, flooring at the root
    pub fn back(&self, n: usize) -> ScopePath {
        let keep = self.rank().saturating_sub(n);
        ScopePath {
            segments: self.segments[..keep].to_vec(),
        }
    }

    /// Returns the full ancestor chain, root first, ending at this path
    ///
    /// `include_root` controls whether the root scope itself is part of the
    /// chain. The chain always ends with `self` (unless `self` is the root
    /// and `include_root` is false).
    pub fn hierarchy_ascending(&self, include_root: bool) -> Vec<ScopePath> {
        let mut chain = Vec::with_capacity(self.rank() + 1);
        if include_root {
            chain.push(ScopePath::root());
        }
        for i in 1..=self.rank() {
            chain.push(ScopePath {
                segments: self.segments[..i].to_vec(),
            });
        }
        chain
    }

    /// Returns the full ancestor chain, leaf first
    ///
    /// Descending order is used by "stop at first explicit hit" queries.
    pub fn hierarchy_descending(&self, include_root: bool) -> Vec<ScopePath> {
        let mut chain = self.hierarchy_ascending(include_root);
        chain.reverse();
        chain
    }

    /// Segment-prefix containment (a path starts with itself)
    pub fn starts_with(&self, prefix: &ScopePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Segment-suffix containment
    pub fn ends_with(&self, suffix: &ScopePath) -> bool {
        self.segments.ends_with(&suffix.segments)
    }

    /// Returns the longest common ancestor of two paths
    pub fn branch_point(&self, other: &ScopePath) -> ScopePath {
        let shared = self
            .segments
            .iter()
            .zip(other.segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        ScopePath {
            segments: self.segments[..shared].to_vec(),
        }
    }

    /// Returns the last `n` segments as a path (the whole path when `n`
    /// exceeds the rank)
    pub fn last_segments(&self, n: usize) -> ScopePath {
        let skip = self.rank().saturating_sub(n);
        ScopePath {
            segments: self.segments[skip..].to_vec(),
        }
    }

    /// Returns a path with the segment order reversed
    pub fn reversed(&self) -> ScopePath {
        let mut segments = self.segments.clone();
        segments.reverse();
        ScopePath { segments }
    }

    /// True when `self` is a strict ancestor of `other`, evaluated via `back`
    fn is_ancestor_of(&self, other: &ScopePath) -> bool {
        self.rank() < other.rank() && other.back(other.rank() - self.rank()) == *self
    }
}

impl PartialOrd for ScopePath {
    /// Ancestor ordering: `Less` when self is a strict ancestor of other,
    /// `Greater` when a strict descendant, `None` for disjoint paths.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_ancestor_of(other) {
            Some(Ordering::Less)
        } else if other.is_ancestor_of(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl Add<&ScopePath> for &ScopePath {
    type Output = ScopePath;

    fn add(self, rhs: &ScopePath) -> ScopePath {
        self.append(rhs)
    }
}

impl Add for ScopePath {
    type Output = ScopePath;

    fn add(self, rhs: ScopePath) -> ScopePath {
        self.append(&rhs)
    }
}

impl Add<&str> for &ScopePath {
    type Output = ScopePath;

    fn add(self, rhs: &str) -> ScopePath {
        self.append(&ScopePath::parse(rhs))
    }
}

impl Sub<&ScopePath> for &ScopePath {
    type Output = ScopePath;

    /// Suffix difference: the remainder of the larger path after the common
    /// branch point. When one path contains the other this is the contained
    /// path's remainder; with no overlap at all it is the full larger path.
    fn sub(self, rhs: &ScopePath) -> ScopePath {
        let branch = self.branch_point(rhs);
        let longer = if self.rank() >= rhs.rank() { self } else { rhs };
        ScopePath {
            segments: longer.segments[branch.rank()..].to_vec(),
        }
    }
}

impl Sub for ScopePath {
    type Output = ScopePath;

    fn sub(self, rhs: ScopePath) -> ScopePath {
        &self - &rhs
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl FromStr for ScopePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for ScopePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        // Parse is lossy by design; reject nothing that parse accepts.
        ScopePath::from_str(&text).map_err(D::Error::custom)
    }
}
