//! Member — one node of a hierarchy, identified by its unique path.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Error, Result};

/// Name segments from the hierarchy root down to the member.
pub type MemberPath = SmallVec<[String; 4]>;

/// A member of a hierarchy.
///
/// Identity, equality and ordering are all by `(hierarchy, path)`. The path
/// starts at a root member, so every ancestor is a prefix of it and can be
/// derived without asking the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MemberDoc")]
pub struct Member {
    hierarchy: String,
    path: MemberPath,
}

/// Wire form of a member; validated through [`Member::new`].
#[derive(Deserialize)]
struct MemberDoc {
    hierarchy: String,
    path: Vec<String>,
}

impl TryFrom<MemberDoc> for Member {
    type Error = Error;

    fn try_from(doc: MemberDoc) -> Result<Self> {
        Member::new(doc.hierarchy, doc.path)
    }
}

impl Member {
    /// Build a member from its hierarchy name and root-first path.
    ///
    /// Fails with `InvalidUniqueName` when the path is empty.
    pub fn new<I, S>(hierarchy: impl Into<String>, path: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hierarchy = hierarchy.into();
        let path: MemberPath = path.into_iter().map(Into::into).collect();
        if path.is_empty() {
            return Err(Error::InvalidUniqueName(format!("[{hierarchy}] has no member path")));
        }
        Ok(Self { hierarchy, path })
    }

    /// A root member of `hierarchy`.
    pub fn root(hierarchy: impl Into<String>, name: impl Into<String>) -> Self {
        let mut path = MemberPath::new();
        path.push(name.into());
        Self { hierarchy: hierarchy.into(), path }
    }

    /// The member one level below `self` named `name`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(name.into());
        Self { hierarchy: self.hierarchy.clone(), path }
    }

    pub fn hierarchy(&self) -> &str {
        &self.hierarchy
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        // path is never empty
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Distance from the root member (roots are at depth 0).
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }

    pub fn parent(&self) -> Option<Member> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            hierarchy: self.hierarchy.clone(),
            path: self.path[..self.path.len() - 1].iter().cloned().collect(),
        })
    }

    /// Iterates `self`, its parent, ... up to the root.
    pub fn ancestors_inclusive(&self) -> impl Iterator<Item = Member> + '_ {
        (1..=self.path.len()).rev().map(move |len| Self {
            hierarchy: self.hierarchy.clone(),
            path: self.path[..len].iter().cloned().collect(),
        })
    }

    /// Number of levels from `self` down to `other`, if `self` is `other` or
    /// one of its ancestors.
    pub fn distance_to(&self, other: &Member) -> Option<usize> {
        if self.hierarchy == other.hierarchy
            && self.path.len() <= other.path.len()
            && other.path.starts_with(&self.path)
        {
            Some(other.path.len() - self.path.len())
        } else {
            None
        }
    }

    /// True when `self` is a proper ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Member) -> bool {
        matches!(self.distance_to(other), Some(d) if d > 0)
    }

    /// True when `self` is an immediate child of `other`.
    pub fn is_child_of(&self, other: &Member) -> bool {
        other.distance_to(self) == Some(1)
    }

    /// `[Hierarchy].[Root].[Child]`, with `]` escaped as `]]`.
    pub fn unique_name(&self) -> String {
        let mut out = quote_segment(&self.hierarchy);
        for segment in &self.path {
            out.push('.');
            out.push_str(&quote_segment(segment));
        }
        out
    }

    /// Parse a unique name produced by [`Member::unique_name`].
    ///
    /// Unbracketed segments are accepted as-is (`Store.USA`).
    pub fn parse_unique_name(unique_name: &str) -> Result<Self> {
        let segments = parse_segments(unique_name)?;
        let mut iter = segments.into_iter();
        let hierarchy = iter
            .next()
            .ok_or_else(|| Error::InvalidUniqueName(unique_name.to_string()))?;
        Member::new(hierarchy, iter).map_err(|_| Error::InvalidUniqueName(unique_name.to_string()))
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique_name())
    }
}

fn quote_segment(segment: &str) -> String {
    format!("[{}]", segment.replace(']', "]]"))
}

fn parse_segments(input: &str) -> Result<Vec<String>> {
    let invalid = || Error::InvalidUniqueName(input.to_string());
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        let mut segment = String::new();
        if chars.peek() == Some(&'[') {
            chars.next();
            loop {
                match chars.next() {
                    Some(']') if chars.peek() == Some(&']') => {
                        chars.next();
                        segment.push(']');
                    }
                    Some(']') => break,
                    Some(c) => segment.push(c),
                    None => return Err(invalid()),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                segment.push(c);
                chars.next();
            }
            segment = segment.trim().to_string();
        }
        if segment.is_empty() {
            return Err(invalid());
        }
        segments.push(segment);

        match chars.next() {
            Some('.') => continue,
            None => break,
            Some(_) => return Err(invalid()),
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ca() -> Member {
        Member::new("Store", ["All Stores", "USA", "CA"]).unwrap()
    }

    #[test]
    fn test_unique_name_roundtrip_with_escapes() {
        let m = Member::new("Product", ["All", "Drinks [bottled]"]).unwrap();
        assert_eq!(m.unique_name(), "[Product].[All].[Drinks [bottled]]]");
        assert_eq!(Member::parse_unique_name(&m.unique_name()).unwrap(), m);
    }

    #[test]
    fn test_parse_unbracketed() {
        let m = Member::parse_unique_name("Store.All Stores.USA").unwrap();
        assert_eq!(m.path(), &["All Stores".to_string(), "USA".to_string()]);
        assert_eq!(m.hierarchy(), "Store");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Member::parse_unique_name("").is_err());
        assert!(Member::parse_unique_name("[Store]").is_err());
        assert!(Member::parse_unique_name("[Store].[USA").is_err());
        assert!(Member::parse_unique_name("[Store]x.[USA]").is_err());
    }

    #[test]
    fn test_ancestry() {
        let m = ca();
        let root = Member::root("Store", "All Stores");
        assert_eq!(root.distance_to(&m), Some(2));
        assert!(root.is_ancestor_of(&m));
        assert!(!m.is_ancestor_of(&m));
        assert!(m.is_child_of(&m.parent().unwrap()));
        assert_eq!(m.depth(), 2);

        let chain: Vec<_> = m.ancestors_inclusive().map(|a| a.name().to_string()).collect();
        assert_eq!(chain, vec!["CA", "USA", "All Stores"]);
    }

    #[test]
    fn test_deserialize_requires_a_path() {
        let empty = serde_json::from_str::<Member>(r#"{"hierarchy":"Store","path":[]}"#);
        assert!(empty.is_err());

        let json = serde_json::to_string(&ca()).unwrap();
        assert_eq!(json, r#"{"hierarchy":"Store","path":["All Stores","USA","CA"]}"#);
        assert_eq!(serde_json::from_str::<Member>(&json).unwrap(), ca());
    }

    #[test]
    fn test_other_hierarchy_is_unrelated() {
        let other = Member::root("Product", "All Stores");
        assert_eq!(other.distance_to(&ca()), None);
    }
}
