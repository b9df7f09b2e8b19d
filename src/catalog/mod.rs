//! # Hierarchy Catalog Trait
//!
//! The contract between the query model and whatever owns cube metadata.
//! The catalog is read-only from this crate's point of view and may be shared
//! by any number of sessions, so implementations must be `Send + Sync`.
//!
//! ## Implementations
//!
//! | Catalog | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryCatalog` | `memory` | In-memory member trees for testing/embedding |

pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::Member;
use crate::{Error, Result};

pub use memory::MemoryCatalog;

// ============================================================================
// Hierarchy metadata
// ============================================================================

/// Name and caption of a hierarchy, as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyInfo {
    pub name: String,
    pub caption: String,
}

impl HierarchyInfo {
    pub fn new(name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self { name: name.into(), caption: caption.into() }
    }

    /// `[Name]`
    pub fn unique_name(&self) -> String {
        format!("[{}]", self.name.replace(']', "]]"))
    }
}

// ============================================================================
// HierarchyCatalog Trait
// ============================================================================

/// Read-only navigation over the member trees of one cube.
///
/// Parent lookup and leaf-ness have default implementations derived from the
/// member path and `children()`; catalogs with cheaper answers override them.
pub trait HierarchyCatalog: Send + Sync {
    /// Hierarchies the cube exposes, in catalog order.
    fn hierarchies(&self) -> Vec<HierarchyInfo>;

    /// Root members of `hierarchy`, in catalog order.
    fn root_members(&self, hierarchy: &str) -> Result<Vec<Member>>;

    /// Immediate children of `member`, in catalog order.
    fn children(&self, member: &Member) -> Result<Vec<Member>>;

    /// Whether `member` exists in this catalog.
    fn contains(&self, member: &Member) -> bool;

    /// Display caption; defaults to the member name.
    fn caption(&self, member: &Member) -> String {
        member.name().to_string()
    }

    /// Parent of `member`; `None` for a root.
    fn parent(&self, member: &Member) -> Option<Member> {
        member.parent()
    }

    fn is_leaf(&self, member: &Member) -> Result<bool> {
        Ok(self.children(member)?.is_empty())
    }

    /// Resolve a unique name to a member of this catalog.
    fn lookup_member(&self, unique_name: &str) -> Result<Member> {
        let member = Member::parse_unique_name(unique_name)?;
        if self.contains(&member) {
            Ok(member)
        } else {
            Err(Error::UnknownMember(unique_name.to_string()))
        }
    }
}

// ============================================================================
// Cube & Hierarchy handles
// ============================================================================

/// A named cube backed by a shared catalog.
#[derive(Clone)]
pub struct Cube {
    name: String,
    catalog: Arc<dyn HierarchyCatalog>,
}

impl Cube {
    pub fn new(name: impl Into<String>, catalog: Arc<dyn HierarchyCatalog>) -> Self {
        Self { name: name.into(), catalog }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Arc<dyn HierarchyCatalog> {
        &self.catalog
    }

    pub fn hierarchies(&self) -> Vec<HierarchyInfo> {
        self.catalog.hierarchies()
    }

    /// Handle on one hierarchy; `UnknownDimension` if the cube has none by that name.
    pub fn hierarchy(&self, name: &str) -> Result<Hierarchy> {
        self.catalog
            .hierarchies()
            .into_iter()
            .find(|h| h.name == name)
            .map(|info| Hierarchy { info, catalog: Arc::clone(&self.catalog) })
            .ok_or_else(|| Error::UnknownDimension(name.to_string()))
    }

    pub fn lookup_member(&self, unique_name: &str) -> Result<Member> {
        self.catalog.lookup_member(unique_name)
    }
}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cube").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One hierarchy of a cube, bound to the catalog that navigates it.
#[derive(Clone)]
pub struct Hierarchy {
    info: HierarchyInfo,
    catalog: Arc<dyn HierarchyCatalog>,
}

impl Hierarchy {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn caption(&self) -> &str {
        &self.info.caption
    }

    pub fn info(&self) -> &HierarchyInfo {
        &self.info
    }

    pub fn root_members(&self) -> Result<Vec<Member>> {
        self.catalog.root_members(&self.info.name)
    }

    pub fn children(&self, member: &Member) -> Result<Vec<Member>> {
        self.check(member)?;
        self.catalog.children(member)
    }

    pub fn parent(&self, member: &Member) -> Result<Option<Member>> {
        self.check(member)?;
        Ok(self.catalog.parent(member))
    }

    pub fn is_leaf(&self, member: &Member) -> Result<bool> {
        self.check(member)?;
        self.catalog.is_leaf(member)
    }

    pub fn member_caption(&self, member: &Member) -> String {
        self.catalog.caption(member)
    }

    /// `InvalidMember` unless `member` is a catalog member of this hierarchy.
    pub fn check(&self, member: &Member) -> Result<()> {
        if member.hierarchy() == self.info.name && self.catalog.contains(member) {
            Ok(())
        } else {
            Err(Error::InvalidMember {
                member: member.unique_name(),
                hierarchy: self.info.name.clone(),
            })
        }
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy").field("info", &self.info).finish_non_exhaustive()
    }
}
