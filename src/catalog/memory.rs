//! In-memory hierarchy catalog.
//!
//! This is the reference implementation of `HierarchyCatalog`.
//! It keeps every member in a HashMap protected by RwLock, so one catalog can
//! be shared across sessions while still being populated.
//!
//! ## Loading
//!
//! Build it member by member with [`MemoryCatalog::add_member`], or load a
//! whole cube from JSON:
//!
//! ```json
//! { "hierarchies": [
//!     { "name": "Store", "caption": "Store",
//!       "members": [ { "name": "All Stores", "children": [ { "name": "USA" } ] } ] }
//! ] }
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::model::Member;
use crate::{Error, Result};
use super::{HierarchyCatalog, HierarchyInfo};

// ============================================================================
// MemoryCatalog
// ============================================================================

/// In-memory member trees for one cube.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<CatalogInner>,
}

#[derive(Default)]
struct CatalogInner {
    /// Catalog order matters for listing, so hierarchies stay in a Vec.
    hierarchies: RwLock<Vec<HierarchyEntry>>,
    members: RwLock<HashMap<Member, MemberEntry>>,
}

struct HierarchyEntry {
    info: HierarchyInfo,
    roots: Vec<Member>,
}

struct MemberEntry {
    caption: String,
    children: Vec<Member>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hierarchy. Re-registering only updates the caption.
    pub fn add_hierarchy(&self, name: impl Into<String>, caption: impl Into<String>) {
        let info = HierarchyInfo::new(name, caption);
        let mut hierarchies = self.inner.hierarchies.write();
        match hierarchies.iter_mut().find(|h| h.info.name == info.name) {
            Some(entry) => entry.info.caption = info.caption,
            None => hierarchies.push(HierarchyEntry { info, roots: Vec::new() }),
        }
    }

    /// Insert `member`, creating any missing ancestors on the way down.
    ///
    /// Fails with `UnknownDimension` if its hierarchy was never registered.
    pub fn add_member(&self, member: &Member, caption: Option<&str>) -> Result<()> {
        let mut hierarchies = self.inner.hierarchies.write();
        let entry = hierarchies
            .iter_mut()
            .find(|h| h.info.name == member.hierarchy())
            .ok_or_else(|| Error::UnknownDimension(member.hierarchy().to_string()))?;

        let mut members = self.inner.members.write();
        let chain: Vec<Member> = member.ancestors_inclusive().collect();
        for node in chain.iter().rev() {
            if members.contains_key(node) {
                continue;
            }
            match node.parent() {
                Some(parent) => {
                    if let Some(parent_entry) = members.get_mut(&parent) {
                        parent_entry.children.push(node.clone());
                    }
                }
                None => entry.roots.push(node.clone()),
            }
            members.insert(
                node.clone(),
                MemberEntry { caption: node.name().to_string(), children: Vec::new() },
            );
        }

        if let (Some(caption), Some(target)) = (caption, members.get_mut(member)) {
            target.caption = caption.to_string();
        }
        Ok(())
    }

    /// Load a cube from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        let catalog = Self::new();
        for hierarchy in doc.hierarchies {
            let caption = hierarchy.caption.unwrap_or_else(|| hierarchy.name.clone());
            catalog.add_hierarchy(hierarchy.name.clone(), caption);
            for root in &hierarchy.members {
                catalog.load_tree(Member::root(hierarchy.name.clone(), root.name.clone()), root)?;
            }
        }
        Ok(catalog)
    }

    fn load_tree(&self, member: Member, doc: &MemberDoc) -> Result<()> {
        self.add_member(&member, doc.caption.as_deref())?;
        for child in &doc.children {
            self.load_tree(member.child(child.name.clone()), child)?;
        }
        Ok(())
    }

    pub fn member_count(&self) -> usize {
        self.inner.members.read().len()
    }
}

// ============================================================================
// HierarchyCatalog impl
// ============================================================================

impl HierarchyCatalog for MemoryCatalog {
    fn hierarchies(&self) -> Vec<HierarchyInfo> {
        self.inner.hierarchies.read().iter().map(|h| h.info.clone()).collect()
    }

    fn root_members(&self, hierarchy: &str) -> Result<Vec<Member>> {
        self.inner
            .hierarchies
            .read()
            .iter()
            .find(|h| h.info.name == hierarchy)
            .map(|h| h.roots.clone())
            .ok_or_else(|| Error::UnknownDimension(hierarchy.to_string()))
    }

    fn children(&self, member: &Member) -> Result<Vec<Member>> {
        self.inner
            .members
            .read()
            .get(member)
            .map(|e| e.children.clone())
            .ok_or_else(|| Error::UnknownMember(member.unique_name()))
    }

    fn contains(&self, member: &Member) -> bool {
        self.inner.members.read().contains_key(member)
    }

    fn caption(&self, member: &Member) -> String {
        self.inner
            .members
            .read()
            .get(member)
            .map(|e| e.caption.clone())
            .unwrap_or_else(|| member.name().to_string())
    }

    fn is_leaf(&self, member: &Member) -> Result<bool> {
        self.inner
            .members
            .read()
            .get(member)
            .map(|e| e.children.is_empty())
            .ok_or_else(|| Error::UnknownMember(member.unique_name()))
    }
}

// ============================================================================
// JSON document
// ============================================================================

#[derive(Deserialize)]
struct CatalogDoc {
    hierarchies: Vec<HierarchyDoc>,
}

#[derive(Deserialize)]
struct HierarchyDoc {
    name: String,
    caption: Option<String>,
    #[serde(default)]
    members: Vec<MemberDoc>,
}

#[derive(Deserialize)]
struct MemberDoc {
    name: String,
    caption: Option<String>,
    #[serde(default)]
    children: Vec<MemberDoc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Cube;

    const SALES: &str = r#"{
        "hierarchies": [
            { "name": "Store", "members": [
                { "name": "All Stores", "children": [
                    { "name": "USA", "children": [ { "name": "CA" }, { "name": "OR" } ] },
                    { "name": "Canada", "caption": "Canada (BC)" }
                ] }
            ] },
            { "name": "Measures", "caption": "Measures", "members": [
                { "name": "Unit Sales" }, { "name": "Store Cost" }
            ] }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let catalog = MemoryCatalog::from_json(SALES).unwrap();
        assert_eq!(catalog.member_count(), 7);
        assert_eq!(catalog.hierarchies().len(), 2);

        let roots = catalog.root_members("Measures").unwrap();
        assert_eq!(roots.len(), 2);
        assert!(catalog.is_leaf(&roots[0]).unwrap());

        let root = Member::root("Store", "All Stores");
        let children = catalog.children(&root).unwrap();
        let names: Vec<_> = children.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["USA", "Canada"]);
        assert_eq!(catalog.caption(&children[1]), "Canada (BC)");
    }

    #[test]
    fn test_add_member_creates_ancestors() {
        let catalog = MemoryCatalog::new();
        catalog.add_hierarchy("Time", "Time");
        let q1 = Member::new("Time", ["1997", "Q1"]).unwrap();
        catalog.add_member(&q1.child("1"), None).unwrap();

        assert!(catalog.contains(&q1));
        assert_eq!(catalog.root_members("Time").unwrap(), vec![Member::root("Time", "1997")]);
        assert!(!catalog.is_leaf(&q1).unwrap());
    }

    #[test]
    fn test_unknown_hierarchy_and_member() {
        let catalog = MemoryCatalog::from_json(SALES).unwrap();
        assert!(matches!(
            catalog.add_member(&Member::root("Product", "All"), None),
            Err(Error::UnknownDimension(_))
        ));
        assert!(matches!(
            catalog.lookup_member("[Store].[All Stores].[Mexico]"),
            Err(Error::UnknownMember(_))
        ));
        assert_eq!(
            catalog.lookup_member("[Store].[All Stores].[USA]").unwrap(),
            Member::new("Store", ["All Stores", "USA"]).unwrap()
        );
    }

    #[test]
    fn test_hierarchy_parent() {
        let cube = Cube::new("Sales", Arc::new(MemoryCatalog::from_json(SALES).unwrap()));
        let store = cube.hierarchy("Store").unwrap();
        let ca = Member::new("Store", ["All Stores", "USA", "CA"]).unwrap();

        assert_eq!(
            store.parent(&ca).unwrap(),
            Some(Member::new("Store", ["All Stores", "USA"]).unwrap())
        );
        assert_eq!(store.parent(&Member::root("Store", "All Stores")).unwrap(), None);
        assert!(matches!(
            store.parent(&Member::root("Measures", "Unit Sales")),
            Err(Error::InvalidMember { .. })
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(MemoryCatalog::from_json("{"), Err(Error::Serde(_))));
    }
}
