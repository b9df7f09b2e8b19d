//! Query hierarchy — a selection bound to one catalog hierarchy.

use crate::catalog::Hierarchy;
use crate::model::{Member, Operator, Rule, Sign};
use crate::selection::Selection;
use crate::Result;

/// The unit placed on axes. Every member passed in is validated against the
/// bound hierarchy before it reaches the selection.
#[derive(Debug, Clone)]
pub struct QueryHierarchy {
    hierarchy: Hierarchy,
    selection: Selection,
}

impl QueryHierarchy {
    pub fn new(hierarchy: Hierarchy) -> Self {
        let selection = Selection::new(hierarchy.name());
        Self { hierarchy, selection }
    }

    pub fn name(&self) -> &str {
        self.hierarchy.name()
    }

    /// The catalog handle, for root/children enumeration.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn include(&mut self, operator: Operator, member: &Member) -> Result<()> {
        self.set(operator, member, Sign::Include)
    }

    pub fn exclude(&mut self, operator: Operator, member: &Member) -> Result<()> {
        self.set(operator, member, Sign::Exclude)
    }

    pub fn set(&mut self, operator: Operator, member: &Member, sign: Sign) -> Result<()> {
        self.hierarchy.check(member)?;
        self.selection.set(operator, member, sign)
    }

    pub fn remove(&mut self, operator: Operator, member: &Member) -> Result<Option<Rule>> {
        self.hierarchy.check(member)?;
        self.selection.remove(operator, member)
    }

    pub fn is_included(&self, member: &Member) -> Result<bool> {
        self.hierarchy.check(member)?;
        self.selection.is_included(member)
    }

    pub fn effective_sign_at(&self, member: &Member, operator: Operator) -> Result<Sign> {
        self.hierarchy.check(member)?;
        self.selection.effective_sign_at(member, operator)
    }

    pub fn scope_sign(&self, member: &Member, operator: Operator) -> Result<Sign> {
        self.hierarchy.check(member)?;
        self.selection.scope_sign(member, operator)
    }

    pub fn has_overriding_children(&self, member: &Member) -> Result<bool> {
        self.hierarchy.check(member)?;
        self.selection.has_overriding_children(member)
    }

    pub fn has_overriding_descendants(&self, member: &Member) -> Result<bool> {
        self.hierarchy.check(member)?;
        self.selection.has_overriding_descendants(member)
    }

    /// Every included member, parents before their children, in catalog order.
    ///
    /// Subtrees the selection cannot reach are never asked for their children.
    pub fn included_members(&self) -> Result<Vec<Member>> {
        let mut out = Vec::new();
        for root in self.hierarchy.root_members()? {
            self.collect(&root, &mut out)?;
        }
        Ok(out)
    }

    fn collect(&self, member: &Member, out: &mut Vec<Member>) -> Result<()> {
        if self.selection.is_included(member)? {
            out.push(member.clone());
        }
        if self.selection.may_include_below(member) {
            for child in self.hierarchy.children(member)? {
                self.collect(&child, out)?;
            }
        }
        Ok(())
    }
}
