//! # Selection — scoped include/exclude rules for one hierarchy
//!
//! A selection is an ordered rule list. Position is precedence: a later rule
//! beats an earlier one whenever both reach the same member. Re-stating a rule
//! for an existing `(anchor, operator)` pair replaces it in place, so toggling
//! a sign never changes its rank relative to unrelated rules.
//!
//! ## Resolution
//!
//! For a member `m`, a rule anchored at `a` is a candidate when `a` is `m` or
//! an ancestor of `m` at distance `d`, and the rule's operator reaches `d`:
//!
//! | Operator | reaches |
//! |----------|---------|
//! | `Member` | `d == 0` |
//! | `Children` | `d == 1` |
//! | `Descendants` | `d >= 1` |
//!
//! The highest-ranked candidate decides. No candidate means excluded.
//!
//! Nothing here is cached: override flags and effective signs are derived
//! from the rule list on every call.

use tracing::debug;

use crate::model::{Member, Operator, Rule, Sign};
use crate::{Error, Result};

/// Rule set scoped to a single hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    hierarchy: String,
    rules: Vec<Rule>,
}

impl Selection {
    /// An empty selection: every member of `hierarchy` is excluded.
    pub fn new(hierarchy: impl Into<String>) -> Self {
        Self {
            hierarchy: hierarchy.into(),
            rules: Vec::new(),
        }
    }

    pub fn hierarchy(&self) -> &str {
        &self.hierarchy
    }

    /// Rules in precedence order, lowest first.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The stored rule for `(member, operator)`, if any.
    pub fn rule_at(&self, member: &Member, operator: Operator) -> Option<&Rule> {
        self.rules.iter().find(|r| r.same_scope(member, operator))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub fn include(&mut self, operator: Operator, member: &Member) -> Result<()> {
        self.set(operator, member, Sign::Include)
    }

    pub fn exclude(&mut self, operator: Operator, member: &Member) -> Result<()> {
        self.set(operator, member, Sign::Exclude)
    }

    /// Insert or replace the rule for `(member, operator)`.
    pub fn set(&mut self, operator: Operator, member: &Member, sign: Sign) -> Result<()> {
        self.check(member)?;
        match self.rules.iter_mut().find(|r| r.same_scope(member, operator)) {
            Some(existing) => {
                debug!(hierarchy = %self.hierarchy, %member, %operator, ?sign, "replace rule");
                existing.sign = sign;
            }
            None => {
                debug!(hierarchy = %self.hierarchy, %member, %operator, ?sign, "append rule");
                self.rules.push(Rule::new(member.clone(), operator, sign));
            }
        }
        Ok(())
    }

    /// Drop the rule for `(member, operator)`, returning it if it existed.
    pub fn remove(&mut self, operator: Operator, member: &Member) -> Result<Option<Rule>> {
        self.check(member)?;
        let idx = self.rules.iter().position(|r| r.same_scope(member, operator));
        let removed = idx.map(|idx| self.rules.remove(idx));
        if removed.is_some() {
            debug!(hierarchy = %self.hierarchy, %member, %operator, "remove rule");
        }
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    pub fn is_included(&self, member: &Member) -> Result<bool> {
        Ok(self.effective_sign(member)?.is_include())
    }

    /// The sign `member` currently resolves to.
    pub fn effective_sign(&self, member: &Member) -> Result<Sign> {
        self.check(member)?;
        Ok(self.winner(|r| r.applies_to(member)).map_or(Sign::Exclude, |(_, r)| r.sign))
    }

    /// The sign in force for the `(member, operator)` scope when the rule
    /// stored for exactly that scope is ignored: what a new rule there would
    /// be overriding.
    ///
    /// The scope's target is `member` itself for `Member`, a generic child for
    /// `Children` and a generic descendant for `Descendants`. Rules anchored
    /// below `member` are overrides, not part of the scope.
    pub fn effective_sign_at(&self, member: &Member, operator: Operator) -> Result<Sign> {
        self.check(member)?;
        let winner = self.winner(|r| {
            !r.same_scope(member, operator) && reaches_scope(r, member, operator)
        });
        Ok(winner.map_or(Sign::Exclude, |(_, r)| r.sign))
    }

    /// The sign currently in force for the `(member, operator)` scope,
    /// counting the rule stored there.
    pub fn scope_sign(&self, member: &Member, operator: Operator) -> Result<Sign> {
        self.check(member)?;
        Ok(self.scope_rule(member, operator).1)
    }

    /// Whether a rule anchored at an immediate child of `member` outranks and
    /// contradicts the rule deciding `member`'s children scope.
    pub fn has_overriding_children(&self, member: &Member) -> Result<bool> {
        self.check(member)?;
        Ok(self.has_override(member, Operator::Children, |anchor| anchor.is_child_of(member)))
    }

    /// Whether a rule anchored anywhere below `member` outranks and
    /// contradicts the rule deciding `member`'s descendants scope.
    pub fn has_overriding_descendants(&self, member: &Member) -> Result<bool> {
        self.check(member)?;
        Ok(self.has_override(member, Operator::Descendants, |anchor| member.is_ancestor_of(anchor)))
    }

    /// Conservative test used when walking a hierarchy: false only when no
    /// member strictly below `member` can possibly be included.
    pub fn may_include_below(&self, member: &Member) -> bool {
        self.rules.iter().filter(|r| r.sign.is_include()).any(|r| {
            (r.anchor == *member && r.operator != Operator::Member)
                || member.is_ancestor_of(&r.anchor)
                || (r.anchor.is_ancestor_of(member) && r.operator == Operator::Descendants)
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check(&self, member: &Member) -> Result<()> {
        if member.hierarchy() == self.hierarchy {
            Ok(())
        } else {
            Err(Error::InvalidMember {
                member: member.unique_name(),
                hierarchy: self.hierarchy.clone(),
            })
        }
    }

    /// Highest-ranked rule matching `pred`, with its rank.
    fn winner(&self, pred: impl Fn(&Rule) -> bool) -> Option<(usize, &Rule)> {
        self.rules.iter().enumerate().rev().find(|(_, r)| pred(r))
    }

    /// Rank and sign of the rule deciding the `(member, operator)` scope.
    fn scope_rule(&self, member: &Member, operator: Operator) -> (Option<usize>, Sign) {
        match self.winner(|r| reaches_scope(r, member, operator)) {
            Some((rank, r)) => (Some(rank), r.sign),
            None => (None, Sign::Exclude),
        }
    }

    fn has_override(
        &self,
        member: &Member,
        scope: Operator,
        below: impl Fn(&Member) -> bool,
    ) -> bool {
        let (rank, sign) = self.scope_rule(member, scope);
        self.rules.iter().enumerate().any(|(idx, r)| {
            below(&r.anchor) && rank.is_none_or(|k| idx > k) && r.sign != sign
        })
    }
}

/// Whether `rule` reaches the generic target of the `(member, operator)` scope.
fn reaches_scope(rule: &Rule, member: &Member, operator: Operator) -> bool {
    match operator {
        Operator::Member => rule.applies_to(member),
        Operator::Children => {
            (rule.anchor == *member && rule.operator != Operator::Member)
                || (rule.anchor.is_ancestor_of(member) && rule.operator == Operator::Descendants)
        }
        Operator::Descendants => {
            rule.operator == Operator::Descendants
                && (rule.anchor == *member || rule.anchor.is_ancestor_of(member))
        }
    }
}
