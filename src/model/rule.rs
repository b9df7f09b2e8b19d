//! Selection rules — scoped include/exclude statements anchored at a member.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Member;

/// Granularity a rule applies at, relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// The anchor itself.
    Member,
    /// The anchor's immediate children (not the anchor, not grandchildren).
    Children,
    /// Every proper descendant of the anchor.
    Descendants,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Member, Operator::Children, Operator::Descendants];

    /// Whether a rule with this operator reaches a member `distance` levels
    /// below its anchor.
    pub fn reaches(self, distance: usize) -> bool {
        match self {
            Operator::Member => distance == 0,
            Operator::Children => distance == 1,
            Operator::Descendants => distance >= 1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Member => "MEMBER",
            Operator::Children => "CHILDREN",
            Operator::Descendants => "DESCENDANTS",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sign {
    Include,
    Exclude,
}

impl Sign {
    pub fn is_include(self) -> bool {
        self == Sign::Include
    }
}

/// An immutable `(anchor, operator, sign)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub anchor: Member,
    pub operator: Operator,
    pub sign: Sign,
}

impl Rule {
    pub fn new(anchor: Member, operator: Operator, sign: Sign) -> Self {
        Self { anchor, operator, sign }
    }

    /// Whether this rule decides anything about `member`.
    pub fn applies_to(&self, member: &Member) -> bool {
        self.anchor
            .distance_to(member)
            .is_some_and(|d| self.operator.reaches(d))
    }

    /// Same `(anchor, operator)` key: the uniqueness key inside a selection.
    pub fn same_scope(&self, anchor: &Member, operator: Operator) -> bool {
        self.operator == operator && &self.anchor == anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_reach() {
        assert!(Operator::Member.reaches(0));
        assert!(!Operator::Member.reaches(1));
        assert!(Operator::Children.reaches(1));
        assert!(!Operator::Children.reaches(0));
        assert!(!Operator::Children.reaches(2));
        assert!(Operator::Descendants.reaches(1));
        assert!(Operator::Descendants.reaches(7));
        assert!(!Operator::Descendants.reaches(0));
    }

    #[test]
    fn test_rule_applies_to() {
        let root = Member::root("Store", "All Stores");
        let usa = root.child("USA");
        let ca = usa.child("CA");

        let children = Rule::new(root.clone(), Operator::Children, Sign::Include);
        assert!(children.applies_to(&usa));
        assert!(!children.applies_to(&ca));
        assert!(!children.applies_to(&root));

        let descendants = Rule::new(root.clone(), Operator::Descendants, Sign::Include);
        assert!(descendants.applies_to(&ca));
        assert!(!descendants.applies_to(&root));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Operator::Descendants).unwrap(), "\"DESCENDANTS\"");
        assert_eq!(serde_json::to_string(&Sign::Exclude).unwrap(), "\"EXCLUDE\"");
    }
}
