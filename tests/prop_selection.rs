//! Property tests for selection resolution and axis ordering.

use std::sync::Arc;

use olap_query::{AxisId, Cube, Member, MemoryCatalog, Operator, Query, Selection, Sign};
use proptest::prelude::*;

/// Every member of a small fixed tree: one root, two children, four grandchildren.
fn members() -> Vec<Member> {
    let root = Member::root("H", "All");
    let mut out = vec![root.clone()];
    for a in ["a", "b"] {
        let child = root.child(a);
        out.push(child.clone());
        for leaf in ["x", "y"] {
            out.push(child.child(leaf));
        }
    }
    out
}

fn operation() -> impl Strategy<Value = (usize, Operator, Sign)> {
    (
        0..7usize,
        prop_oneof![Just(Operator::Member), Just(Operator::Children), Just(Operator::Descendants)],
        prop_oneof![Just(Sign::Include), Just(Sign::Exclude)],
    )
}

fn apply(ops: &[(usize, Operator, Sign)]) -> Selection {
    let all = members();
    let mut selection = Selection::new("H");
    for &(i, op, sign) in ops {
        selection.set(op, &all[i], sign).unwrap();
    }
    selection
}

/// Reference resolution: scopes keep the slot of their first rule, the
/// latest sign for a scope wins, and the highest slot reaching the member decides.
fn oracle(ops: &[(usize, Operator, Sign)], member: &Member) -> bool {
    let all = members();
    let mut scopes: Vec<(usize, Operator, Sign)> = Vec::new();
    for &(i, op, sign) in ops {
        match scopes.iter_mut().find(|(j, o, _)| *j == i && *o == op) {
            Some(slot) => slot.2 = sign,
            None => scopes.push((i, op, sign)),
        }
    }
    scopes
        .iter()
        .rev()
        .find(|(i, op, _)| match all[*i].distance_to(member) {
            Some(0) => *op == Operator::Member,
            Some(1) => *op != Operator::Member,
            Some(_) => *op == Operator::Descendants,
            None => false,
        })
        .is_some_and(|(_, _, sign)| *sign == Sign::Include)
}

proptest! {
    #[test]
    fn prop_membership_matches_reference(ops in prop::collection::vec(operation(), 0..24)) {
        let selection = apply(&ops);
        for m in members() {
            prop_assert_eq!(selection.is_included(&m).unwrap(), oracle(&ops, &m), "member {}", m);
        }
    }

    #[test]
    fn prop_one_rule_per_scope(ops in prop::collection::vec(operation(), 0..24)) {
        let selection = apply(&ops);
        let rules = selection.rules();
        for (i, a) in rules.iter().enumerate() {
            for b in &rules[i + 1..] {
                prop_assert!(!(a.anchor == b.anchor && a.operator == b.operator));
            }
        }
    }

    #[test]
    fn prop_repeating_last_operation_is_noop(
        ops in prop::collection::vec(operation(), 1..24),
    ) {
        let once = apply(&ops);
        let mut twice = ops.clone();
        twice.push(*ops.last().unwrap());
        prop_assert_eq!(apply(&twice), once);
    }

    #[test]
    fn prop_pruning_never_hides_included_members(
        ops in prop::collection::vec(operation(), 0..24),
    ) {
        let selection = apply(&ops);
        for m in members() {
            if selection.is_included(&m).unwrap() {
                for ancestor in m.ancestors_inclusive().skip(1) {
                    prop_assert!(selection.may_include_below(&ancestor), "{} hidden under {}", m, ancestor);
                }
            }
        }
    }

    #[test]
    fn prop_push_down_then_pull_up_restores(count in 2..6usize, pick in 0..5usize) {
        let catalog = MemoryCatalog::new();
        let names: Vec<String> = (0..count).map(|i| format!("H{i}")).collect();
        for name in &names {
            catalog.add_hierarchy(name.as_str(), name.as_str());
        }
        let mut query = Query::new("q", Cube::new("C", Arc::new(catalog)));
        let mut axis = query.axis_mut(AxisId::Rows).unwrap();
        for name in &names {
            axis.add_hierarchy(name).unwrap();
        }

        let index = pick % (count - 1);
        axis.push_down(index).unwrap();
        prop_assert_eq!(&axis.hierarchies()[index], &names[index + 1]);
        axis.pull_up(index + 1).unwrap();
        prop_assert_eq!(axis.hierarchies(), names.as_slice());
    }
}

#[test]
fn test_empty_selection_excludes_everything() {
    let selection = Selection::new("H");
    for m in members() {
        assert!(!selection.is_included(&m).unwrap());
    }
}
