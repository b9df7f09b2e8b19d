//! # Query Model
//!
//! Plain DTOs shared by every layer: members, rules and axis identifiers.
//!
//! Design rule: no catalog handles, no engine types here.
//! This module is pure data with no I/O and no async.

pub mod member;
pub mod rule;
pub mod axis;

pub use member::{Member, MemberPath};
pub use rule::{Operator, Rule, Sign};
pub use axis::AxisId;
