//! Validated filter and order trees.
//!
//! A [`FilterNode`] only exists after parsing succeeded against a schema and
//! an adapter, so every `Field` operator is legal for its field's kind. The
//! tree is owned by the request that built it and never mutated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::adapter::AdapterId;
use crate::kind::Operator;

/// A node in a parsed filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    /// Conjunction. `And([])` is the identity ("no constraint").
    And(Vec<FilterNode>),
    /// Disjunction. `Or([])` matches nothing.
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    /// Built-in operator on a schema field.
    Field {
        field: String,
        operator: Operator,
        value: Value,
    },
    /// Operator resolved by the custom filter registry.
    Custom {
        field: String,
        operator: String,
        value: Value,
    },
}

impl FilterNode {
    /// The "no constraint" node.
    pub fn identity() -> Self {
        FilterNode::And(Vec::new())
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, FilterNode::And(children) if children.is_empty())
    }

    pub fn field(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        FilterNode::Field {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn negate(node: FilterNode) -> Self {
        FilterNode::Not(Box::new(node))
    }

    /// Combinator nesting depth; leaves are depth 0.
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::And(children) | FilterNode::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            FilterNode::Not(child) => 1 + child.depth(),
            FilterNode::Field { .. } | FilterNode::Custom { .. } => 0,
        }
    }

    /// Number of leaf predicates.
    pub fn predicate_count(&self) -> usize {
        match self {
            FilterNode::And(children) | FilterNode::Or(children) => {
                children.iter().map(Self::predicate_count).sum()
            }
            FilterNode::Not(child) => child.predicate_count(),
            FilterNode::Field { .. } | FilterNode::Custom { .. } => 1,
        }
    }
}

impl Default for FilterNode {
    fn default() -> Self {
        Self::identity()
    }
}

/// A filter tree together with the entity and adapter it was validated
/// against. Compiling under a different adapter is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundFilter {
    pub adapter: AdapterId,
    pub entity: String,
    pub root: FilterNode,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

/// Where nulls sort. `Default` leaves it to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsPosition {
    First,
    Last,
    #[default]
    Default,
}

/// One order clause as requested by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub nulls: NullsPosition,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
            nulls: NullsPosition::Default,
        }
    }

    pub fn nulls(mut self, nulls: NullsPosition) -> Self {
        self.nulls = nulls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity() {
        assert!(FilterNode::identity().is_identity());
        assert!(FilterNode::default().is_identity());
        assert!(!FilterNode::Or(Vec::new()).is_identity());
    }

    #[test]
    fn test_depth_and_count() {
        let leaf = FilterNode::field("age", Operator::Gte, json!(18));
        let tree = FilterNode::And(vec![
            leaf.clone(),
            FilterNode::negate(FilterNode::Or(vec![leaf.clone(), leaf.clone()])),
        ]);

        assert_eq!(leaf.depth(), 0);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.predicate_count(), 3);
    }
}
