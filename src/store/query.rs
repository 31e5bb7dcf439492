//! Query constraints and their in-memory evaluation.
//!
//! A query is a collection path plus an ordered list of constraints.
//! Evaluation applies every `where` filter, then sorts by the `orderBy`
//! constraints in declaration order (the first one is the primary key).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::{CollectionRef, Document};
use crate::error::Error;

/// Comparison operator of a `where` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhereOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
}

impl WhereOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereOp::Eq => "==",
            WhereOp::NotEq => "!=",
            WhereOp::Lt => "<",
            WhereOp::Le => "<=",
            WhereOp::Gt => ">",
            WhereOp::Ge => ">=",
            WhereOp::ArrayContains => "array-contains",
            WhereOp::In => "in",
            WhereOp::NotIn => "not-in",
        }
    }
}

impl fmt::Display for WhereOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhereOp {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(WhereOp::Eq),
            "!=" => Ok(WhereOp::NotEq),
            "<" => Ok(WhereOp::Lt),
            "<=" => Ok(WhereOp::Le),
            ">" => Ok(WhereOp::Gt),
            ">=" => Ok(WhereOp::Ge),
            "array-contains" => Ok(WhereOp::ArrayContains),
            "in" => Ok(WhereOp::In),
            "not-in" => Ok(WhereOp::NotIn),
            other => Err(Error::InvalidArgument(format!(
                "unknown where operator '{other}'"
            ))),
        }
    }
}

/// Sort direction of an `orderBy` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(Error::InvalidArgument(format!(
                "invalid direction '{other}': must be asc or desc"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    Where {
        field: String,
        op: WhereOp,
        value: Value,
    },
    OrderBy {
        field: String,
        direction: Direction,
    },
}

pub fn where_field(field: impl Into<String>, op: WhereOp, value: impl Into<Value>) -> Constraint {
    Constraint::Where {
        field: field.into(),
        op,
        value: value.into(),
    }
}

pub fn order_by(field: impl Into<String>, direction: Direction) -> Constraint {
    Constraint::OrderBy {
        field: field.into(),
        direction,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub collection: String,
    pub constraints: Vec<Constraint>,
}

impl Query {
    pub fn new(collection: &CollectionRef) -> Self {
        Self {
            collection: collection.path().to_string(),
            constraints: Vec::new(),
        }
    }

    /// Append a constraint.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Filter and order `docs` according to the constraints.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut result: Vec<Document> = docs
            .into_iter()
            .filter(|doc| self.matches(doc))
            .collect();

        let orderings: Vec<(&str, Direction)> = self
            .constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::OrderBy { field, direction } => Some((field.as_str(), *direction)),
                Constraint::Where { .. } => None,
            })
            .collect();

        if !orderings.is_empty() {
            result.sort_by(|a, b| {
                orderings
                    .iter()
                    .fold(Ordering::Equal, |acc, (field, direction)| {
                        acc.then_with(|| {
                            let left = a.get(field).unwrap_or(&Value::Null);
                            let right = b.get(field).unwrap_or(&Value::Null);
                            let ord = compare_values(left, right);
                            match direction {
                                Direction::Asc => ord,
                                Direction::Desc => ord.reverse(),
                            }
                        })
                    })
            });
        }

        result
    }

    fn matches(&self, doc: &Document) -> bool {
        self.constraints.iter().all(|constraint| match constraint {
            Constraint::Where { field, op, value } => where_matches(doc.get(field), *op, value),
            Constraint::OrderBy { .. } => true,
        })
    }
}

fn where_matches(doc_value: Option<&Value>, op: WhereOp, operand: &Value) -> bool {
    let Some(doc_value) = doc_value else {
        return false;
    };

    let same_class = type_rank(doc_value) == type_rank(operand);
    match op {
        WhereOp::Eq => compare_values(doc_value, operand) == Ordering::Equal,
        WhereOp::NotEq => compare_values(doc_value, operand) != Ordering::Equal,
        WhereOp::Lt => same_class && compare_values(doc_value, operand) == Ordering::Less,
        WhereOp::Le => same_class && compare_values(doc_value, operand) != Ordering::Greater,
        WhereOp::Gt => same_class && compare_values(doc_value, operand) == Ordering::Greater,
        WhereOp::Ge => same_class && compare_values(doc_value, operand) != Ordering::Less,
        WhereOp::ArrayContains => doc_value
            .as_array()
            .map(|items| items.iter().any(|item| values_equal(item, operand)))
            .unwrap_or(false),
        WhereOp::In => operand
            .as_array()
            .map(|choices| choices.iter().any(|choice| values_equal(doc_value, choice)))
            .unwrap_or(false),
        WhereOp::NotIn => operand
            .as_array()
            .map(|choices| !choices.iter().any(|choice| values_equal(doc_value, choice)))
            .unwrap_or(false),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
