//! Filter operations for PostgrestClient

use std::fmt;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than or equal to
    Gte,

    /// Less than or equal to
    Lte,

    /// Is (`null`, `true`, `false`)
    Is,

    /// In a list of values
    In,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
        }
    }
}

/// A single `column=op.value` query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Column the filter applies to
    pub column: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Operand, already rendered
    pub value: String,
}

impl Filter {
    /// Build a filter from any displayable operand
    pub fn new<T: fmt::Display>(column: &str, operator: FilterOperator, value: T) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    /// Build an `in.(a,b,c)` filter
    pub fn in_list<T: fmt::Display>(column: &str, values: &[T]) -> Self {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        Self {
            column: column.to_string(),
            operator: FilterOperator::In,
            value: format!("({})", values.join(",")),
        }
    }

    /// Render as a query pair
    pub fn to_param(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.operator.as_str(), self.value),
        )
    }
}
