//! Types for the PostgrestClient

/// Options for returning data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return representation (the data)
    Representation,

    /// Return minimal data
    Minimal,
}

impl ReturnOption {
    /// Value of the `Prefer` header
    pub fn as_prefer(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "return=representation",
            ReturnOption::Minimal => "return=minimal",
        }
    }
}

/// Sort direction for `order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}
