use crate::domain::table::Table;

/// One (train, test) partition of a normalized table.
///
/// The two tables share the same columns and together hold every
/// row of the source table exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Table,
    pub test:  Table,
}

impl Fold {
    pub fn new(train: Table, test: Table) -> Self {
        Self { train, test }
    }
}
