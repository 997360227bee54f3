//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! User input is only ever passed through `.bind()`.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::BigInt;

/// `COUNT(*) OVER()`: the total row count before LIMIT/OFFSET.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Case-insensitive ordering for catalog listings, matching the
/// `LOWER(name)` index.
pub fn lower_name() -> SqlLiteral<diesel::sql_types::Text> {
    sql::<diesel::sql_types::Text>("LOWER(name)")
}
