/// Returns the database message when `err` is a unique-constraint violation
/// (SQLSTATE 23505). The constraint is the authoritative uniqueness guard;
/// exists-pre-checks in create paths are only an optimization.
pub fn check_duplicate_error(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return Some(db_err.message().to_string());
        }
    }
    None
}
