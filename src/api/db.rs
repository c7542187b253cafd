use log::{log, Level};

use crate::error::Error;

/// Serves `fallback` in place of a failed read so the client renders an
/// empty state instead of an error page. Writes never pass through here;
/// they propagate their store error.
pub fn or_degraded<T>(result: Result<T, Error>, fallback: T, what: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            log!(Level::Warn, "store unavailable, serving empty {what}: {e}");
            fallback
        }
    }
}

/// True when the store rejected a write because the referenced parent row
/// does not exist (SQLSTATE 23503).
pub fn is_fk_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23503"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_degrade_to_the_fallback() {
        let degraded: Vec<i32> = or_degraded(
            Err(Error::Store(sqlx::Error::PoolTimedOut)),
            Vec::new(),
            "leader list",
        );
        assert!(degraded.is_empty());
        assert_eq!(or_degraded(Ok(vec![1, 2]), Vec::new(), "leader list"), vec![1, 2]);
    }

    #[test]
    fn non_database_errors_are_not_fk_violations() {
        assert!(!is_fk_violation(&sqlx::Error::RowNotFound));
        assert!(!is_fk_violation(&sqlx::Error::PoolTimedOut));
    }
}
