//! Append-only discussion threads. Comments are never edited or deleted;
//! retrieval re-reads the current state ordered by creation time.

use sqlx::{Pool, Postgres};

use crate::api::db::is_fk_violation;
use crate::error::Error;
use crate::schema::api::CommentResponse;
use crate::schema::db::CommentRow;

pub const MAX_BODY_CHARS: usize = 1000;
const MAX_DISPLAY_NAME_CHARS: usize = 255;

/// Exactly one parent per comment, enforced before the row is written (and
/// again by the store's CHECK constraint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Leader(i32),
    Agenda(i32),
}

impl CommentTarget {
    pub fn from_ids(leader_id: Option<i32>, agenda_id: Option<i32>) -> Result<Self, Error> {
        match (leader_id, agenda_id) {
            (Some(id), None) => Ok(CommentTarget::Leader(id)),
            (None, Some(id)) => Ok(CommentTarget::Agenda(id)),
            _ => Err(Error::InvalidCommentTarget),
        }
    }

    fn column(self) -> &'static str {
        match self {
            CommentTarget::Leader(_) => "leader_id",
            CommentTarget::Agenda(_) => "agenda_id",
        }
    }

    fn id(self) -> i32 {
        match self {
            CommentTarget::Leader(id) | CommentTarget::Agenda(id) => id,
        }
    }

    fn name(self) -> &'static str {
        match self {
            CommentTarget::Leader(_) => "leader",
            CommentTarget::Agenda(_) => "agenda",
        }
    }
}

pub fn validate_body(body: &str) -> Result<(), Error> {
    let chars = body.chars().count();
    if chars == 0 || chars > MAX_BODY_CHARS {
        return Err(Error::Validation(format!(
            "comment body must be 1-{MAX_BODY_CHARS} characters"
        )));
    }
    Ok(())
}

/// Appends a comment and returns the updated thread for its target.
pub async fn append(
    db: &Pool<Postgres>,
    target: CommentTarget,
    author_id: &str,
    display_name: Option<&str>,
    body: &str,
) -> Result<Vec<CommentResponse>, Error> {
    validate_body(body)?;
    if let Some(name) = display_name {
        if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            return Err(Error::Validation(format!(
                "display name must be at most {MAX_DISPLAY_NAME_CHARS} characters"
            )));
        }
    }
    let sql = format!(
        "INSERT INTO comments ({}, author_id, display_name, body) VALUES ($1, $2, $3, $4)",
        target.column(),
    );
    sqlx::query(&sql)
        .bind(target.id())
        .bind(author_id)
        .bind(display_name)
        .bind(body)
        .execute(db)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                Error::NotFound(target.name())
            } else {
                Error::Store(e)
            }
        })?;
    list(db, target).await
}

/// The thread for one target, oldest first. Equal timestamps fall back to
/// insertion order via the id column.
pub async fn list(
    db: &Pool<Postgres>,
    target: CommentTarget,
) -> Result<Vec<CommentResponse>, Error> {
    let sql = format!(
        "SELECT id, leader_id, agenda_id, author_id, display_name, body, created_at
         FROM comments WHERE {} = $1 ORDER BY created_at, id",
        target.column(),
    );
    let rows: Vec<CommentRow> = sqlx::query_as(&sql).bind(target.id()).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_comment_targets_exactly_one_parent() {
        assert_eq!(
            CommentTarget::from_ids(Some(3), None).unwrap(),
            CommentTarget::Leader(3)
        );
        assert_eq!(
            CommentTarget::from_ids(None, Some(8)).unwrap(),
            CommentTarget::Agenda(8)
        );
        assert!(matches!(
            CommentTarget::from_ids(Some(3), Some(8)),
            Err(Error::InvalidCommentTarget)
        ));
        assert!(matches!(
            CommentTarget::from_ids(None, None),
            Err(Error::InvalidCommentTarget)
        ));
    }

    #[test]
    fn body_must_be_between_one_and_a_thousand_characters() {
        assert!(validate_body("").is_err());
        assert!(validate_body("x").is_ok());
        assert!(validate_body(&"x".repeat(MAX_BODY_CHARS)).is_ok());
        assert!(validate_body(&"x".repeat(MAX_BODY_CHARS + 1)).is_err());
    }

    #[test]
    fn body_length_counts_characters_not_bytes() {
        // 1000 three-byte characters is still within the limit.
        assert!(validate_body(&"표".repeat(MAX_BODY_CHARS)).is_ok());
        assert!(validate_body(&"표".repeat(MAX_BODY_CHARS + 1)).is_err());
    }
}
