//! Vote aggregation: per-target tallies, the toggling cast operation, and
//! leaderboard ranking.
//!
//! A voter owns at most one slot per target, enforced by the store's
//! `UNIQUE (target, voter)` constraint. Casting is a single
//! `INSERT ... ON CONFLICT DO UPDATE` statement, so two concurrent casts
//! from the same voter serialize on the row inside the store and no
//! application-level locking exists. A retracted vote keeps its row with
//! `vote_type = 0`; tallies count only `1` and `-1`.

use sqlx::{Pool, Postgres};

use crate::api::db::is_fk_violation;
use crate::error::Error;
use crate::schema::api::{AgendaResponse, LeaderResponse, Tally};
use crate::schema::db::{AgendaRow, LeaderRow, TallyRow};

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_i16(self) -> i16 {
        match self {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }
}

impl TryFrom<i16> for VoteType {
    type Error = Error;

    fn try_from(raw: i16) -> Result<Self, Error> {
        match raw {
            1 => Ok(VoteType::Up),
            -1 => Ok(VoteType::Down),
            other => Err(Error::InvalidVoteType(other)),
        }
    }
}

/// Which target family a vote or tally refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Leader,
    Agenda,
}

impl TargetKind {
    fn vote_table(self) -> &'static str {
        match self {
            TargetKind::Leader => "leader_votes",
            TargetKind::Agenda => "agenda_votes",
        }
    }

    fn vote_fk(self) -> &'static str {
        match self {
            TargetKind::Leader => "leader_id",
            TargetKind::Agenda => "agenda_id",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Leader => "leader",
            TargetKind::Agenda => "agenda",
        }
    }
}

/// Straight count of up and down rows for one target. A target nobody has
/// voted on (or that does not exist) yields the zero tally.
pub async fn tally(db: &Pool<Postgres>, kind: TargetKind, target_id: i32) -> Result<Tally, Error> {
    let sql = format!(
        "SELECT COUNT(*) FILTER (WHERE vote_type = 1) AS upvotes,
                COUNT(*) FILTER (WHERE vote_type = -1) AS downvotes
         FROM {} WHERE {} = $1",
        kind.vote_table(),
        kind.vote_fk(),
    );
    let row: TallyRow = sqlx::query_as(&sql).bind(target_id).fetch_one(db).await?;
    Ok(Tally::new(row.upvotes, row.downvotes))
}

/// Casts a vote with toggle semantics and returns the recomputed tally.
///
/// The compare-and-set lives entirely in the upsert: no existing slot
/// inserts the requested type, a slot holding the same type retracts to
/// zero, and a slot holding anything else takes the requested type. A vote
/// on an absent target trips the foreign key and surfaces as not-found.
pub async fn cast(
    db: &Pool<Postgres>,
    kind: TargetKind,
    target_id: i32,
    voter_id: &str,
    requested: VoteType,
) -> Result<Tally, Error> {
    let sql = format!(
        "INSERT INTO {table} ({fk}, voter_id, vote_type)
         VALUES ($1, $2, $3)
         ON CONFLICT ({fk}, voter_id) DO UPDATE
         SET vote_type = CASE
                 WHEN {table}.vote_type = EXCLUDED.vote_type THEN 0
                 ELSE EXCLUDED.vote_type
             END,
             updated_at = now()",
        table = kind.vote_table(),
        fk = kind.vote_fk(),
    );
    sqlx::query(&sql)
        .bind(target_id)
        .bind(voter_id)
        .bind(requested.as_i16())
        .execute(db)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                Error::NotFound(kind.name())
            } else {
                Error::Store(e)
            }
        })?;
    tally(db, kind, target_id).await
}

const LEADER_WITH_TALLY: &str = "SELECT l.id, l.name, l.bio, l.manifesto, l.photo_url,
        l.affiliation, l.region, l.verified, l.created_at, l.updated_at,
        COUNT(v.id) FILTER (WHERE v.vote_type = 1) AS upvotes,
        COUNT(v.id) FILTER (WHERE v.vote_type = -1) AS downvotes
    FROM leaders l
    LEFT JOIN leader_votes v ON v.leader_id = l.id";

const AGENDA_WITH_TALLY: &str = "SELECT a.id, a.leader_id, a.title, a.description,
        a.category, a.created_at, a.updated_at,
        COUNT(v.id) FILTER (WHERE v.vote_type = 1) AS upvotes,
        COUNT(v.id) FILTER (WHERE v.vote_type = -1) AS downvotes
    FROM agendas a
    LEFT JOIN agenda_votes v ON v.agenda_id = a.id";

pub async fn leaders_with_tally(db: &Pool<Postgres>) -> Result<Vec<LeaderResponse>, Error> {
    let sql = format!("{LEADER_WITH_TALLY} GROUP BY l.id ORDER BY l.created_at, l.id");
    let rows: Vec<LeaderRow> = sqlx::query_as(&sql).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn leader_with_tally(
    db: &Pool<Postgres>,
    id: i32,
) -> Result<Option<LeaderResponse>, Error> {
    let sql = format!("{LEADER_WITH_TALLY} WHERE l.id = $1 GROUP BY l.id");
    let row: Option<LeaderRow> = sqlx::query_as(&sql).bind(id).fetch_optional(db).await?;
    Ok(row.map(Into::into))
}

/// Case-insensitive substring match on name, region, or affiliation.
pub async fn search_leaders(
    db: &Pool<Postgres>,
    query: &str,
) -> Result<Vec<LeaderResponse>, Error> {
    let sql = format!(
        "{LEADER_WITH_TALLY}
         WHERE l.name ILIKE $1 OR l.region ILIKE $1 OR l.affiliation ILIKE $1
         GROUP BY l.id ORDER BY l.created_at, l.id"
    );
    let pattern = format!("%{}%", query);
    let rows: Vec<LeaderRow> = sqlx::query_as(&sql).bind(pattern).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn agendas_with_tally(db: &Pool<Postgres>) -> Result<Vec<AgendaResponse>, Error> {
    let sql = format!("{AGENDA_WITH_TALLY} GROUP BY a.id ORDER BY a.created_at, a.id");
    let rows: Vec<AgendaRow> = sqlx::query_as(&sql).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn agenda_with_tally(
    db: &Pool<Postgres>,
    id: i32,
) -> Result<Option<AgendaResponse>, Error> {
    let sql = format!("{AGENDA_WITH_TALLY} WHERE a.id = $1 GROUP BY a.id");
    let row: Option<AgendaRow> = sqlx::query_as(&sql).bind(id).fetch_optional(db).await?;
    Ok(row.map(Into::into))
}

pub async fn agendas_for_leader(
    db: &Pool<Postgres>,
    leader_id: i32,
) -> Result<Vec<AgendaResponse>, Error> {
    let sql = format!(
        "{AGENDA_WITH_TALLY} WHERE a.leader_id = $1 GROUP BY a.id ORDER BY a.created_at, a.id"
    );
    let rows: Vec<AgendaRow> = sqlx::query_as(&sql).bind(leader_id).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Case-insensitive substring match on title or category.
pub async fn search_agendas(
    db: &Pool<Postgres>,
    query: &str,
) -> Result<Vec<AgendaResponse>, Error> {
    let sql = format!(
        "{AGENDA_WITH_TALLY}
         WHERE a.title ILIKE $1 OR a.category ILIKE $1
         GROUP BY a.id ORDER BY a.created_at, a.id"
    );
    let pattern = format!("%{}%", query);
    let rows: Vec<AgendaRow> = sqlx::query_as(&sql).bind(pattern).fetch_all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Anything that can appear on a leaderboard.
pub trait Ranked {
    fn net(&self) -> i64;
    fn id(&self) -> i32;
}

impl Ranked for LeaderResponse {
    fn net(&self) -> i64 {
        self.votes.net
    }

    fn id(&self) -> i32 {
        self.id
    }
}

impl Ranked for AgendaResponse {
    fn net(&self) -> i64 {
        self.votes.net
    }

    fn id(&self) -> i32 {
        self.id
    }
}

/// Orders by net score descending; equal nets break by ascending target id
/// so repeated runs agree. Keeps at most `limit` entries.
pub fn rank_by_net<T: Ranked>(items: &mut Vec<T>, limit: usize) {
    items.sort_by(|a, b| b.net().cmp(&a.net()).then_with(|| a.id().cmp(&b.id())));
    items.truncate(limit);
}

/// A missing or non-positive limit means the default, not an error.
pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(l) if l > 0 => l as usize,
        _ => DEFAULT_LEADERBOARD_LIMIT,
    }
}

/// Top-N snapshot of leaders by net score, recomputed from scratch.
pub async fn rank_leaders(
    db: &Pool<Postgres>,
    limit: Option<i64>,
) -> Result<Vec<LeaderResponse>, Error> {
    let mut leaders = leaders_with_tally(db).await?;
    rank_by_net(&mut leaders, effective_limit(limit));
    Ok(leaders)
}

/// Top-N snapshot of agendas by net score, recomputed from scratch.
pub async fn rank_agendas(
    db: &Pool<Postgres>,
    limit: Option<i64>,
) -> Result<Vec<AgendaResponse>, Error> {
    let mut agendas = agendas_with_tally(db).await?;
    rank_by_net(&mut agendas, effective_limit(limit));
    Ok(agendas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(id: i32, upvotes: i64, downvotes: i64) -> LeaderResponse {
        LeaderResponse {
            id,
            name: format!("Leader {id}"),
            bio: None,
            manifesto: None,
            photo_url: None,
            affiliation: None,
            region: None,
            verified: false,
            created_at: chrono::NaiveDateTime::default(),
            votes: Tally::new(upvotes, downvotes),
        }
    }

    #[test]
    fn vote_type_accepts_only_plus_and_minus_one() {
        assert_eq!(VoteType::try_from(1).unwrap(), VoteType::Up);
        assert_eq!(VoteType::try_from(-1).unwrap(), VoteType::Down);
        assert!(matches!(
            VoteType::try_from(0),
            Err(Error::InvalidVoteType(0))
        ));
        assert!(matches!(
            VoteType::try_from(2),
            Err(Error::InvalidVoteType(2))
        ));
    }

    #[test]
    fn ranking_is_net_descending_with_id_tie_break() {
        // Nets 5, 5, 3, -1; the two fives must order by ascending id.
        let mut leaders = vec![
            leader(7, 3, 0),
            leader(4, 6, 1),
            leader(2, 5, 0),
            leader(9, 0, 1),
        ];
        rank_by_net(&mut leaders, 10);
        let ids: Vec<i32> = leaders.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 4, 7, 9]);
    }

    #[test]
    fn ranking_truncates_to_the_limit() {
        let mut leaders = vec![leader(1, 1, 0), leader(2, 2, 0), leader(3, 3, 0)];
        rank_by_net(&mut leaders, 2);
        let ids: Vec<i32> = leaders.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn limit_larger_than_the_field_returns_everything() {
        let mut leaders = vec![leader(1, 1, 0), leader(2, 2, 0)];
        rank_by_net(&mut leaders, 50);
        assert_eq!(leaders.len(), 2);
    }

    #[test]
    fn non_positive_limits_mean_the_default() {
        assert_eq!(effective_limit(None), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(effective_limit(Some(0)), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(effective_limit(Some(-5)), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(effective_limit(Some(25)), 25);
    }
}
