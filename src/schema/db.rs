use serde::Serialize;
use sqlx::FromRow;

/// One leader row joined with its aggregated vote counts.
#[derive(Serialize, Debug, FromRow)]
pub struct LeaderRow {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub manifesto: Option<String>,
    pub photo_url: Option<String>,
    pub affiliation: Option<String>,
    pub region: Option<String>,
    pub verified: bool,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub upvotes: i64,
    pub downvotes: i64,
}

/// One agenda row joined with its aggregated vote counts.
#[derive(Serialize, Debug, FromRow)]
pub struct AgendaRow {
    pub id: i32,
    pub leader_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Serialize, Debug, FromRow)]
pub struct CommentRow {
    pub id: i32,
    pub leader_id: Option<i32>,
    pub agenda_id: Option<i32>,
    pub author_id: String,
    pub display_name: Option<String>,
    pub body: String,
    pub created_at: chrono::NaiveDateTime,
}

/// The two counts a vote-tally aggregation query produces.
#[derive(Debug, FromRow)]
pub struct TallyRow {
    pub upvotes: i64,
    pub downvotes: i64,
}
