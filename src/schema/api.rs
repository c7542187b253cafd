use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::schema::db::{AgendaRow, CommentRow, LeaderRow};

/// Derived vote summary for a single target.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct Tally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub net: i64,
}

impl Tally {
    pub fn new(upvotes: i64, downvotes: i64) -> Self {
        Self {
            upvotes,
            downvotes,
            net: upvotes - downvotes,
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    pub vote_type: i16,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub leader_id: Option<i32>,
    pub agenda_id: Option<i32>,
    pub body: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderResponse {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub manifesto: Option<String>,
    pub photo_url: Option<String>,
    pub affiliation: Option<String>,
    pub region: Option<String>,
    pub verified: bool,
    pub created_at: chrono::NaiveDateTime,
    pub votes: Tally,
}

impl From<LeaderRow> for LeaderResponse {
    fn from(row: LeaderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            bio: row.bio,
            manifesto: row.manifesto,
            photo_url: row.photo_url,
            affiliation: row.affiliation,
            region: row.region,
            verified: row.verified,
            created_at: row.created_at,
            votes: Tally::new(row.upvotes, row.downvotes),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaResponse {
    pub id: i32,
    pub leader_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub votes: Tally,
}

impl From<AgendaRow> for AgendaResponse {
    fn from(row: AgendaRow) -> Self {
        Self {
            id: row.id,
            leader_id: row.leader_id,
            title: row.title,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
            votes: Tally::new(row.upvotes, row.downvotes),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderDetailResponse {
    #[serde(flatten)]
    pub leader: LeaderResponse,
    pub agendas: Vec<AgendaResponse>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaDetailResponse {
    #[serde(flatten)]
    pub agenda: AgendaResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub leader_id: Option<i32>,
    pub agenda_id: Option<i32>,
    pub display_name: String,
    pub body: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            leader_id: row.leader_id,
            agenda_id: row.agenda_id,
            // Author identity stays server-side; absent display names render
            // as "Anonymous".
            display_name: row.display_name.unwrap_or_else(|| "Anonymous".to_string()),
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: &'static str,
    pub built_at: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_is_upvotes_minus_downvotes() {
        let tally = Tally::new(3, 5);
        assert_eq!(tally.net, -2);
        assert_eq!(Tally::zero(), Tally::new(0, 0));
    }

    #[test]
    fn absent_display_name_renders_as_anonymous() {
        let row = CommentRow {
            id: 1,
            leader_id: Some(2),
            agenda_id: None,
            author_id: "voter-key".into(),
            display_name: None,
            body: "well said".into(),
            created_at: chrono::NaiveDateTime::default(),
        };
        let rendered = CommentResponse::from(row);
        assert_eq!(rendered.display_name, "Anonymous");
    }
}
