//! Forum domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reaction a user can hold on a post. Stored as lowercase text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(ReactionKind::Like),
            "dislike" => Some(ReactionKind::Dislike),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub category: Option<String>,
    pub language: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub views: i64,
    pub has_voice_note: bool,
    pub is_verified: bool,
    pub whatsapp_group_joined: bool,
    pub tags: Vec<String>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub content: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Report {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a post.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub has_voice_note: bool,
}

/// Optional list filters; `query` is a substring match over title, content and tags.
#[derive(Clone, Debug, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub language: Option<String>,
    pub query: Option<String>,
}

/// Counter state and the user's reaction after a reconciliation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ReactionOutcome {
    pub likes: i64,
    pub dislikes: i64,
    pub reaction: Option<ReactionKind>,
}
