//! Community forum: posts, comments, reactions, bookmarks, reports.

pub mod models;
pub mod reaction;
pub mod store;

pub use models::{Comment, NewPost, Post, PostFilter, ReactionKind, ReactionOutcome, Report};
pub use store::{ForumStore, MemoryForumStore, PgForumStore};
