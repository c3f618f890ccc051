//! Forum persistence behind the `ForumStore` seam.
//!
//! `PgForumStore` runs every reaction and bookmark change as one transaction,
//! locking the post row before touching the per-user record. `MemoryForumStore`
//! holds the whole forum state behind a single mutex and backs tests plus the
//! datastore-unreachable fallback. The implementation is chosen once at
//! startup.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::forum::models::{
    Comment, NewPost, Post, PostFilter, ReactionKind, ReactionOutcome, Report,
};
use crate::forum::reaction::reconcile;

#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError>;
    async fn create_post(&self, author_id: &str, new: NewPost) -> Result<Post, AppError>;
    /// Fetch one post and count the view in the same statement.
    async fn fetch_post(&self, post_id: Uuid) -> Result<Post, AppError>;
    async fn apply_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
        requested: ReactionKind,
    ) -> Result<ReactionOutcome, AppError>;
    /// Toggle bookmark membership; returns the new state.
    async fn toggle_bookmark(&self, post_id: Uuid, user_id: &str) -> Result<bool, AppError>;
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError>;
    async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, AppError>;
    /// Author-only delete.
    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: &str,
    ) -> Result<(), AppError>;
    async fn like_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, AppError>;
    async fn report_post(
        &self,
        post_id: Uuid,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<Report, AppError>;
    async fn join_whatsapp(&self, post_id: Uuid) -> Result<Post, AppError>;
}

pub struct PgForumStore {
    pool: PgPool,
}

impl PgForumStore {
    pub fn new(pool: PgPool) -> Self {
        PgForumStore { pool }
    }
}

#[async_trait]
impl ForumStore for PgForumStore {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let mut sql = String::from("SELECT * FROM forum_posts");
        let mut conds: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();
        if let Some(category) = &filter.category {
            params.push(category.clone());
            conds.push(format!("category = ${}", params.len()));
        }
        if let Some(language) = &filter.language {
            params.push(language.clone());
            conds.push(format!("language = ${}", params.len()));
        }
        if let Some(query) = &filter.query {
            params.push(format!("%{}%", query));
            let n = params.len();
            conds.push(format!(
                "(title ILIKE ${n} OR content ILIKE ${n} \
                 OR EXISTS (SELECT 1 FROM unnest(tags) tag WHERE tag ILIKE ${n}))"
            ));
        }
        if !conds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conds.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");
        tracing::debug!(sql = %sql, "list posts");
        let mut q = sqlx::query_as::<_, Post>(&sql);
        for p in &params {
            q = q.bind(p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn create_post(&self, author_id: &str, new: NewPost) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO forum_posts \
             (title, content, author_id, category, language, tags, image_urls, has_voice_note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(author_id)
        .bind(&new.category)
        .bind(&new.language)
        .bind(&new.tags)
        .bind(&new.image_urls)
        .bind(new.has_voice_note)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    async fn fetch_post(&self, post_id: Uuid) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "UPDATE forum_posts SET views = views + 1 WHERE id = $1 RETURNING *",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        post.ok_or_else(|| AppError::NotFound("post".into()))
    }

    async fn apply_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
        requested: ReactionKind,
    ) -> Result<ReactionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        // Lock the post row first so concurrent calls for the same post
        // serialize before the reaction row is examined.
        let locked: Option<(i64, i64)> =
            sqlx::query_as("SELECT likes, dislikes FROM forum_posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("post".into()));
        }
        let current: Option<String> =
            sqlx::query_scalar("SELECT action FROM post_reactions WHERE post_id = $1 AND user_id = $2")
                .bind(post_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.as_deref().and_then(ReactionKind::parse);
        let change = reconcile(current, requested);
        match change.next {
            Some(kind) if current.is_none() => {
                sqlx::query(
                    "INSERT INTO post_reactions (post_id, user_id, action) VALUES ($1, $2, $3) \
                     ON CONFLICT (post_id, user_id) DO UPDATE SET action = EXCLUDED.action",
                )
                .bind(post_id)
                .bind(user_id)
                .bind(kind.as_str())
                .execute(&mut *tx)
                .await?;
            }
            Some(kind) => {
                sqlx::query(
                    "UPDATE post_reactions SET action = $3 WHERE post_id = $1 AND user_id = $2",
                )
                .bind(post_id)
                .bind(user_id)
                .bind(kind.as_str())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM post_reactions WHERE post_id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        let (likes, dislikes): (i64, i64) = sqlx::query_as(
            "UPDATE forum_posts \
             SET likes = GREATEST(likes + $2, 0), dislikes = GREATEST(dislikes + $3, 0), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING likes, dislikes",
        )
        .bind(post_id)
        .bind(change.like_delta)
        .bind(change.dislike_delta)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(ReactionOutcome {
            likes,
            dislikes,
            reaction: change.next,
        })
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM forum_posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("post".into()));
        }
        let removed = sqlx::query("DELETE FROM post_bookmarks WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let bookmarked = if removed == 0 {
            sqlx::query(
                "INSERT INTO post_bookmarks (post_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT (post_id, user_id) DO NOTHING",
            )
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        } else {
            false
        };
        tx.commit().await?;
        Ok(bookmarked)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT * FROM forum_comments WHERE post_id = $1 ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM forum_posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("post".into()));
        }
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO forum_comments (post_id, author_id, content) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: &str,
    ) -> Result<(), AppError> {
        let author: Option<String> =
            sqlx::query_scalar("SELECT author_id FROM forum_comments WHERE id = $1 AND post_id = $2")
                .bind(comment_id)
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;
        match author {
            None => Err(AppError::NotFound("comment".into())),
            Some(author) if author != user_id => {
                Err(AppError::Forbidden("only the author can delete a comment".into()))
            }
            Some(_) => {
                sqlx::query("DELETE FROM forum_comments WHERE id = $1")
                    .bind(comment_id)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
        }
    }

    async fn like_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE forum_comments SET likes = likes + 1 \
             WHERE id = $1 AND post_id = $2 RETURNING *",
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        comment.ok_or_else(|| AppError::NotFound("comment".into()))
    }

    async fn report_post(
        &self,
        post_id: Uuid,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<Report, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM forum_posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("post".into()));
        }
        let report = sqlx::query_as::<_, Report>(
            "INSERT INTO post_reports (post_id, user_id, reason) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(&reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    async fn join_whatsapp(&self, post_id: Uuid) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "UPDATE forum_posts SET whatsapp_group_joined = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        post.ok_or_else(|| AppError::NotFound("post".into()))
    }
}

#[derive(Default)]
struct MemoryState {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    reactions: HashMap<(Uuid, String), ReactionKind>,
    bookmarks: HashSet<(Uuid, String)>,
    reports: Vec<Report>,
}

/// In-memory forum state behind one mutex, so every operation is a single
/// critical section.
#[derive(Default)]
pub struct MemoryForumStore {
    state: Mutex<MemoryState>,
}

impl MemoryForumStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumStore for MemoryForumStore {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, AppError> {
        let state = self.state.lock().await;
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| p.category.as_deref() == Some(c.as_str()))
            })
            .filter(|p| {
                filter
                    .language
                    .as_ref()
                    .map_or(true, |l| p.language.as_deref() == Some(l.as_str()))
            })
            .filter(|p| {
                filter.query.as_ref().map_or(true, |q| {
                    let q = q.to_lowercase();
                    p.title.to_lowercase().contains(&q)
                        || p.content.to_lowercase().contains(&q)
                        || p.tags.iter().any(|t| t.to_lowercase().contains(&q))
                })
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_post(&self, author_id: &str, new: NewPost) -> Result<Post, AppError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: new.title,
            content: new.content,
            author_id: author_id.to_string(),
            category: new.category,
            language: new.language,
            likes: 0,
            dislikes: 0,
            views: 0,
            has_voice_note: new.has_voice_note,
            is_verified: false,
            whatsapp_group_joined: false,
            tags: new.tags,
            image_urls: new.image_urls,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.posts.push(post.clone());
        Ok(post)
    }

    async fn fetch_post(&self, post_id: Uuid) -> Result<Post, AppError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::NotFound("post".into()))?;
        post.views += 1;
        Ok(post.clone())
    }

    async fn apply_reaction(
        &self,
        post_id: Uuid,
        user_id: &str,
        requested: ReactionKind,
    ) -> Result<ReactionOutcome, AppError> {
        let mut state = self.state.lock().await;
        let MemoryState {
            posts, reactions, ..
        } = &mut *state;
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::NotFound("post".into()))?;
        let key = (post_id, user_id.to_string());
        let change = reconcile(reactions.get(&key).copied(), requested);
        match change.next {
            Some(kind) => {
                reactions.insert(key, kind);
            }
            None => {
                reactions.remove(&key);
            }
        }
        post.likes = (post.likes + change.like_delta).max(0);
        post.dislikes = (post.dislikes + change.dislike_delta).max(0);
        post.updated_at = Utc::now();
        Ok(ReactionOutcome {
            likes: post.likes,
            dislikes: post.dislikes,
            reaction: change.next,
        })
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: &str) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound("post".into()));
        }
        let key = (post_id, user_id.to_string());
        if state.bookmarks.remove(&key) {
            Ok(false)
        } else {
            state.bookmarks.insert(key);
            Ok(true)
        }
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let state = self.state.lock().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let mut state = self.state.lock().await;
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound("post".into()));
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id: author_id.to_string(),
            content: content.to_string(),
            likes: 0,
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let idx = state
            .comments
            .iter()
            .position(|c| c.id == comment_id && c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound("comment".into()))?;
        if state.comments[idx].author_id != user_id {
            return Err(AppError::Forbidden(
                "only the author can delete a comment".into(),
            ));
        }
        state.comments.remove(idx);
        Ok(())
    }

    async fn like_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, AppError> {
        let mut state = self.state.lock().await;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound("comment".into()))?;
        comment.likes += 1;
        Ok(comment.clone())
    }

    async fn report_post(
        &self,
        post_id: Uuid,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<Report, AppError> {
        let mut state = self.state.lock().await;
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound("post".into()));
        }
        let report = Report {
            id: Uuid::new_v4(),
            post_id,
            user_id: user_id.to_string(),
            reason,
            created_at: Utc::now(),
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn join_whatsapp(&self, post_id: Uuid) -> Result<Post, AppError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::NotFound("post".into()))?;
        post.whatsapp_group_joined = true;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }
}
