//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use quillpress_core::domain::{
    Activity, Administrator, Author, Category, Media, Page, PageRequest, Post, PostFilter,
    PostStatus, SearchScope, StatusCounts, Tag, TagChanges,
};
use quillpress_core::error::RepoError;
use quillpress_core::ports::{
    ActivityLog, AdminRepository, AuthorRepository, CategoryRepository, MediaRepository,
    PostRepository, TagRepository,
};

use super::entity::activity::{self, Entity as ActivityEntity};
use super::entity::admin::{self, Entity as AdminEntity};
use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::media::{self, Entity as MediaEntity};
use super::entity::post::{self, Audience, Entity as PostEntity, Status};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL administrator repository.
pub type PostgresAdminRepository = PostgresBaseRepository<AdminEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL media repository.
pub type PostgresMediaRepository = PostgresBaseRepository<MediaEntity>;

/// Mask an email address for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding author by email");

        let result = AuthorEntity::find()
            .filter(author::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Administrator>, RepoError> {
        tracing::debug!(admin_email = %mask_email(email), "Finding administrator by email");

        let result = AdminEntity::find()
            .filter(admin::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(category::Column::Name))).eq(name.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn all(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(tag::Column::Name))).eq(name.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

async fn attach_tags<C>(db: &C, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    if tag_ids.is_empty() {
        return Ok(());
    }

    let rows = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(*tag_id),
    });
    PostTagEntity::insert_many(rows)
        .exec_without_returning(db)
        .await
        .map_err(db_err)?;
    Ok(())
}

async fn detach_tags<C>(db: &C, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    if tag_ids.is_empty() {
        return Ok(());
    }

    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .filter(post_tag::Column::TagId.is_in(tag_ids.iter().copied()))
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(())
}

fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(owner_id) = filter.owner_id {
        condition = condition.add(post::Column::UserId.eq(owner_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(post::Column::Status.eq(Status::from(status)));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(needle) = filter.needle() {
        let title = Expr::expr(Func::lower(Expr::col(post::Column::Title)))
            .like(contains_pattern(&needle));
        condition = match filter.search_scope {
            SearchScope::Title => condition.add(title),
            SearchScope::TitleOrContent => {
                let content = Expr::expr(Func::lower(Expr::col(post::Column::Content)))
                    .like(contains_pattern(&needle));
                condition.add(Condition::any().add(title).add(content))
            }
        };
    }

    condition
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        attach_tags(&txn, model.id, tag_ids).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn update_with_tags(&self, post: Post, changes: &TagChanges) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = post::ActiveModel::from(post)
            .update(&txn)
            .await
            .map_err(db_err)?;
        detach_tags(&txn, model.id, &changes.detach).await?;
        attach_tags(&txn, model.id, &changes.attach).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(|row| row.tag_id).collect())
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let paginator = PostEntity::find()
            .filter(filter_condition(filter))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, page.per_page);

        let total = paginator.num_items().await.map_err(db_err)?;
        let items = paginator
            .fetch_page(page.page.saturating_sub(1))
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            items.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }

    async fn feed(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(Status::Published))
            .filter(post::Column::Visibility.eq(Audience::Public))
            .order_by_desc(post::Column::PublishedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self) -> Result<StatusCounts, RepoError> {
        let rows: Vec<(String, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Status)
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .group_by(post::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<PostStatus>() {
                Ok(status) => counts.add(status, count.max(0) as u64),
                Err(e) => tracing::warn!(error = %e, "Skipping unknown post status"),
            }
        }
        Ok(counts)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn top_authors(&self, limit: u64) -> Result<Vec<(Uuid, u64)>, RepoError> {
        let rows: Vec<(Uuid, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::UserId)
            .column_as(Expr::col(post::Column::Id).count(), "post_count")
            .group_by(post::Column::UserId)
            .order_by_desc(Expr::cust("post_count"))
            .order_by_asc(post::Column::UserId)
            .limit(limit)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(author_id, count)| (author_id, count.max(0) as u64))
            .collect())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn daily_counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, u64)>, RepoError> {
        let day = Expr::cust("(created_at AT TIME ZONE 'UTC')::date");
        let rows: Vec<(NaiveDate, i64)> = PostEntity::find()
            .select_only()
            .column_as(day.clone(), "day")
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .filter(post::Column::CreatedAt.gte(since))
            .group_by(day)
            .order_by_asc(Expr::cust("day"))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(day, count)| (day, count.max(0) as u64))
            .collect())
    }
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Media>, RepoError> {
        let result = MediaEntity::find()
            .filter(media::Column::PostId.eq(post_id))
            .order_by_asc(media::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL-backed activity log.
pub struct PostgresActivityLog {
    db: DbConn,
}

impl PostgresActivityLog {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityLog for PostgresActivityLog {
    async fn record(&self, entry: Activity) -> Result<(), RepoError> {
        ActivityEntity::insert(activity::ActiveModel::from(entry))
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn latest(&self, limit: u64) -> Result<Vec<Activity>, RepoError> {
        let result = ActivityEntity::find()
            .order_by_desc(activity::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email_keeps_first_letter_and_domain() {
        assert_eq!(mask_email("grace@example.com"), "g***@example.com");
        assert_eq!(mask_email("g@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
