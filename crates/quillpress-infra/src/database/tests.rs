use chrono::Utc;
use sea_orm::{
    ConnAcquireErr, DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr,
};
use uuid::Uuid;

use quillpress_core::domain::{Post, PostStatus, Visibility};
use quillpress_core::error::RepoError;
use quillpress_core::ports::{AuthorRepository, BaseRepository, PostRepository, TagRepository};

use crate::database::entity::{author, post};
use crate::database::postgres_base::db_err;
use crate::database::postgres_repo::{
    PostgresAuthorRepository, PostgresPostRepository, PostgresTagRepository,
};

fn post_model(id: Uuid, status: post::Status) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        user_id: Uuid::new_v4(),
        category_id: None,
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        content: "Content".to_owned(),
        writer: "Ada".to_owned(),
        visibility: post::Audience::Unlisted,
        status,
        published_at: Some(now.into()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_maps_stored_enums() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, post::Status::Published)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.visibility, Visibility::Unlisted);
}

#[tokio::test]
async fn test_update_of_vanished_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);
    let post: Post = post_model(Uuid::new_v4(), post::Status::Pending).into();

    let result = repo.update(post).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_delete_without_rows_affected_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_feed_returns_rows_in_query_order() {
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(first, post::Status::Published),
            post_model(second, post::Status::Published),
        ]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let feed = repo.feed().await.unwrap();

    assert_eq!(feed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first, second]);
}

#[tokio::test]
async fn test_find_author_by_email() {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![author::Model {
            id,
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();
    let repo = PostgresAuthorRepository::new(db);

    let author = repo.find_by_email("ada@example.com").await.unwrap().unwrap();

    assert_eq!(author.id, id);
    assert_eq!(author.name, "Ada");
}

#[tokio::test]
async fn test_find_many_tags_with_no_ids_skips_query() {
    // No mocked results: any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresTagRepository::new(db);

    let tags = repo.find_many(&[]).await.unwrap();

    assert!(tags.is_empty());
}

#[test]
fn test_connection_failures_map_to_connection_errors() {
    let dropped = DbErr::Conn(RuntimeErr::Internal("connection reset".to_owned()));
    let starved = DbErr::ConnectionAcquire(ConnAcquireErr::Timeout);

    assert!(matches!(
        db_err(dropped),
        RepoError::Connection(msg) if msg.contains("connection reset")
    ));
    assert!(matches!(db_err(starved), RepoError::Connection(_)));
}

#[tokio::test]
async fn test_query_error_surfaces_as_connection_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Conn(RuntimeErr::Internal("pool closed".to_owned()))])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result: Result<Option<Post>, RepoError> = repo.find_by_id(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::Connection(_))));
}
