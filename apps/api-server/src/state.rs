//! Application state - shared across all handlers.

use std::sync::Arc;

use quillpress_core::ports::{
    ActivityLog, AdminRepository, AuthorRepository, CategoryRepository, MediaRepository,
    MediaStorage, PostRepository, RateLimiter, SystemClock, TagRepository, TokenService,
};
use quillpress_core::services::{AccountService, PostService, PostServicePorts, TaxonomyService};
use quillpress_infra::database::DatabaseConnections;
use quillpress_infra::{
    Argon2PasswordService, InMemoryActivityLog, InMemoryAdminRepository,
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryMediaRepository,
    InMemoryMediaStorage, InMemoryPostRepository, InMemoryRateLimiter, InMemoryTagRepository,
    JwtTokenService, LocalMediaStorage, RateLimitConfig,
};

#[cfg(feature = "postgres")]
use quillpress_infra::database::{
    PostgresActivityLog, PostgresAdminRepository, PostgresAuthorRepository,
    PostgresCategoryRepository, PostgresMediaRepository, PostgresPostRepository,
    PostgresTagRepository,
};

use crate::config::{AppConfig, MediaConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub taxonomy: Arc<TaxonomyService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<dyn TokenService>,
    pub login_limiter: Arc<dyn RateLimiter>,
    pub db: Option<Arc<DatabaseConnections>>,
}

/// Every table the services read and write.
struct Repositories {
    authors: Arc<dyn AuthorRepository>,
    admins: Arc<dyn AdminRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    posts: Arc<dyn PostRepository>,
    media: Arc<dyn MediaRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            authors: Arc::new(InMemoryAuthorRepository::new()),
            admins: Arc::new(InMemoryAdminRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            tags: Arc::new(InMemoryTagRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            media: Arc::new(InMemoryMediaRepository::new()),
            activity: Arc::new(InMemoryActivityLog::new()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            authors: Arc::new(PostgresAuthorRepository::new(db.main.clone())),
            admins: Arc::new(PostgresAdminRepository::new(db.main.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.main.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            media: Arc::new(PostgresMediaRepository::new(db.main.clone())),
            activity: Arc::new(PostgresActivityLog::new(db.main.clone())),
        }
    }
}

fn media_storage(config: &MediaConfig) -> Arc<dyn MediaStorage> {
    match &config.root {
        Some(root) => {
            tracing::info!(root = %root.display(), "Storing media on the local filesystem");
            Arc::new(LocalMediaStorage::new(root.clone(), config.base_url.clone()))
        }
        None => {
            tracing::warn!("MEDIA_ROOT not set. Uploaded media is kept in memory.");
            Arc::new(InMemoryMediaStorage::new(config.base_url.clone()))
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (Some(Arc::new(connections)), repos)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, Repositories::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Repositories::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, repos) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            (None, Repositories::in_memory())
        };

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let state = Self::assemble(
            repos,
            media_storage(&config.media),
            tokens,
            config.login_rate_limit.clone(),
            db,
        );

        if let Some(admin) = &config.bootstrap_admin {
            match state
                .accounts
                .ensure_administrator(&admin.name, &admin.email, &admin.password)
                .await
            {
                Ok(true) => tracing::info!("Bootstrap administrator created"),
                Ok(false) => tracing::debug!("Bootstrap administrator already exists"),
                Err(e) => tracing::error!(error = %e, "Failed to create bootstrap administrator"),
            }
        }

        tracing::info!("Application state initialized");
        state
    }

    /// In-memory state with the given token service, for handler tests.
    #[cfg(test)]
    pub fn in_memory(tokens: Arc<dyn TokenService>, login_rate_limit: RateLimitConfig) -> Self {
        Self::assemble(
            Repositories::in_memory(),
            Arc::new(InMemoryMediaStorage::default()),
            tokens,
            login_rate_limit,
            None,
        )
    }

    fn assemble(
        repos: Repositories,
        storage: Arc<dyn MediaStorage>,
        tokens: Arc<dyn TokenService>,
        login_rate_limit: RateLimitConfig,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let posts = PostService::new(PostServicePorts {
            posts: repos.posts,
            categories: repos.categories.clone(),
            tags: repos.tags.clone(),
            authors: repos.authors.clone(),
            admins: repos.admins.clone(),
            media: repos.media,
            storage,
            activity: repos.activity,
            clock: Arc::new(SystemClock),
        });
        let taxonomy = TaxonomyService::new(repos.categories, repos.tags);
        let accounts = AccountService::new(
            repos.authors,
            repos.admins,
            Arc::new(Argon2PasswordService::new()),
            tokens.clone(),
        );

        Self {
            posts: Arc::new(posts),
            taxonomy: Arc::new(taxonomy),
            accounts: Arc::new(accounts),
            tokens,
            login_limiter: Arc::new(InMemoryRateLimiter::new(login_rate_limit)),
            db,
        }
    }
}
