//! Services - the operations exposed to the presentation layer.

mod accounts;
mod posts;
mod taxonomy;

pub use accounts::{Account, AccountError, AccountService, Registration, Session};
pub use posts::{
    AdminPostListing, AdminPostQuery, AuthorPostQuery, PostDraft, PostService, PostServicePorts,
    PostView, UploadedFile, parse_status_filter,
};
pub use taxonomy::TaxonomyService;
