mod posts;
mod profiles;
mod queries;
mod relationships;

pub use posts::{PostDraft, PostEdit, PostService};
pub use profiles::{initials_avatar_url, ProfileService};
pub use queries::{QueryService, DEFAULT_LATEST_LIMIT};
pub use relationships::RelationshipService;
