// Content Store
// Flat-file posts, the in-memory project registry, skills and the résumé.

pub mod handlers;
pub mod models;
pub mod projects;
pub mod resume;
pub mod skills;
pub mod slug;
pub mod store;
