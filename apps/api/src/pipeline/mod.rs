// Content Resolution Pipeline
// Read path (resolver) and write path (creation) over the Content Store.
// All AI calls go through the EnrichmentGateway trait.

pub mod creation;
pub mod handlers;
pub mod resolver;

pub use creation::CreationPipeline;
pub use resolver::ContentResolver;
