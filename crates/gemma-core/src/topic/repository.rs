//! Topic repository trait.
//!
//! Defines the interface for persisting the topic collection.

use super::model::ChatTopic;

/// An abstract store for the ordered topic collection.
///
/// The whole collection is read once at startup and rewritten in full after
/// every mutation. Neither operation reports failure to the caller:
/// implementations log storage problems and carry on, so a broken disk only
/// costs durability, never the running session.
///
/// # Implementation Notes
///
/// - `load` returns an empty vector when the backing document is missing,
///   unreadable or fails to parse. Seeding a default topic is the caller's job.
/// - `save` overwrites the backing document with the complete collection.
/// - Single writer, single process. No locking is expected.
pub trait TopicRepository: Send + Sync {
    /// Loads every stored topic in their persisted order.
    fn load(&self) -> Vec<ChatTopic>;

    /// Replaces the stored collection with `topics`.
    fn save(&self, topics: &[ChatTopic]);
}
