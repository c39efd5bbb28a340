//! Specialized collection types

pub use slotmap::{Key, SlotMap};

/// Arena holding node values addressed by generation checked keys.
///
/// Render trees never own their values, they only store keys into an
/// arena like this one. Removing a key from a tree leaves the value in the
/// arena until it is removed here explicitly.
pub type NodeArena<K, T> = SlotMap<K, T>;

slotmap::new_key_type! {
    /// Handle to an [`AnimationNodeClass`](crate::scene::AnimationNodeClass) or
    /// [`AnimationNode`](crate::scene::AnimationNode)
    pub struct AnimationNodeKey;

    /// Handle to an [`EntityNodeClass`](crate::scene::EntityNodeClass) or
    /// [`EntityNode`](crate::scene::EntityNode)
    pub struct EntityNodeKey;

    /// Handle to a [`SceneNodeClass`](crate::scene::SceneNodeClass)
    pub struct SceneNodeKey;

    /// Handle to an [`Entity`](crate::scene::Entity) placed in a scene
    pub struct EntityKey;
}

/// Generate a new random identifier for a class or instance object
pub fn random_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
