//! Renderable scene objects and the registry that issues their ids.
//!
//! Objects are generic over the mesh type so this crate stays free of GPU
//! dependencies; the renderer instantiates them with its `Mesh`. Meshes are
//! shared through `Arc` and released when the last object holding one is
//! dropped.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use tracing::debug;

use crate::error::{SceneError, SceneResult};
use crate::transform::TransformComponent;

/// Identity of a [`GameObject`], unique within its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(u32);

impl GameObjectId {
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A renderable entity. Only a [`GameObjectRegistry`] creates them.
pub struct GameObject<M> {
    id: GameObjectId,
    pub mesh: Option<Arc<M>>,
    pub color: Vec3,
    pub transform: TransformComponent,
}

impl<M> GameObject<M> {
    #[inline]
    pub fn id(&self) -> GameObjectId {
        self.id
    }
}

impl<M> fmt::Debug for GameObject<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("has_mesh", &self.mesh.is_some())
            .field("color", &self.color)
            .field("transform", &self.transform)
            .finish()
    }
}

/// Owns scene objects in insertion order and hands out ids from a counter
/// that starts at 0 and is never rewound, so ids are not reused after
/// [`remove`](Self::remove).
pub struct GameObjectRegistry<M> {
    objects: Vec<GameObject<M>>,
    next_id: u32,
}

impl<M> Default for GameObjectRegistry<M> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
        }
    }
}

impl<M> GameObjectRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object with no mesh, black color and identity transform,
    /// and returns it for setup.
    ///
    /// # Errors
    ///
    /// [`SceneError::IdsExhausted`] once `u32::MAX` ids have been issued.
    pub fn spawn(&mut self) -> SceneResult<&mut GameObject<M>> {
        let id = GameObjectId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(SceneError::IdsExhausted)?;
        debug!("Spawned game object {}", id);

        self.objects.push(GameObject {
            id,
            mesh: None,
            color: Vec3::ZERO,
            transform: TransformComponent::default(),
        });
        let last = self.objects.len() - 1;
        Ok(&mut self.objects[last])
    }

    pub fn get(&self, id: GameObjectId) -> Option<&GameObject<M>> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject<M>> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    /// Removes and returns the object. Order of the remaining objects is kept.
    pub fn remove(&mut self, id: GameObjectId) -> Option<GameObject<M>> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        debug!("Removed game object {}", id);
        Some(self.objects.remove(index))
    }

    /// Objects in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, GameObject<M>> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, GameObject<M>> {
        self.objects.iter_mut()
    }

    pub fn as_slice(&self) -> &[GameObject<M>] {
        &self.objects
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<'a, M> IntoIterator for &'a GameObjectRegistry<M> {
    type Item = &'a GameObject<M>;
    type IntoIter = std::slice::Iter<'a, GameObject<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
