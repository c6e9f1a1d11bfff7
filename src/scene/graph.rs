use glam::Vec3;

use crate::behavior::{Behavior, BehaviorId};
use crate::entity::{Entity, EntityId};
use crate::error::SceneError;

#[derive(Debug)]
struct Node {
    generation: u32,
    entity: Option<Entity>,
}

/// Generational arena of entities plus their iteration order.
///
/// Entities are visited in insertion order. Parent and child links are
/// stored on the entities themselves and only ever edited through
/// [`SceneGraph::link`] and [`SceneGraph::unlink`], which keep both sides in
/// agreement.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    free: Vec<u32>,
    order: Vec<EntityId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in iteration order.
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order
            .iter()
            .filter_map(|&id| Some((id, self.get(id)?)))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let node = self.nodes.get(id.index() as usize)?;
        if node.generation != id.generation() {
            return None;
        }
        node.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let node = self.nodes.get_mut(id.index() as usize)?;
        if node.generation != id.generation() {
            return None;
        }
        node.entity.as_mut()
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.iter()
            .find(|(_, entity)| entity.name() == name)
            .map(|(id, _)| id)
    }

    pub(crate) fn insert(&mut self, mut entity: Entity) -> EntityId {
        entity.parent = None;
        entity.children.clear();
        let id = match self.free.pop() {
            Some(index) => {
                let node = &mut self.nodes[index as usize];
                node.entity = Some(entity);
                EntityId::new(index, node.generation)
            }
            None => {
                self.nodes.push(Node {
                    generation: 0,
                    entity: Some(entity),
                });
                EntityId::new(self.nodes.len() as u32 - 1, 0)
            }
        };
        self.order.push(id);
        id
    }

    /// Takes a single entity out, detaching it from its parent. Children
    /// are left in place with no parent.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.get(id)?;
        self.unlink(id);
        let children = self.children(id).to_vec();
        for child in children {
            if let Some(child) = self.get_mut(child) {
                child.parent = None;
            }
        }

        let node = &mut self.nodes[id.index() as usize];
        let mut entity = node.entity.take()?;
        node.generation = node.generation.wrapping_add(1);
        self.free.push(id.index());
        self.order.retain(|&other| other != id);
        entity.children.clear();
        Some(entity)
    }

    /// Empties the graph. Slots keep their generation so ids handed out
    /// before the clear never resolve again.
    pub(crate) fn clear(&mut self) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.entity.take().is_some() {
                node.generation = node.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.order.clear();
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.get(id)?.parent()
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.get(id).map(Entity::children).unwrap_or(&[])
    }

    /// Every entity below `id`, parents before their children.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: EntityId, of: EntityId) -> bool {
        let mut current = self.parent(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Makes `child` a child of `parent`, moving it away from any previous
    /// parent. World positions are left untouched.
    pub fn link(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        if !self.contains(child) {
            return Err(SceneError::UnknownEntity(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::ParentCycle { parent, child });
        }

        self.unlink(child);
        if let Some(entity) = self.get_mut(parent) {
            entity.children.push(child);
        }
        if let Some(entity) = self.get_mut(child) {
            entity.parent = Some(parent);
        }
        Ok(())
    }

    /// Detaches `child` from its parent, if it has one.
    pub fn unlink(&mut self, child: EntityId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(entity) = self.get_mut(parent) {
            entity.children.retain(|&id| id != child);
        }
        if let Some(entity) = self.get_mut(child) {
            entity.parent = None;
        }
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        Some(self.get(id)?.transform().position())
    }

    /// Moves `id` to `position` and shifts every descendant by the same
    /// offset, so positions relative to the parent are preserved.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<(), SceneError> {
        let old = self.position(id).ok_or(SceneError::UnknownEntity(id))?;
        let offset = position - old;
        for descendant in self.descendants(id) {
            if let Some(entity) = self.get_mut(descendant) {
                let moved = entity.transform().position() + offset;
                entity.transform_mut().set_translation(moved);
            }
        }
        if let Some(entity) = self.get_mut(id) {
            entity.transform_mut().set_translation(position);
        }
        Ok(())
    }

    /// Position relative to the parent. Only translation is taken into
    /// account; a rotated or scaled parent does not affect the result.
    pub fn local_position(&self, id: EntityId) -> Option<Vec3> {
        let world = self.position(id)?;
        match self.parent(id).and_then(|parent| self.position(parent)) {
            Some(origin) => Some(world - origin),
            None => Some(world),
        }
    }

    pub fn set_local_position(&mut self, id: EntityId, local: Vec3) -> Result<(), SceneError> {
        let origin = self
            .parent(id)
            .and_then(|parent| self.position(parent))
            .unwrap_or(Vec3::ZERO);
        self.set_position(id, origin + local)
    }

    pub fn behavior(&self, id: BehaviorId) -> Option<&(dyn Behavior + 'static)> {
        self.get(id.entity)?.behavior(id.index)
    }

    pub fn behavior_mut(&mut self, id: BehaviorId) -> Option<&mut (dyn Behavior + 'static)> {
        self.get_mut(id.entity)?.behavior_mut(id.index)
    }
}
