use crate::{Error, Transformation};
use glam::{Mat4, Quat, Vec3};

/// A local transform with its cached world matrix.
///
/// The parent link is an index into the owning [`TransformTree`]; the world matrix is only
/// ever written by the tree's propagation pass.
#[derive(Clone, Debug)]
pub struct Transform {
    local: Transformation,
    local_matrix: Mat4,
    world_matrix: Mat4,
    parent: Option<usize>,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self::from_transformation(Transformation::new(position, rotation))
    }

    pub fn from_transformation(local: Transformation) -> Self {
        let local_matrix = local.to_matrix();
        Self {
            local,
            local_matrix,
            world_matrix: local_matrix,
            parent: None,
        }
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn local(&self) -> Transformation {
        self.local
    }

    pub fn local_position(&self) -> Vec3 {
        self.local.position
    }

    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    pub fn world_rotation(&self) -> Quat {
        let (_, rotation, _) = self.world_matrix.to_scale_rotation_translation();
        rotation
    }

    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    fn generate_matrices(&mut self, local: Transformation) {
        self.local = local;
        self.local_matrix = local.to_matrix();
    }

    fn update_world_matrix(&mut self, parent_world: Option<&Mat4>) {
        self.world_matrix = match parent_world {
            Some(parent_world) => *parent_world * self.local_matrix,
            None => self.local_matrix,
        };
    }
}

/// A flat set of transforms linked by parent indices.
///
/// World matrices are recomputed by an explicit top-down pass over a topological order
/// (parents before children). Every mutating call has refreshed all affected world matrices
/// by the time it returns.
#[derive(Clone, Debug, Default)]
pub struct TransformTree {
    nodes: Vec<Transform>,
    order: Vec<usize>,
    rank: Vec<usize>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds an unparented transform and returns its index.
    pub fn push(&mut self, local: Transformation) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Transform::from_transformation(local));
        self.order.push(index);
        self.rank.push(self.order.len() - 1);
        index
    }

    pub fn get(&self, index: usize) -> Result<&Transform, Error> {
        self.nodes
            .get(index)
            .ok_or_else(|| Error::out_of_range("transform", index, self.nodes.len()))
    }

    pub fn as_slice(&self) -> &[Transform] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transform> {
        self.nodes.iter()
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(index))
            .map(|(child, _)| child)
    }

    /// Propagation order: every parent appears before its children.
    pub fn update_order(&self) -> &[usize] {
        &self.order
    }

    pub fn set_parent(&mut self, child: usize, parent: usize) -> Result<(), Error> {
        self.check(child)?;
        self.check(parent)?;
        if child == parent {
            return Err(Error::InvalidHierarchy {
                bone: child,
                message: "a transform cannot be its own parent".to_string(),
            });
        }

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(Error::InvalidHierarchy {
                    bone: child,
                    message: format!("parenting to {parent} would create a cycle"),
                });
            }
            cursor = self.nodes[ancestor].parent;
        }

        self.nodes[child].parent = Some(parent);
        self.rebuild_order();
        self.recompute_subtree(child);
        Ok(())
    }

    pub fn clear_parent(&mut self, child: usize) -> Result<(), Error> {
        self.check(child)?;
        if self.nodes[child].parent.take().is_some() {
            self.rebuild_order();
        }
        self.recompute_subtree(child);
        Ok(())
    }

    pub fn set_local(&mut self, index: usize, local: Transformation) -> Result<(), Error> {
        self.check(index)?;
        self.nodes[index].generate_matrices(local);
        self.recompute_subtree(index);
        Ok(())
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<(), Error> {
        let rotation = self.get(index)?.local_rotation();
        self.set_local(index, Transformation::new(position, rotation))
    }

    pub fn set_rotation(&mut self, index: usize, rotation: Quat) -> Result<(), Error> {
        let position = self.get(index)?.local_position();
        self.set_local(index, Transformation::new(position, rotation))
    }

    /// Replaces every local transform, then runs a single full propagation pass.
    pub fn set_locals(&mut self, locals: &[Transformation]) -> Result<(), Error> {
        if locals.len() != self.nodes.len() {
            return Err(Error::InvalidValue {
                message: format!(
                    "expected {} local transforms, got {}",
                    self.nodes.len(),
                    locals.len()
                ),
            });
        }
        for (node, local) in self.nodes.iter_mut().zip(locals) {
            node.generate_matrices(*local);
        }
        self.update_world_matrices();
        Ok(())
    }

    pub fn update_world_matrices(&mut self) {
        for position in 0..self.order.len() {
            let index = self.order[position];
            self.update_node(index);
        }
    }

    fn check(&self, index: usize) -> Result<(), Error> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::out_of_range("transform", index, self.nodes.len()))
        }
    }

    fn update_node(&mut self, index: usize) {
        let parent_world = self.nodes[index]
            .parent
            .map(|parent| self.nodes[parent].world_matrix);
        self.nodes[index].update_world_matrix(parent_world.as_ref());
    }

    fn recompute_subtree(&mut self, root: usize) {
        let mut dirty = vec![false; self.nodes.len()];
        dirty[root] = true;
        self.update_node(root);

        for position in self.rank[root] + 1..self.order.len() {
            let index = self.order[position];
            let Some(parent) = self.nodes[index].parent else {
                continue;
            };
            if dirty[parent] {
                dirty[index] = true;
                self.update_node(index);
            }
        }
    }

    fn rebuild_order(&mut self) {
        let mut children = vec![Vec::new(); self.nodes.len()];
        let mut roots = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        self.order.clear();
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();
        while let Some(index) = stack.pop() {
            self.order.push(index);
            stack.extend(children[index].iter().rev());
        }

        for (position, &index) in self.order.iter().enumerate() {
            self.rank[index] = position;
        }
    }
}
