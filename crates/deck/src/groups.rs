#![forbid(unsafe_code)]

//! Registry of gesture groups keyed by the group id renders carry.
//!
//! Every realized render whose descriptor names a group gets a
//! [`GestureUnit`] on its canvas surface, joined to the [`GestureGroup`] of
//! that id. Renders that drop their group or are removed leave it again, and
//! a group without members is forgotten.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use deck_core::animation::Animator;
use deck_core::{ConfigurationError, GroupId, NodeId, Rect};
use deck_gesture::{
    GestureConfig, GestureGroup, GestureInput, GestureUnit, MoveMode, Recognizer, Surface,
};
use tracing::debug;

struct Member {
    group: GroupId,
    unit: GestureUnit,
}

/// Gesture groups and the units that belong to them.
pub struct GroupRegistry {
    animator: Rc<dyn Animator>,
    container: Rc<dyn Fn() -> Rect>,
    config: RefCell<GestureConfig>,
    groups: RefCell<AHashMap<GroupId, GestureGroup>>,
    members: RefCell<AHashMap<NodeId, Member>>,
}

impl std::fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.groups.borrow().len())
            .field("members", &self.members.borrow().len())
            .finish()
    }
}

impl GroupRegistry {
    /// Create a registry whose groups are bounded by `container`.
    pub fn new(
        animator: Rc<dyn Animator>,
        container: impl Fn() -> Rect + 'static,
        config: GestureConfig,
    ) -> Self {
        Self {
            animator,
            container: Rc::new(container),
            config: RefCell::new(config),
            groups: RefCell::new(AHashMap::new()),
            members: RefCell::new(AHashMap::new()),
        }
    }

    /// Gesture config used for units created from now on.
    pub fn set_config(&self, config: GestureConfig) {
        *self.config.borrow_mut() = config;
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<GestureGroup> {
        self.groups.borrow().get(id).cloned()
    }

    #[must_use]
    pub fn unit(&self, node: NodeId) -> Option<GestureUnit> {
        self.members.borrow().get(&node).map(|m| m.unit.clone())
    }

    /// Group the unit on `node` belongs to.
    #[must_use]
    pub fn group_of(&self, node: NodeId) -> Option<GroupId> {
        self.members.borrow().get(&node).map(|m| m.group.clone())
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.borrow().len()
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.borrow().len()
    }

    /// Put `surface` into group `id`, creating the unit and group on demand.
    ///
    /// Re-joining the same group is a no-op apart from a bounds refresh.
    pub fn join(
        &self,
        id: &GroupId,
        surface: Rc<dyn Surface>,
    ) -> Result<GestureUnit, ConfigurationError> {
        let node = surface.node();
        let existing = self
            .members
            .borrow()
            .get(&node)
            .map(|m| (m.group.clone(), m.unit.clone()));
        match existing {
            Some((group, unit)) if &group == id => {
                if let Some(group) = self.group(id) {
                    group.update_bounds();
                }
                return Ok(unit);
            }
            Some(_) => self.leave(node),
            None => {}
        }

        let config = GestureConfig {
            mode: MoveMode::Position,
            ..*self.config.borrow()
        };
        let unit = GestureUnit::builder()
            .surface(surface)
            .animator(Rc::clone(&self.animator))
            .recognizer(Recognizer::all())
            .config(config)
            .build()?;

        let group = {
            let mut groups = self.groups.borrow_mut();
            groups
                .entry(id.clone())
                .or_insert_with(|| {
                    let container = Rc::clone(&self.container);
                    GestureGroup::new(move || container())
                })
                .clone()
        };
        self.members.borrow_mut().insert(
            node,
            Member {
                group: id.clone(),
                unit: unit.clone(),
            },
        );
        group.add_member(&unit);
        debug!(group = id.as_str(), %node, members = group.len(), "joined gesture group");
        Ok(unit)
    }

    /// Remove the unit on `node` from its group. No-op for unknown nodes.
    pub fn leave(&self, node: NodeId) {
        let Some(member) = self.members.borrow_mut().remove(&node) else {
            return;
        };
        let Some(group) = self.group(&member.group) else {
            return;
        };
        group.remove_member(&member.unit);
        if group.is_empty() {
            self.groups.borrow_mut().remove(&member.group);
        }
        debug!(group = member.group.as_str(), %node, "left gesture group");
    }

    /// Recompute bounds of every group, e.g. after the frame changed.
    pub fn update_bounds(&self) {
        let groups: Vec<GestureGroup> = self.groups.borrow().values().cloned().collect();
        for group in groups {
            group.update_bounds();
        }
    }

    /// Route a recognized gesture to the unit on `node`.
    ///
    /// Returns `false` when no unit is registered there.
    pub fn handle(&self, node: NodeId, input: &GestureInput) -> bool {
        let Some(unit) = self.unit(node) else {
            return false;
        };
        unit.handle(input);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Point;
    use deck_core::animation::RecordingAnimator;
    use deck_gesture::testing::TestSurface;

    fn registry() -> GroupRegistry {
        GroupRegistry::new(
            Rc::new(RecordingAnimator::new()),
            || Rect::new(0.0, 0.0, 100.0, 100.0),
            GestureConfig::default(),
        )
    }

    #[test]
    fn join_creates_group_and_rejoin_is_noop() {
        let reg = registry();
        let row = GroupId::new("row-0");
        let a = TestSurface::new(1, Rect::new(0.0, 0.0, 80.0, 40.0));
        let first = reg.join(&row, a.clone()).unwrap();
        let again = reg.join(&row, a).unwrap();
        assert!(first.ptr_eq(&again));
        assert_eq!(reg.group_count(), 1);
        assert_eq!(reg.group(&row).unwrap().len(), 1);
    }

    #[test]
    fn switching_groups_leaves_the_old_one() {
        let reg = registry();
        let a = TestSurface::new(1, Rect::new(0.0, 0.0, 80.0, 40.0));
        reg.join(&GroupId::new("row-0"), a.clone()).unwrap();
        reg.join(&GroupId::new("row-1"), a).unwrap();
        assert!(reg.group(&GroupId::new("row-0")).is_none());
        assert_eq!(reg.group_of(NodeId(1)), Some(GroupId::new("row-1")));
    }

    #[test]
    fn handle_moves_the_whole_group() {
        let reg = registry();
        let row = GroupId::new("row-0");
        let a = TestSurface::new(1, Rect::new(0.0, 0.0, 150.0, 40.0));
        let b = TestSurface::new(2, Rect::new(150.0, 0.0, 150.0, 40.0));
        reg.join(&row, a.clone()).unwrap();
        reg.join(&row, b.clone()).unwrap();

        assert!(reg.handle(NodeId(2), &GestureInput::PanStart));
        reg.handle(
            NodeId(2),
            &GestureInput::PanMove {
                delta: Point::new(-100.0, 0.0),
            },
        );
        assert_eq!(a.position(), Point::new(-100.0, 0.0));
        assert_eq!(b.position(), Point::new(50.0, 0.0));
        assert!(!reg.handle(NodeId(9), &GestureInput::PanStart));
    }

    #[test]
    fn last_leave_forgets_group() {
        let reg = registry();
        let row = GroupId::new("row-0");
        reg.join(&row, TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0)))
            .unwrap();
        reg.leave(NodeId(1));
        reg.leave(NodeId(1));
        assert_eq!(reg.group_count(), 0);
        assert_eq!(reg.member_count(), 0);
    }
}
