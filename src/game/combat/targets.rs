// Target registry - colliders to damage receivers
//
// Receivers are registered once and resolved by collider at hit time, so
// nothing scans for capabilities while a swing is resolving.

use std::collections::HashMap;

use super::damage::{DamageInfo, Damageable, TargetId};
use crate::engine::physics::ColliderId;

/// Owns every hittable target in the level
#[derive(Default)]
pub struct TargetRegistry {
    targets: HashMap<TargetId, Box<dyn Damageable>>,
    colliders: HashMap<ColliderId, TargetId>,
    next_id: u32,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target and get its id
    pub fn register(&mut self, target: Box<dyn Damageable>) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(id, target);
        id
    }

    /// Route hits on `collider` to `target`. Several colliders may share a target.
    pub fn attach_collider(&mut self, target: TargetId, collider: ColliderId) {
        if self.targets.contains_key(&target) {
            self.colliders.insert(collider, target);
        } else {
            log::warn!("Collider {:?} attached to unknown target {:?}", collider, target);
        }
    }

    /// Remove a target and every collider routed to it
    pub fn remove(&mut self, target: TargetId) -> Option<Box<dyn Damageable>> {
        self.colliders.retain(|_, t| *t != target);
        self.targets.remove(&target)
    }

    pub fn resolve(&self, collider: ColliderId) -> Option<TargetId> {
        self.colliders.get(&collider).copied()
    }

    pub fn get(&self, target: TargetId) -> Option<&dyn Damageable> {
        self.targets.get(&target).map(|t| t.as_ref())
    }

    pub fn apply_damage(&mut self, target: TargetId, info: &DamageInfo) -> bool {
        match self.targets.get_mut(&target) {
            Some(t) => t.take_damage(info),
            None => false,
        }
    }

    /// Stun a target. False when it does not exist or cannot be stunned.
    pub fn stun(&mut self, target: TargetId, duration: f32) -> bool {
        let Some(stunnable) = self.targets.get_mut(&target).and_then(|t| t.stunnable()) else {
            return false;
        };
        stunnable.stun(duration);
        true
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combat::damage::DamageSource;
    use crate::game::combat::enemy::EnemyHealth;
    use glam::Vec2;

    #[test]
    fn test_colliders_share_a_target() {
        let mut registry = TargetRegistry::new();
        let id = registry.register(Box::new(EnemyHealth::new(3)));
        registry.attach_collider(id, ColliderId(10));
        registry.attach_collider(id, ColliderId(11));

        assert_eq!(registry.resolve(ColliderId(10)), Some(id));
        assert_eq!(registry.resolve(ColliderId(11)), Some(id));
        assert_eq!(registry.resolve(ColliderId(12)), None);
    }

    #[test]
    fn test_apply_damage_and_stun() {
        let mut registry = TargetRegistry::new();
        let id = registry.register(Box::new(EnemyHealth::new(1)));
        let hit = DamageInfo::new(1, Vec2::X, 5.0, DamageSource::Player);

        assert!(registry.apply_damage(id, &hit));
        assert!(registry.get(id).is_some_and(|t| t.is_dead()));
        assert!(registry.stun(id, 0.5));
        assert!(!registry.apply_damage(TargetId(99), &hit));
    }

    #[test]
    fn test_remove_clears_colliders() {
        let mut registry = TargetRegistry::new();
        let id = registry.register(Box::new(EnemyHealth::new(3)));
        registry.attach_collider(id, ColliderId(1));
        assert!(registry.remove(id).is_some());
        assert_eq!(registry.resolve(ColliderId(1)), None);
        assert!(registry.is_empty());
    }
}
