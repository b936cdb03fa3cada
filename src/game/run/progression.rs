// Collaborators the run reports to: meta progression and scene loading

use std::collections::HashSet;

/// Persistent meta progression
pub trait Progression {
    /// Bank coins. Negative amounts add nothing.
    fn add_meta_coins(&mut self, amount: i64);
    fn meta_coins(&self) -> i64;
    fn is_unlocked(&self, id: &str) -> bool;
    fn unlock(&mut self, id: &str);
}

/// Receives scene change requests, loading is up to the host
pub trait SceneLoader {
    fn load_scene(&mut self, name: &str);
}

/// Progression that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct InMemoryProgression {
    meta_coins: i64,
    unlocked: HashSet<String>,
}

impl InMemoryProgression {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progression for InMemoryProgression {
    fn add_meta_coins(&mut self, amount: i64) {
        self.meta_coins += amount.max(0);
    }

    fn meta_coins(&self) -> i64 {
        self.meta_coins
    }

    fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    fn unlock(&mut self, id: &str) {
        if id.is_empty() {
            return;
        }
        self.unlocked.insert(id.to_string());
    }
}
