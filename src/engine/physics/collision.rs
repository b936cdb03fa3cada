use rapier2d::prelude::*;

/// Collision layers for filtering what queries and contacts can see
///
/// Every query in the game is filtered by a mask built from these layers,
/// e.g. the ground check only looks at `Ground`, melee hitboxes only at `Hittable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Default layer - interacts with everything
    Default = 0b0000_0001,

    /// The player character
    Player = 0b0000_0010,

    /// Static level geometry: floors, walls, ledges
    Ground = 0b0000_0100,

    /// Enemies and anything else melee can damage
    Hittable = 0b0000_1000,

    /// Spikes, lava and other contact-damage volumes
    Hazard = 0b0001_0000,

    /// Coins and other pickups
    Pickup = 0b0010_0000,

    /// Trigger zones (stage gates, checkpoints)
    Sensor = 0b0100_0000,
}

impl Layer {
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self.bits());

        let filter = match self {
            // The player collides with the level and touches hazards/pickups/sensors,
            // but never with enemies' bodies (contact damage goes through hazards)
            Layer::Player => LayerMask::from_layers(&[
                Layer::Ground,
                Layer::Hazard,
                Layer::Pickup,
                Layer::Sensor,
            ]),
            Layer::Ground => LayerMask::from_layers(&[
                Layer::Player,
                Layer::Ground,
                Layer::Hittable,
            ]),
            Layer::Hittable => LayerMask::from_layers(&[Layer::Ground, Layer::Hittable]),
            Layer::Hazard | Layer::Pickup => LayerMask::from_layers(&[Layer::Player]),
            Layer::Sensor | Layer::Default => LayerMask::ALL,
        };

        InteractionGroups::new(memberships, Group::from_bits_truncate(filter.bits()))
    }
}

/// A set of layers a query is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const GROUND: LayerMask = LayerMask(Layer::Ground as u32);
    pub const HITTABLE: LayerMask = LayerMask(Layer::Hittable as u32);

    pub fn from_layers(layers: &[Layer]) -> Self {
        Self(layers.iter().fold(0, |acc, layer| acc | layer.bits()))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bits() != 0
    }

    /// Query groups for rapier: the query is a member of everything,
    /// and only sees colliders that belong to this mask
    pub fn to_query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::GROUND
    }
}
