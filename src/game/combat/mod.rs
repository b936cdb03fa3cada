// Combat: combo, melee and ranged hits, enemies, damage routing and hit feedback

pub mod charger;
pub mod combo;
pub mod contact;
pub mod damage;
pub mod enemy;
pub mod hit_stop;
pub mod melee;
pub mod projectile;
pub mod targets;

pub use charger::{ChargerPhase, ChargerTuning, EnemyCharger};
pub use combo::{Combo, ComboEvent, ComboState, MAX_ATTACK_INDEX};
pub use contact::{ContactDamage, ContactPhase};
pub use damage::{DamageInfo, DamageSource, Damageable, Stunnable, TargetId, VfxHandle};
pub use enemy::EnemyHealth;
pub use hit_stop::{CombatFeedback, FeedbackState, HitStop};
pub use melee::{ActiveHitbox, CombatTuning, PlayerCombat};
pub use projectile::{Projectile, ProjectileEvent, ProjectileLauncher, ProjectileTuning};
pub use targets::TargetRegistry;
