pub mod geometry;
pub mod body;
pub mod sight;
pub mod predict;
pub mod damage;
pub mod assess;
pub mod evasion;
pub mod zones;
pub mod targeting;
pub mod steering;
pub mod bonus;
pub mod policy;
pub mod episode;
pub mod scenario;

pub use episode::*;
pub use evasion::{evade, Evasion, Outcome};
pub use policy::*;
pub use predict::{Arena, Tracks};
pub use zones::{best_zone, Zone};
