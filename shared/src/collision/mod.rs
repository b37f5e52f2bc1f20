/*!
Collision root module.

Solid-body model and the positional resolver that keeps players out of level
geometry. Everything here is deterministic: bodies live in an id-sorted
vector, pairs are visited in a fixed order, and the only trigonometry goes
through `libm`.

- types:   `Body`, `BodyKind`, AABB helpers
- world:   body registry (creation, id lookup, removal)
- broad:   cell-range prefilter keyed by the world's cell size
- resolve: least-penetration resolver and its `CollisionListener` callback
*/

pub mod broad;
pub mod resolve;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use resolve::{CollisionListener, overlap_depth, penetration_correction, resolve};
pub use types::{Body, BodyId, BodyKind};
pub use world::World;
