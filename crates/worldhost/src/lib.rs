pub mod prompt;
pub mod properties;
mod store_io;
pub mod world;

pub use prompt::{PromptEntry, PromptId, PromptResponse, ResolvedPrompt};
pub use properties::{PropertyError, PropertyStore};
pub use world::{
    EffectInstance, EffectKind, Entity, EntityId, ExplosionEvent, HostError, HostEvent, HostWorld,
    ParticleEvent, Player, PlayerId, Region, SoundEvent, Vec3,
};
