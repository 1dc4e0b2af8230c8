use std::collections::HashMap;

use thiserror::Error;

use crate::prompt::{PromptBoard, PromptEntry, PromptId, PromptResponse, ResolvedPrompt};
use crate::properties::PropertyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Axis-aligned box used to reject teleport destinations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: Vec3,
    pub max: Vec3,
}

impl Region {
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Invisibility,
    FireResistance,
    SlowFalling,
    NightVision,
    Resistance,
    JumpBoost,
    Speed,
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectInstance {
    pub amplifier: u8,
    pub remaining_ticks: u32,
    pub show_particles: bool,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub archetype: String,
    pub position: Vec3,
    pub tags: Vec<String>,
    pub rider: Option<PlayerId>,
    pub supports_effects: bool,
    pub effects: HashMap<EffectKind, EffectInstance>,
}

impl Entity {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|entry| entry == tag)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec3,
    pub view_direction: Vec3,
    pub sneaking: bool,
    pub jumping: bool,
    pub effects: HashMap<EffectKind, EffectInstance>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    WorldReady,
    ItemUsed { player_id: PlayerId, item: String },
    PlayerLeft { player_id: PlayerId },
    PlayerSpawned { player_id: PlayerId },
    EntityDied { entity_id: EntityId },
    PlayerMeleeHit { player_id: PlayerId, target: EntityId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundEvent {
    pub name: String,
    pub position: Vec3,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEvent {
    pub name: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionEvent {
    pub position: Vec3,
    pub radius: f32,
    pub breaks_blocks: bool,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("entity spawns are currently denied by the host")]
    SpawnDenied,
    #[error("unknown entity {0}")]
    UnknownEntity(u64),
    #[error("unknown player {0}")]
    UnknownPlayer(u64),
    #[error("kill rejected for entity {0}")]
    KillRejected(u64),
    #[error("removal rejected for entity {0}")]
    RemovalRejected(u64),
    #[error("teleport destination ({x}, {y}, {z}) is blocked")]
    TeleportBlocked { x: f32, y: f32, z: f32 },
    #[error("entity {0} does not support effects")]
    EffectsUnsupported(u64),
    #[error("prompt display rejected for player {0}")]
    PromptRejected(u64),
}

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct HostWorld {
    allocator: EntityIdAllocator,
    next_player_id: u64,
    entities: Vec<Entity>,
    players: Vec<Player>,
    events: Vec<HostEvent>,
    sounds: Vec<SoundEvent>,
    particles: Vec<ParticleEvent>,
    explosions: Vec<ExplosionEvent>,
    blocked_regions: Vec<Region>,
    spawns_denied: bool,
    kills_denied: bool,
    removals_denied: bool,
    prompts_denied: bool,
    properties: PropertyStore,
    prompts: PromptBoard,
}

impl HostWorld {
    pub fn connect_player(&mut self, name: &str, position: Vec3) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id = self.next_player_id.saturating_add(1);
        self.players.push(Player {
            id,
            name: name.to_string(),
            position,
            view_direction: Vec3 {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
            sneaking: false,
            jumping: false,
            effects: HashMap::new(),
        });
        self.events.push(HostEvent::PlayerSpawned { player_id: id });
        id
    }

    pub fn disconnect_player(&mut self, player_id: PlayerId) -> Result<(), HostError> {
        let before = self.players.len();
        self.players.retain(|player| player.id != player_id);
        if self.players.len() == before {
            return Err(HostError::UnknownPlayer(player_id.0));
        }
        self.events.push(HostEvent::PlayerLeft { player_id });
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn find_player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn find_player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id == player_id)
    }

    pub fn spawn_entity(&mut self, archetype: &str, position: Vec3) -> Result<EntityId, HostError> {
        if self.spawns_denied {
            return Err(HostError::SpawnDenied);
        }
        let id = self.allocator.allocate();
        self.entities.push(Entity {
            id,
            archetype: archetype.to_string(),
            position,
            tags: Vec::new(),
            rider: None,
            supports_effects: true,
            effects: HashMap::new(),
        });
        Ok(id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn find_entity(&self, entity_id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == entity_id)
    }

    pub fn find_entity_mut(&mut self, entity_id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|entity| entity.id == entity_id)
    }

    /// Death-style removal: fires an `EntityDied` event on success.
    pub fn kill_entity(&mut self, entity_id: EntityId) -> Result<(), HostError> {
        if self.kills_denied {
            return Err(HostError::KillRejected(entity_id.0));
        }
        if self.find_entity(entity_id).is_none() {
            return Err(HostError::UnknownEntity(entity_id.0));
        }
        self.entities.retain(|entity| entity.id != entity_id);
        self.events.push(HostEvent::EntityDied { entity_id });
        Ok(())
    }

    /// Silent removal: no death event.
    pub fn remove_entity(&mut self, entity_id: EntityId) -> Result<(), HostError> {
        if self.removals_denied {
            return Err(HostError::RemovalRejected(entity_id.0));
        }
        if self.find_entity(entity_id).is_none() {
            return Err(HostError::UnknownEntity(entity_id.0));
        }
        self.entities.retain(|entity| entity.id != entity_id);
        Ok(())
    }

    pub fn teleport_player(
        &mut self,
        player_id: PlayerId,
        destination: Vec3,
    ) -> Result<(), HostError> {
        self.check_destination(destination)?;
        let player = self
            .find_player_mut(player_id)
            .ok_or(HostError::UnknownPlayer(player_id.0))?;
        player.position = destination;
        Ok(())
    }

    pub fn teleport_entity(
        &mut self,
        entity_id: EntityId,
        destination: Vec3,
    ) -> Result<(), HostError> {
        self.check_destination(destination)?;
        let entity = self
            .find_entity_mut(entity_id)
            .ok_or(HostError::UnknownEntity(entity_id.0))?;
        entity.position = destination;
        Ok(())
    }

    fn check_destination(&self, destination: Vec3) -> Result<(), HostError> {
        if self
            .blocked_regions
            .iter()
            .any(|region| region.contains(destination))
        {
            return Err(HostError::TeleportBlocked {
                x: destination.x,
                y: destination.y,
                z: destination.z,
            });
        }
        Ok(())
    }

    pub fn add_player_effect(
        &mut self,
        player_id: PlayerId,
        kind: EffectKind,
        instance: EffectInstance,
    ) -> bool {
        let Some(player) = self.find_player_mut(player_id) else {
            return false;
        };
        player.effects.insert(kind, instance);
        true
    }

    pub fn remove_player_effect(&mut self, player_id: PlayerId, kind: EffectKind) -> bool {
        let Some(player) = self.find_player_mut(player_id) else {
            return false;
        };
        player.effects.remove(&kind).is_some()
    }

    pub fn player_effect(&self, player_id: PlayerId, kind: EffectKind) -> Option<&EffectInstance> {
        self.find_player(player_id)
            .and_then(|player| player.effects.get(&kind))
    }

    pub fn add_entity_effect(
        &mut self,
        entity_id: EntityId,
        kind: EffectKind,
        instance: EffectInstance,
    ) -> Result<(), HostError> {
        let entity = self
            .find_entity_mut(entity_id)
            .ok_or(HostError::UnknownEntity(entity_id.0))?;
        if !entity.supports_effects {
            return Err(HostError::EffectsUnsupported(entity_id.0));
        }
        entity.effects.insert(kind, instance);
        Ok(())
    }

    pub fn play_sound(&mut self, name: &str, position: Vec3, pitch: f32) {
        self.sounds.push(SoundEvent {
            name: name.to_string(),
            position,
            pitch,
        });
    }

    pub fn spawn_particle(&mut self, name: &str, position: Vec3) {
        self.particles.push(ParticleEvent {
            name: name.to_string(),
            position,
        });
    }

    pub fn create_explosion(&mut self, position: Vec3, radius: f32, breaks_blocks: bool) {
        self.explosions.push(ExplosionEvent {
            position,
            radius,
            breaks_blocks,
        });
    }

    pub fn sounds(&self) -> &[SoundEvent] {
        &self.sounds
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn drain_particles(&mut self) -> Vec<ParticleEvent> {
        std::mem::take(&mut self.particles)
    }

    pub fn drain_explosions(&mut self) -> Vec<ExplosionEvent> {
        std::mem::take(&mut self.explosions)
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// One host time step: timed effects on players and entities decay.
    pub fn advance_tick(&mut self) {
        for player in &mut self.players {
            decay_effects(&mut player.effects);
        }
        for entity in &mut self.entities {
            decay_effects(&mut entity.effects);
        }
    }

    pub fn add_blocked_region(&mut self, region: Region) {
        self.blocked_regions.push(region);
    }

    pub fn set_spawns_denied(&mut self, denied: bool) {
        self.spawns_denied = denied;
    }

    pub fn set_kills_denied(&mut self, denied: bool) {
        self.kills_denied = denied;
    }

    pub fn set_removals_denied(&mut self, denied: bool) {
        self.removals_denied = denied;
    }

    pub fn set_prompts_denied(&mut self, denied: bool) {
        self.prompts_denied = denied;
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    pub fn open_prompt(
        &mut self,
        player_id: PlayerId,
        entries: Vec<PromptEntry>,
    ) -> Result<PromptId, HostError> {
        if self.prompts_denied {
            return Err(HostError::PromptRejected(player_id.0));
        }
        if self.find_player(player_id).is_none() {
            return Err(HostError::UnknownPlayer(player_id.0));
        }
        Ok(self.prompts.open(player_id, entries))
    }

    pub fn open_prompt_ids(&self) -> Vec<PromptId> {
        self.prompts.open_ids()
    }

    pub fn prompt_entries(&self, prompt_id: PromptId) -> Option<&[PromptEntry]> {
        self.prompts.entries(prompt_id)
    }

    pub fn resolve_prompt(&mut self, prompt_id: PromptId, response: PromptResponse) -> bool {
        self.prompts.resolve(prompt_id, response)
    }

    pub fn drain_prompt_responses(&mut self) -> Vec<ResolvedPrompt> {
        self.prompts.drain_resolved()
    }
}

fn decay_effects(effects: &mut HashMap<EffectKind, EffectInstance>) {
    effects.retain(|_, instance| {
        instance.remaining_ticks = instance.remaining_ticks.saturating_sub(1);
        instance.remaining_ticks > 0
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_fires_death_event_and_removes_entity() {
        let mut world = HostWorld::default();
        let id = world
            .spawn_entity("test:crab", Vec3::default())
            .expect("spawn");
        world.drain_events();

        world.kill_entity(id).expect("kill");

        assert!(world.find_entity(id).is_none());
        assert_eq!(world.drain_events(), vec![HostEvent::EntityDied { entity_id: id }]);
    }

    #[test]
    fn remove_is_silent_and_kill_denial_is_reported() {
        let mut world = HostWorld::default();
        let id = world
            .spawn_entity("test:crab", Vec3::default())
            .expect("spawn");
        world.drain_events();
        world.set_kills_denied(true);

        assert!(matches!(
            world.kill_entity(id),
            Err(HostError::KillRejected(_))
        ));
        world.remove_entity(id).expect("remove");
        assert!(world.find_entity(id).is_none());
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn teleport_rejects_blocked_destinations() {
        let mut world = HostWorld::default();
        let player_id = world.connect_player("tester", Vec3::default());
        world.add_blocked_region(Region {
            min: Vec3 {
                x: 5.0,
                y: 0.0,
                z: 5.0,
            },
            max: Vec3 {
                x: 10.0,
                y: 10.0,
                z: 10.0,
            },
        });

        let blocked = Vec3 {
            x: 7.0,
            y: 1.0,
            z: 7.0,
        };
        assert!(matches!(
            world.teleport_player(player_id, blocked),
            Err(HostError::TeleportBlocked { .. })
        ));

        let clear = Vec3 {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        };
        world.teleport_player(player_id, clear).expect("teleport");
        assert_eq!(world.find_player(player_id).expect("player").position, clear);
    }

    #[test]
    fn effects_decay_and_expire_on_advance_tick() {
        let mut world = HostWorld::default();
        let player_id = world.connect_player("tester", Vec3::default());
        world.add_player_effect(
            player_id,
            EffectKind::Speed,
            EffectInstance {
                amplifier: 0,
                remaining_ticks: 2,
                show_particles: false,
            },
        );

        world.advance_tick();
        assert_eq!(
            world
                .player_effect(player_id, EffectKind::Speed)
                .expect("effect")
                .remaining_ticks,
            1
        );

        world.advance_tick();
        assert!(world.player_effect(player_id, EffectKind::Speed).is_none());
    }

    #[test]
    fn disconnect_queues_player_left() {
        let mut world = HostWorld::default();
        let player_id = world.connect_player("tester", Vec3::default());
        world.drain_events();

        world.disconnect_player(player_id).expect("disconnect");

        assert!(world.find_player(player_id).is_none());
        assert_eq!(world.drain_events(), vec![HostEvent::PlayerLeft { player_id }]);
    }
}
