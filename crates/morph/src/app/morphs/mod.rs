use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use worldhost::{
    EffectInstance, EffectKind, EntityId, HostEvent, HostWorld, PlayerId, PromptEntry,
    PromptResponse, Vec3,
};

pub(crate) const MENU_ITEM: &str = "morph:shaper_totem";
const AVATAR_TAG: &str = "morph_avatar";

const PROP_MORPH_ID: &str = "morph:current_id";
const PROP_AVATAR_ID: &str = "morph:avatar_id";
const PROP_STATE: &str = "morph:ability_state";
const PROP_MORPH_ID_MAX: usize = 32;
const PROP_AVATAR_ID_MAX: usize = 48;
const MAX_STATE_LENGTH: usize = 4096;

const PASSIVE_EFFECT_TICKS: u32 = 2_000_000_000;
const REFRESH_EFFECT_TICKS: u32 = 10;

const APPLY_SPAWN_Y_OFFSET: f32 = 0.1;
const RESPAWN_SPAWN_Y_OFFSET: f32 = 0.25;

const CREEPER_CHARGE_TICKS: u32 = 40;
const CREEPER_EXPLOSION_RADIUS: f32 = 4.0;
const ENDERMAN_TELEPORT_DISTANCE: f32 = 16.0;
const ENDERMAN_MIN_DESTINATION_Y: f32 = 1.0;
const ENDERMAN_COOLDOWN_TICKS: u32 = 40;
const POISON_DURATION_TICKS: u32 = 80;

const FUSE_SOUND: &str = "avatar.fuse";
const WARP_SOUND: &str = "avatar.warp";
const STING_SOUND: &str = "avatar.sting";
const FLAME_PARTICLE: &str = "flame_wisp";
const PORTAL_PARTICLE: &str = "portal_mote";
const FUSE_PITCH_CHARGING: f32 = 1.1;
const FUSE_PITCH_RESET: f32 = 0.5;
const WARP_PITCH: f32 = 1.0;
const STING_PITCH: f32 = 1.2;

include!("types.rs");
include!("codec.rs");
include!("abilities.rs");
include!("coordinator.rs");
include!("adapter.rs");
