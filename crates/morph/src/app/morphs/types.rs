#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AbilityId {
    Creeper,
    Enderman,
    Bee,
}

impl AbilityId {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Creeper => "creeper",
            Self::Enderman => "enderman",
            Self::Bee => "bee",
        }
    }
}

/// Catalog entry. Immutable; loaded once. Several definitions may share
/// an ability, so avatar respawn resolves by ability through
/// `definition_for_ability`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MorphDefinition {
    pub(crate) id: &'static str,
    pub(crate) display_name: &'static str,
    pub(crate) description: &'static str,
    pub(crate) avatar_archetype: &'static str,
    pub(crate) ability: AbilityId,
}

pub(crate) const MORPH_CATALOG: [MorphDefinition; 3] = [
    MorphDefinition {
        id: "creeper",
        display_name: "Creeper",
        description: "Explode on demand after a short charge while crouching.",
        avatar_archetype: "morph:creeper_avatar",
        ability: AbilityId::Creeper,
    },
    MorphDefinition {
        id: "enderman",
        display_name: "Enderman",
        description: "Teleport by sneaking and jumping together. Immune to fall damage.",
        avatar_archetype: "morph:enderman_avatar",
        ability: AbilityId::Enderman,
    },
    MorphDefinition {
        id: "bee",
        display_name: "Bee",
        description: "Hover through the air and sting targets to poison them.",
        avatar_archetype: "morph:bee_avatar",
        ability: AbilityId::Bee,
    },
];

fn definition_for_ability(ability: AbilityId) -> Option<&'static MorphDefinition> {
    MORPH_CATALOG
        .iter()
        .find(|definition| definition.ability == ability)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CreeperState {
    charge_ticks: u32,
    charging: bool,
    #[serde(default)]
    exploded: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct EndermanState {
    cooldown: u32,
    was_jumping: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct BeeState {
    hover_ticks: u32,
}

/// Ability state is owned by its handler; the coordinator only carries it
/// between ticks and feeds it through the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ability", rename_all = "snake_case")]
pub(crate) enum AbilityState {
    Creeper(CreeperState),
    Enderman(EndermanState),
    Bee(BeeState),
}

impl AbilityState {
    fn ability(self) -> AbilityId {
        match self {
            Self::Creeper(_) => AbilityId::Creeper,
            Self::Enderman(_) => AbilityId::Enderman,
            Self::Bee(_) => AbilityId::Bee,
        }
    }

    fn default_for(ability: AbilityId) -> Self {
        match ability {
            AbilityId::Creeper => Self::Creeper(CreeperState::default()),
            AbilityId::Enderman => Self::Enderman(EndermanState::default()),
            AbilityId::Bee => Self::Bee(BeeState::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MorphRecord {
    pub(crate) ability: AbilityId,
    pub(crate) avatar_id: EntityId,
    pub(crate) state: AbilityState,
}

/// Diagnostic only; the coordinator never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemovalReason {
    Replacing,
    PlayerLeft,
    AvatarDied,
    AvatarMissing,
    Respawn,
    CreeperExplosion,
    EndermanTeleportFailure,
}

impl RemovalReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Replacing => "replacing",
            Self::PlayerLeft => "player_left",
            Self::AvatarDied => "avatar_died",
            Self::AvatarMissing => "avatar_missing",
            Self::Respawn => "respawn",
            Self::CreeperExplosion => "creeper_explosion",
            Self::EndermanTeleportFailure => "enderman_tp_failure",
        }
    }
}
