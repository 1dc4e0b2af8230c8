struct AbilityTickOutcome {
    state: AbilityState,
    remove: Option<RemovalReason>,
}

impl AbilityTickOutcome {
    fn keep(state: AbilityState) -> Self {
        Self {
            state,
            remove: None,
        }
    }

    fn remove(state: AbilityState, reason: RemovalReason) -> Self {
        Self {
            state,
            remove: Some(reason),
        }
    }
}

/// One behavior per ability id. Removal from inside a tick is declared on
/// the outcome and applied by the coordinator after the call returns.
trait Ability {
    fn init(&self, world: &mut HostWorld, player_id: PlayerId) -> AbilityState;

    fn tick(
        &self,
        world: &mut HostWorld,
        player_id: PlayerId,
        avatar_id: EntityId,
        state: AbilityState,
    ) -> AbilityTickOutcome;

    fn cleanup(&self, world: &mut HostWorld, player_id: PlayerId, state: AbilityState);

    fn on_entity_hit(&self, _world: &mut HostWorld, _player_id: PlayerId, _target: EntityId) {}
}

fn ability_handler(ability: AbilityId) -> &'static dyn Ability {
    match ability {
        AbilityId::Creeper => &CreeperAbility,
        AbilityId::Enderman => &EndermanAbility,
        AbilityId::Bee => &BeeAbility,
    }
}

fn passive_effect(amplifier: u8) -> EffectInstance {
    EffectInstance {
        amplifier,
        remaining_ticks: PASSIVE_EFFECT_TICKS,
        show_particles: false,
    }
}

fn refresh_effect(amplifier: u8) -> EffectInstance {
    EffectInstance {
        amplifier,
        remaining_ticks: REFRESH_EFFECT_TICKS,
        show_particles: false,
    }
}

struct CreeperAbility;

impl Ability for CreeperAbility {
    fn init(&self, world: &mut HostWorld, player_id: PlayerId) -> AbilityState {
        world.add_player_effect(player_id, EffectKind::FireResistance, passive_effect(1));
        AbilityState::Creeper(CreeperState::default())
    }

    fn tick(
        &self,
        world: &mut HostWorld,
        player_id: PlayerId,
        avatar_id: EntityId,
        state: AbilityState,
    ) -> AbilityTickOutcome {
        let AbilityState::Creeper(current) = state else {
            return AbilityTickOutcome::keep(AbilityState::default_for(AbilityId::Creeper));
        };
        let Some(avatar_position) = world.find_entity(avatar_id).map(|avatar| avatar.position)
        else {
            return AbilityTickOutcome::keep(state);
        };
        let sneaking = world
            .find_player(player_id)
            .map(|player| player.sneaking)
            .unwrap_or(false);

        if !sneaking {
            if current.charging {
                world.play_sound(FUSE_SOUND, avatar_position, FUSE_PITCH_RESET);
            }
            return AbilityTickOutcome::keep(AbilityState::Creeper(CreeperState::default()));
        }

        let charge_ticks = current.charge_ticks.saturating_add(1);

        if !current.charging {
            world.play_sound(FUSE_SOUND, avatar_position, FUSE_PITCH_CHARGING);
        }

        if charge_ticks >= CREEPER_CHARGE_TICKS {
            world.create_explosion(avatar_position, CREEPER_EXPLOSION_RADIUS, true);
            return AbilityTickOutcome::remove(
                AbilityState::Creeper(CreeperState {
                    charge_ticks: 0,
                    charging: false,
                    exploded: true,
                }),
                RemovalReason::CreeperExplosion,
            );
        }

        world.spawn_particle(FLAME_PARTICLE, avatar_position);

        AbilityTickOutcome::keep(AbilityState::Creeper(CreeperState {
            charge_ticks,
            charging: true,
            exploded: false,
        }))
    }

    fn cleanup(&self, world: &mut HostWorld, player_id: PlayerId, _state: AbilityState) {
        world.remove_player_effect(player_id, EffectKind::FireResistance);
    }
}

struct EndermanAbility;

impl Ability for EndermanAbility {
    fn init(&self, world: &mut HostWorld, player_id: PlayerId) -> AbilityState {
        world.add_player_effect(player_id, EffectKind::SlowFalling, passive_effect(0));
        world.add_player_effect(player_id, EffectKind::NightVision, passive_effect(0));
        AbilityState::Enderman(EndermanState::default())
    }

    fn tick(
        &self,
        world: &mut HostWorld,
        player_id: PlayerId,
        avatar_id: EntityId,
        state: AbilityState,
    ) -> AbilityTickOutcome {
        let AbilityState::Enderman(current) = state else {
            return AbilityTickOutcome::keep(AbilityState::default_for(AbilityId::Enderman));
        };
        let Some((sneaking, jumping, view_direction)) = world
            .find_player(player_id)
            .map(|player| (player.sneaking, player.jumping, player.view_direction))
        else {
            return AbilityTickOutcome::keep(state);
        };

        let mut next = EndermanState {
            cooldown: current.cooldown.saturating_sub(1),
            was_jumping: jumping,
        };

        // The short-lived grants expire on their own, so they are renewed
        // every tick while the morph holds.
        world.add_player_effect(player_id, EffectKind::SlowFalling, refresh_effect(0));
        world.add_player_effect(player_id, EffectKind::Resistance, refresh_effect(1));

        let combo = sneaking && jumping;
        if combo && !current.was_jumping && next.cooldown == 0 {
            let Some(origin) = world.find_entity(avatar_id).map(|avatar| avatar.position) else {
                return AbilityTickOutcome::keep(AbilityState::Enderman(next));
            };
            let destination = Vec3 {
                x: origin.x + view_direction.x * ENDERMAN_TELEPORT_DISTANCE,
                y: (origin.y + view_direction.y * ENDERMAN_TELEPORT_DISTANCE)
                    .max(ENDERMAN_MIN_DESTINATION_Y),
                z: origin.z + view_direction.z * ENDERMAN_TELEPORT_DISTANCE,
            };

            world.spawn_particle(PORTAL_PARTICLE, origin);
            let relocated = world
                .teleport_player(player_id, destination)
                .and_then(|_| world.teleport_entity(avatar_id, destination));
            match relocated {
                Ok(()) => {
                    world.spawn_particle(PORTAL_PARTICLE, destination);
                    world.play_sound(WARP_SOUND, destination, WARP_PITCH);
                    next.cooldown = ENDERMAN_COOLDOWN_TICKS;
                }
                Err(error) => {
                    warn!(player = player_id.0, error = %error, "enderman_teleport_rejected");
                    return AbilityTickOutcome::remove(
                        AbilityState::Enderman(next),
                        RemovalReason::EndermanTeleportFailure,
                    );
                }
            }
        }

        AbilityTickOutcome::keep(AbilityState::Enderman(next))
    }

    fn cleanup(&self, world: &mut HostWorld, player_id: PlayerId, _state: AbilityState) {
        world.remove_player_effect(player_id, EffectKind::NightVision);
        world.remove_player_effect(player_id, EffectKind::SlowFalling);
        world.remove_player_effect(player_id, EffectKind::Resistance);
    }
}

struct BeeAbility;

impl Ability for BeeAbility {
    fn init(&self, world: &mut HostWorld, player_id: PlayerId) -> AbilityState {
        world.add_player_effect(player_id, EffectKind::SlowFalling, passive_effect(0));
        AbilityState::Bee(BeeState::default())
    }

    fn tick(
        &self,
        world: &mut HostWorld,
        player_id: PlayerId,
        _avatar_id: EntityId,
        state: AbilityState,
    ) -> AbilityTickOutcome {
        let AbilityState::Bee(_) = state else {
            return AbilityTickOutcome::keep(AbilityState::default_for(AbilityId::Bee));
        };
        world.add_player_effect(player_id, EffectKind::SlowFalling, refresh_effect(0));
        world.add_player_effect(player_id, EffectKind::JumpBoost, refresh_effect(1));
        world.add_player_effect(player_id, EffectKind::Speed, refresh_effect(0));
        AbilityTickOutcome::keep(state)
    }

    fn cleanup(&self, world: &mut HostWorld, player_id: PlayerId, _state: AbilityState) {
        world.remove_player_effect(player_id, EffectKind::SlowFalling);
        world.remove_player_effect(player_id, EffectKind::JumpBoost);
        world.remove_player_effect(player_id, EffectKind::Speed);
    }

    fn on_entity_hit(&self, world: &mut HostWorld, _player_id: PlayerId, target: EntityId) {
        let Some(entity) = world.find_entity(target) else {
            return;
        };
        if !entity.supports_effects {
            return;
        }
        let position = entity.position;

        if let Err(error) = world.add_entity_effect(
            target,
            EffectKind::Poison,
            EffectInstance {
                amplifier: 0,
                remaining_ticks: POISON_DURATION_TICKS,
                show_particles: true,
            },
        ) {
            debug!(target = target.0, error = %error, "sting_effect_skipped");
            return;
        }
        world.play_sound(STING_SOUND, position, STING_PITCH);
    }
}
