/// Owns the record map and the avatar ownership index. Single-threaded:
/// the event adapter and the tick pass run on the same logical step, so
/// no operation ever observes another mid-flight.
#[derive(Debug, Default)]
pub(crate) struct MorphCoordinator {
    active: HashMap<PlayerId, MorphRecord>,
    avatar_owners: HashMap<EntityId, PlayerId>,
    last_removal: Option<(PlayerId, RemovalReason)>,
}

impl MorphCoordinator {
    pub(crate) fn register_properties(&self, world: &mut HostWorld) {
        let properties = world.properties_mut();
        properties.register(PROP_MORPH_ID, PROP_MORPH_ID_MAX);
        properties.register(PROP_AVATAR_ID, PROP_AVATAR_ID_MAX);
        properties.register(PROP_STATE, MAX_STATE_LENGTH);
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn active_record(&self, player_id: PlayerId) -> Option<&MorphRecord> {
        self.active.get(&player_id)
    }

    pub(crate) fn avatar_owner(&self, avatar_id: EntityId) -> Option<PlayerId> {
        self.avatar_owners.get(&avatar_id).copied()
    }

    pub(crate) fn last_removal(&self) -> Option<(PlayerId, RemovalReason)> {
        self.last_removal
    }

    /// Replaces any prior morph first, so at most one record per player
    /// ever exists. A failed avatar spawn leaves the player unmorphed.
    pub(crate) fn apply_morph(
        &mut self,
        world: &mut HostWorld,
        player_id: PlayerId,
        definition: &MorphDefinition,
    ) {
        self.remove_morph(world, player_id, RemovalReason::Replacing);

        let Some(player_position) = world.find_player(player_id).map(|player| player.position)
        else {
            warn!(player = player_id.0, "morph_apply_player_missing");
            return;
        };

        let spawn_at = offset_above(player_position, APPLY_SPAWN_Y_OFFSET);
        let avatar_id = match world.spawn_entity(definition.avatar_archetype, spawn_at) {
            Ok(avatar_id) => avatar_id,
            Err(error) => {
                warn!(morph = definition.id, error = %error, "avatar_spawn_failed");
                return;
            }
        };

        self.attach_avatar(world, player_id, avatar_id);

        let state = ability_handler(definition.ability).init(world, player_id);
        world.add_player_effect(player_id, EffectKind::Invisibility, passive_effect(1));

        let record = MorphRecord {
            ability: definition.ability,
            avatar_id,
            state,
        };
        self.persist_record(world, player_id, &record);
        self.active.insert(player_id, record);
        info!(
            player = player_id.0,
            morph = definition.id,
            avatar = avatar_id.0,
            "morph_applied"
        );
    }

    /// Idempotent. Every exit path lands here; invisibility and persisted
    /// properties are cleared even when no record exists.
    pub(crate) fn remove_morph(
        &mut self,
        world: &mut HostWorld,
        player_id: PlayerId,
        reason: RemovalReason,
    ) {
        let Some(record) = self.active.remove(&player_id) else {
            self.clear_persisted(world, player_id);
            world.remove_player_effect(player_id, EffectKind::Invisibility);
            return;
        };

        ability_handler(record.ability).cleanup(world, player_id, record.state);
        self.destroy_avatar(world, record.avatar_id);
        world.remove_player_effect(player_id, EffectKind::Invisibility);
        self.clear_persisted(world, player_id);
        self.last_removal = Some((player_id, reason));
        info!(
            player = player_id.0,
            reason = reason.as_str(),
            "morph_removed"
        );
    }

    /// One pass over every connected player with a record. A vanished
    /// avatar is respawned; if that fails too, the morph ends.
    pub(crate) fn tick_all(&mut self, world: &mut HostWorld) {
        let player_ids: Vec<PlayerId> = world.players().iter().map(|player| player.id).collect();

        for player_id in player_ids {
            let Some(record) = self.active.get(&player_id) else {
                continue;
            };
            let ability = record.ability;
            let state = record.state;
            let mut avatar_id = record.avatar_id;

            if world.find_entity(avatar_id).is_none() {
                match self.respawn_avatar(world, player_id) {
                    Some(new_avatar_id) => avatar_id = new_avatar_id,
                    None => {
                        self.remove_morph(world, player_id, RemovalReason::AvatarMissing);
                        continue;
                    }
                }
            }

            let outcome = ability_handler(ability).tick(world, player_id, avatar_id, state);
            if let Some(record) = self.active.get_mut(&player_id) {
                record.state = outcome.state;
            }
            // Persisted every tick, before any removal clears it, so the
            // stored text always tracks the live state.
            self.persist(world, player_id, PROP_STATE, Some(&encode_state(&outcome.state)));

            if let Some(reason) = outcome.remove {
                self.remove_morph(world, player_id, reason);
            }
        }
    }

    /// Replaces a vanished avatar in place; returns the new id, or `None`
    /// when the definition is gone or the spawn is rejected.
    fn respawn_avatar(&mut self, world: &mut HostWorld, player_id: PlayerId) -> Option<EntityId> {
        let record = self.active.get(&player_id)?;
        let old_avatar_id = record.avatar_id;
        let Some(definition) = definition_for_ability(record.ability) else {
            warn!(
                player = player_id.0,
                ability = record.ability.as_str(),
                "morph_definition_missing"
            );
            return None;
        };
        let player_position = world.find_player(player_id).map(|player| player.position)?;

        let spawn_at = offset_above(player_position, RESPAWN_SPAWN_Y_OFFSET);
        match world.spawn_entity(definition.avatar_archetype, spawn_at) {
            Ok(avatar_id) => {
                self.avatar_owners.remove(&old_avatar_id);
                self.attach_avatar(world, player_id, avatar_id);
                if let Some(record) = self.active.get_mut(&player_id) {
                    record.avatar_id = avatar_id;
                }
                self.persist(
                    world,
                    player_id,
                    PROP_AVATAR_ID,
                    Some(&avatar_id.0.to_string()),
                );
                info!(
                    player = player_id.0,
                    avatar = avatar_id.0,
                    "avatar_respawned"
                );
                Some(avatar_id)
            }
            Err(error) => {
                warn!(player = player_id.0, error = %error, "avatar_respawn_failed");
                None
            }
        }
    }

    pub(crate) fn on_avatar_destroyed(&mut self, world: &mut HostWorld, avatar_id: EntityId) {
        let Some(owner_id) = self.avatar_owner(avatar_id) else {
            return;
        };
        if world.find_player(owner_id).is_some() {
            self.remove_morph(world, owner_id, RemovalReason::AvatarDied);
        }
    }

    pub(crate) fn on_player_disconnect(&mut self, world: &mut HostWorld, player_id: PlayerId) {
        if !self.active.contains_key(&player_id) {
            return;
        }
        if world.find_player(player_id).is_some() {
            self.remove_morph(world, player_id, RemovalReason::PlayerLeft);
            return;
        }
        // Player object is gone; effect and property calls on it are
        // useless, so only the avatar and bookkeeping go.
        if let Some(record) = self.active.remove(&player_id) {
            self.destroy_avatar(world, record.avatar_id);
            debug!(player = player_id.0, "morph_dropped_after_disconnect");
        }
    }

    fn attach_avatar(&mut self, world: &mut HostWorld, player_id: PlayerId, avatar_id: EntityId) {
        if let Some(avatar) = world.find_entity_mut(avatar_id) {
            avatar.tags.push(AVATAR_TAG.to_string());
            avatar.rider = Some(player_id);
        }
        self.avatar_owners.insert(avatar_id, player_id);
    }

    /// Kill first so death visuals fire; fall back to plain removal; a
    /// failure of both never blocks player-side teardown.
    fn destroy_avatar(&mut self, world: &mut HostWorld, avatar_id: EntityId) {
        self.avatar_owners.remove(&avatar_id);
        if let Err(kill_error) = world.kill_entity(avatar_id) {
            if let Err(remove_error) = world.remove_entity(avatar_id) {
                debug!(
                    avatar = avatar_id.0,
                    kill = %kill_error,
                    remove = %remove_error,
                    "avatar_cleanup_skipped"
                );
            }
        }
    }

    fn persist_record(&self, world: &mut HostWorld, player_id: PlayerId, record: &MorphRecord) {
        self.persist(world, player_id, PROP_MORPH_ID, Some(record.ability.as_str()));
        self.persist(
            world,
            player_id,
            PROP_AVATAR_ID,
            Some(&record.avatar_id.0.to_string()),
        );
        self.persist(world, player_id, PROP_STATE, Some(&encode_state(&record.state)));
    }

    fn clear_persisted(&self, world: &mut HostWorld, player_id: PlayerId) {
        self.persist(world, player_id, PROP_MORPH_ID, None);
        self.persist(world, player_id, PROP_AVATAR_ID, None);
        self.persist(world, player_id, PROP_STATE, None);
    }

    fn persist(
        &self,
        world: &mut HostWorld,
        player_id: PlayerId,
        name: &str,
        value: Option<&str>,
    ) {
        if let Err(error) = world.properties_mut().set(player_id, name, value) {
            warn!(player = player_id.0, property = name, error = %error, "property_write_failed");
        }
    }
}

fn offset_above(position: Vec3, y_offset: f32) -> Vec3 {
    Vec3 {
        x: position.x,
        y: position.y + y_offset,
        z: position.z,
    }
}
