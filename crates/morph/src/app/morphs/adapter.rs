/// One driver step: translate queued host events into coordinator calls,
/// settle deferred menu responses, run the tick pass, then let host-side
/// timers advance. Events only ever interleave with ticks at this
/// boundary.
pub(crate) fn pump(coordinator: &mut MorphCoordinator, world: &mut HostWorld) {
    for event in world.drain_events() {
        match event {
            HostEvent::WorldReady => coordinator.register_properties(world),
            HostEvent::ItemUsed { player_id, item } => {
                if item == MENU_ITEM {
                    open_morph_menu(world, player_id);
                }
            }
            HostEvent::PlayerLeft { player_id } => {
                coordinator.on_player_disconnect(world, player_id);
            }
            HostEvent::PlayerSpawned { player_id } => {
                coordinator.remove_morph(world, player_id, RemovalReason::Respawn);
            }
            HostEvent::EntityDied { entity_id } => {
                coordinator.on_avatar_destroyed(world, entity_id);
            }
            HostEvent::PlayerMeleeHit { player_id, target } => {
                if let Some(record) = coordinator.active_record(player_id) {
                    ability_handler(record.ability).on_entity_hit(world, player_id, target);
                }
            }
        }
    }

    for resolved in world.drain_prompt_responses() {
        handle_menu_response(coordinator, world, resolved.player_id, resolved.response);
    }

    coordinator.tick_all(world);
    world.advance_tick();
}

fn open_morph_menu(world: &mut HostWorld, player_id: PlayerId) {
    let entries = MORPH_CATALOG
        .iter()
        .map(|definition| PromptEntry {
            title: definition.display_name.to_string(),
            body: definition.description.to_string(),
        })
        .collect();
    if let Err(error) = world.open_prompt(player_id, entries) {
        warn!(player = player_id.0, error = %error, "morph_menu_failed");
    }
}

/// The prompt resolved on a later step than it opened, so nothing about
/// the world is assumed to still hold: the player must be connected and
/// the index must still name a catalog entry.
fn handle_menu_response(
    coordinator: &mut MorphCoordinator,
    world: &mut HostWorld,
    player_id: PlayerId,
    response: PromptResponse,
) {
    let PromptResponse::Selected(index) = response else {
        return;
    };
    let Some(definition) = MORPH_CATALOG.get(index) else {
        return;
    };
    if world.find_player(player_id).is_none() {
        debug!(player = player_id.0, "menu_response_after_disconnect");
        return;
    }
    coordinator.apply_morph(world, player_id, definition);
}
