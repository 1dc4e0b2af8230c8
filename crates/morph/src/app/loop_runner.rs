use std::process::ExitCode;

use tracing::{error, info, warn};
use worldhost::{HostEvent, HostWorld, PlayerId, PromptResponse, Vec3};

use super::bootstrap::AppWiring;
use super::morphs;

/// Scripted session: one player picks the creeper morph off the menu and
/// holds crouch until the charge detonates.
pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        mut world,
        mut coordinator,
        demo_ticks,
        save_path,
    } = app;

    let player_id = world.connect_player("wanderer", Vec3::default());

    for tick in 0..demo_ticks {
        script_step(tick, player_id, &mut world);
        morphs::pump(&mut coordinator, &mut world);
    }

    let explosions = world.drain_explosions();
    let sounds = world.drain_sounds();
    info!(
        ticks = demo_ticks,
        explosions = explosions.len(),
        sounds = sounds.len(),
        active_morphs = coordinator.active_count(),
        last_removal = coordinator
            .last_removal()
            .map(|(_, reason)| reason.as_str())
            .unwrap_or("none"),
        "demo_finished"
    );

    if let Some(path) = save_path {
        if let Err(error) = world.properties().save_to(&path) {
            warn!(error = %error, "property_save_failed");
        }
    }

    if explosions.is_empty() {
        error!("demo_expected_an_explosion");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn script_step(tick: u64, player_id: PlayerId, world: &mut HostWorld) {
    match tick {
        1 => world.push_event(HostEvent::ItemUsed {
            player_id,
            item: morphs::MENU_ITEM.to_string(),
        }),
        2 => {
            for prompt_id in world.open_prompt_ids() {
                world.resolve_prompt(prompt_id, PromptResponse::Selected(0));
            }
        }
        4 => {
            if let Some(player) = world.find_player_mut(player_id) {
                player.sneaking = true;
            }
        }
        _ => {}
    }
}
