/// Canonical text form of an ability state. Encoding failures and
/// over-bound output both degrade to the ability's empty state so a bad
/// value can never poison the persisted property.
fn encode_state(state: &AbilityState) -> String {
    match serde_json::to_string(state) {
        Ok(text) => clamp_encoded(state.ability(), text),
        Err(error) => {
            warn!(error = %error, "state_encode_failed");
            encode_default(state.ability())
        }
    }
}

fn clamp_encoded(ability: AbilityId, text: String) -> String {
    if text.len() > MAX_STATE_LENGTH {
        warn!(
            ability = ability.as_str(),
            len = text.len(),
            "state_encoding_over_bound"
        );
        return encode_default(ability);
    }
    text
}

fn encode_default(ability: AbilityId) -> String {
    serde_json::to_string(&AbilityState::default_for(ability))
        .unwrap_or_else(|_| String::from("{}"))
}

/// Lenient on purpose: blank, malformed, or wrong-ability input resets
/// the ability instead of failing the tick loop.
fn decode_state(ability: AbilityId, text: &str) -> AbilityState {
    if text.trim().is_empty() {
        return AbilityState::default_for(ability);
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    match serde_path_to_error::deserialize::<_, AbilityState>(&mut deserializer) {
        Ok(state) if state.ability() == ability => state,
        Ok(state) => {
            warn!(
                expected = ability.as_str(),
                found = state.ability().as_str(),
                "state_ability_mismatch"
            );
            AbilityState::default_for(ability)
        }
        Err(error) => {
            warn!(path = %error.path(), error = %error, "state_decode_failed");
            AbilityState::default_for(ability)
        }
    }
}
