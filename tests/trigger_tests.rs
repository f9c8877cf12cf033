//! Trigger system integration tests.
//!
//! These drive the handler the way a game does: create cards, declare
//! triggers, rebuild the active set, raise events and inspect the stack.

use ccg_triggers::cards::{CardInstance, CardType};
use ccg_triggers::core::{phases, zones, EntityId, GameConfig, GameState, PlayerId, TriggerError, ZoneId};
use ccg_triggers::rules::{AcceptAll, Collaborators, RecordingExecutor};
use ccg_triggers::stack::resolve_all;
use ccg_triggers::triggers::{Ability, BoundAbility, EventValue, GameEvent, RunParam, TriggerHandler, TriggerId, TriggerMode};

fn creature(state: &mut GameState, name: &str, owner: u8, zone: ZoneId) -> EntityId {
    let id = state.alloc_entity();
    state.add_card(
        CardInstance::new(id, name, PlayerId::new(owner), zone)
            .with_type(CardType::Creature)
            .with_svar("TrigDraw", "DB$ Draw | Defined$ You | NumCards$ 1")
            .with_svar("TrigGain", "DB$ GainLife | Defined$ You | LifeAmount$ 1"),
    );
    id
}

/// Raise with a recording executor and an accept-everything decider.
fn raise(handler: &mut TriggerHandler, state: &mut GameState, event: GameEvent) -> Vec<BoundAbility> {
    let mut executor = RecordingExecutor::new();
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);
    handler.raise(state, &mut collab, event, false);
    executor.log
}

fn stacked(state: &GameState) -> Vec<TriggerId> {
    state.stack.entries().iter().map(|e| e.ability.trigger_id).collect()
}

/// Suppressing a mode drops its events entirely; clearing it restores them.
#[test]
fn test_suppress_then_clear() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Warden", 0, zones::BATTLEFIELD);
    handler
        .create_trigger(&mut state, host, "Mode$ Drawn | Static$ True | Execute$ TrigGain")
        .unwrap();
    handler.rebuild_active_set(&state);

    handler.suppress(TriggerMode::Drawn);
    let ran = raise(&mut handler, &mut state, GameEvent::drawn(host, PlayerId::new(0), 1));
    assert!(ran.is_empty(), "suppressed mode must not fire");

    handler.clear_suppression(TriggerMode::Drawn);
    let ran = raise(&mut handler, &mut state, GameEvent::drawn(host, PlayerId::new(0), 1));
    assert_eq!(ran.len(), 1);
}

/// ActivationLimit$ 1: fires, is skipped for the rest of the turn, fires
/// again after the turn reset.
#[test]
fn test_activation_limit_across_turns() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Seer", 0, zones::BATTLEFIELD);
    let id = handler
        .create_trigger(&mut state, host, "Mode$ Drawn | ValidPlayer$ You | ActivationLimit$ 1 | Execute$ TrigGain")
        .unwrap();
    handler.rebuild_active_set(&state);

    let draw = || GameEvent::drawn(host, PlayerId::new(0), 1);
    raise(&mut handler, &mut state, draw());
    raise(&mut handler, &mut state, draw());
    assert_eq!(stacked(&state), vec![id]);

    handler.reset_turn_activation_counters();
    raise(&mut handler, &mut state, draw());
    assert_eq!(stacked(&state), vec![id, id]);
}

/// A delayed trigger fires on its first match and is gone for the next.
#[test]
fn test_delayed_single_fire() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Phantom", 1, zones::BATTLEFIELD);
    let ability = Ability::parse("DB$ ChangeZone | Defined$ Self | Destination$ Hand", host).unwrap();

    let trigger = handler
        .delayed_trigger(
            state.config(),
            host,
            PlayerId::new(1),
            "Mode$ Phase | Phase$ EndOfTurn | TriggerDescription$ Return it at the beginning of the next end step.",
            Some(ability),
        )
        .unwrap();
    let id = handler.register_delayed(trigger);
    assert!(handler.delayed().contains(id));

    raise(&mut handler, &mut state, GameEvent::phase(phases::END_OF_TURN, PlayerId::new(0)));
    assert_eq!(stacked(&state), vec![id]);
    let entry = state.stack.peek_top().unwrap();
    assert_eq!(entry.controller, PlayerId::new(1));
    assert_eq!(entry.ability.ability.api, "ChangeZone");

    raise(&mut handler, &mut state, GameEvent::phase(phases::END_OF_TURN, PlayerId::new(1)));
    assert_eq!(state.stack.len(), 1);
    assert!(handler.delayed().is_empty());
}

/// A static trigger's effect is visible before any normal trigger is bound.
#[test]
fn test_static_before_normal() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Chronicler", 0, zones::BATTLEFIELD);
    state
        .card_mut(host)
        .unwrap()
        .svars
        .insert("TrigMark".into(), "DB$ StoreSVar | Value$ 1".into());

    // Declared before the static trigger.
    handler
        .create_trigger(&mut state, host, "Mode$ Drawn | IsPresent$ Creature.YouCtrl | Execute$ TrigDraw")
        .unwrap();
    handler
        .create_trigger(&mut state, host, "Mode$ Drawn | Static$ True | Execute$ TrigMark")
        .unwrap();
    handler.rebuild_active_set(&state);

    let mut order = Vec::new();
    let mut executor = |s: &mut GameState, b: &BoundAbility| -> Result<(), TriggerError> {
        order.push((b.ability.api.clone(), s.stack.len()));
        Ok(())
    };
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);
    handler.raise(&mut state, &mut collab, GameEvent::drawn(host, PlayerId::new(0), 1), false);
    drop(collab);

    assert_eq!(order, vec![("StoreSVar".to_string(), 0)]);
    assert_eq!(state.stack.len(), 1);
    assert_eq!(state.stack.peek_top().unwrap().ability.ability.api, "Draw");
}

/// Dies triggers see the whole board wipe when the moves are held.
#[test]
fn test_hold_and_drain_batches_zone_changes() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let bears: Vec<EntityId> = (0..3)
        .map(|i| creature(&mut state, &format!("Bear {}", i), 0, zones::BATTLEFIELD))
        .collect();
    let altar = state.create_card("Altar", PlayerId::new(1), zones::BATTLEFIELD);
    state
        .card_mut(altar)
        .unwrap()
        .svars
        .insert("TrigScry".into(), "DB$ Scry | ScryNum$ 1".into());

    let per_card = handler
        .create_trigger(
            &mut state,
            altar,
            "Mode$ ChangesZone | Origin$ Battlefield | Destination$ Graveyard | ValidCard$ Creature | Execute$ TrigScry",
        )
        .unwrap();
    let batched = handler
        .create_trigger(
            &mut state,
            altar,
            "Mode$ ChangesZoneAll | Origin$ Battlefield | Destination$ Graveyard | ValidCards$ Creature | Execute$ TrigScry",
        )
        .unwrap();
    handler.rebuild_active_set(&state);

    let mut executor = RecordingExecutor::new();
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);

    state.stack.freeze();
    for &bear in &bears {
        let moved = state.move_card(bear, zones::GRAVEYARD).unwrap();
        handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), false);
    }
    assert!(state.stack.is_empty());
    assert_eq!(handler.waiting_len(), 3);

    handler.rebuild_active_set(&state);
    handler.unfreeze_stack(&mut state, &mut collab);

    assert_eq!(stacked(&state), vec![per_card, per_card, per_card, batched]);
    let objects = &state.stack.peek_top().unwrap().ability.triggered_objects;
    assert_eq!(objects.get(&RunParam::Cards), Some(&EventValue::Entities(bears.clone())));
    assert_eq!(objects.get(&RunParam::Amount), Some(&EventValue::Int(3)));
}

/// Immediate dispatch shows a batched trigger each event on its own.
#[test]
fn test_immediate_dispatch_sees_single_batches() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let bears: Vec<EntityId> = (0..2)
        .map(|i| creature(&mut state, &format!("Bear {}", i), 0, zones::BATTLEFIELD))
        .collect();
    let altar = creature(&mut state, "Altar", 1, zones::BATTLEFIELD);
    let batched = handler
        .create_trigger(
            &mut state,
            altar,
            "Mode$ ChangesZoneAll | Destination$ Graveyard | ValidCards$ Creature | Execute$ TrigDraw",
        )
        .unwrap();
    handler.rebuild_active_set(&state);

    for &bear in &bears {
        let moved = state.move_card(bear, zones::GRAVEYARD).unwrap();
        raise(&mut handler, &mut state, GameEvent::zone_change(moved));
    }

    assert_eq!(stacked(&state), vec![batched, batched]);
    for (entry, bear) in state.stack.entries().iter().zip(&bears) {
        assert_eq!(
            entry.ability.triggered_objects.get(&RunParam::Cards),
            Some(&EventValue::Entities(vec![*bear]))
        );
    }
}

/// The dispatch result asks for a statics recheck when something entered
/// the battlefield or fired.
#[test]
fn test_check_statics_result() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let bear = creature(&mut state, "Bear", 0, zones::HAND);
    let mut executor = RecordingExecutor::new();
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);

    let moved = state.move_card(bear, zones::BATTLEFIELD).unwrap();
    assert!(handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), false));

    let moved = state.move_card(bear, zones::GRAVEYARD).unwrap();
    assert!(!handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), false));

    assert!(!handler.raise(&mut state, &mut collab, GameEvent::life_gained(PlayerId::new(0), 2), false));
}

/// A delayed trigger firing on its own also asks for a statics recheck.
#[test]
fn test_delayed_firing_asks_for_recheck() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Phantom", 0, zones::BATTLEFIELD);
    let trigger = handler
        .delayed_trigger(state.config(), host, PlayerId::new(0), "Mode$ Phase | Phase$ EndOfTurn | Execute$ TrigGain", None)
        .unwrap();
    let id = handler.register_delayed(trigger);

    let mut executor = RecordingExecutor::new();
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);
    let recheck = handler.raise(&mut state, &mut collab, GameEvent::phase(phases::END_OF_TURN, PlayerId::new(0)), false);

    assert!(recheck);
    assert_eq!(stacked(&state), vec![id]);
}

/// Suppressing per-card zone changes leaves the batched mode live, both
/// for immediate events and for a held batch.
#[test]
fn test_suppressed_zone_change_keeps_batch_trigger() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let watcher = creature(&mut state, "Undertaker", 0, zones::BATTLEFIELD);
    handler
        .create_trigger(
            &mut state,
            watcher,
            "Mode$ ChangesZone | Origin$ Battlefield | Destination$ Graveyard | ValidCard$ Creature | Execute$ TrigDraw",
        )
        .unwrap();
    let all = handler
        .create_trigger(
            &mut state,
            watcher,
            "Mode$ ChangesZoneAll | Origin$ Battlefield | Destination$ Graveyard | Execute$ TrigGain",
        )
        .unwrap();
    let bears: Vec<EntityId> = (0..3)
        .map(|i| creature(&mut state, &format!("Bear {}", i), 1, zones::BATTLEFIELD))
        .collect();
    handler.rebuild_active_set(&state);
    handler.suppress(TriggerMode::ChangesZone);

    let moved = state.move_card(bears[0], zones::GRAVEYARD).unwrap();
    raise(&mut handler, &mut state, GameEvent::zone_change(moved));
    assert_eq!(stacked(&state), vec![all]);

    let mut executor = RecordingExecutor::new();
    let mut decider = AcceptAll;
    let mut collab = Collaborators::new(&mut executor, &mut decider);
    for &bear in &bears[1..] {
        let moved = state.move_card(bear, zones::GRAVEYARD).unwrap();
        handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), true);
    }
    assert_eq!(handler.waiting_len(), 2);
    handler.drain_waiting(&mut state, &mut collab);
    assert_eq!(stacked(&state), vec![all, all]);

    let top = state.stack.peek_top().unwrap();
    assert_eq!(
        top.ability.triggered_objects.get(&RunParam::Cards),
        Some(&EventValue::Entities(bears[1..].to_vec()))
    );
}

/// Suppressing a mode also silences triggers of that mode that listen to
/// related events.
#[test]
fn test_suppressing_cast_mode_covers_spell_events() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Prodigy", 0, zones::BATTLEFIELD);
    let spell = creature(&mut state, "Bolt", 0, zones::STACK);
    let id = handler
        .create_trigger(&mut state, host, "Mode$ SpellAbilityCast | ValidActivatingPlayer$ You | Execute$ TrigGain")
        .unwrap();
    handler.rebuild_active_set(&state);

    handler.suppress(TriggerMode::SpellAbilityCast);
    raise(&mut handler, &mut state, GameEvent::spell_cast(spell, PlayerId::new(0)));
    assert!(state.stack.is_empty());

    handler.clear_suppression(TriggerMode::SpellAbilityCast);
    raise(&mut handler, &mut state, GameEvent::spell_cast(spell, PlayerId::new(0)));
    assert_eq!(stacked(&state), vec![id]);
}

/// Requirements gate on global state, not the event.
#[test]
fn test_most_life_requirement() {
    let mut state = GameState::new(GameConfig::standard(3));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Champion", 2, zones::BATTLEFIELD);
    handler
        .create_trigger(&mut state, host, "Mode$ TurnBegin | ValidPlayer$ You | MostLife$ True | Execute$ TrigGain")
        .unwrap();
    handler.rebuild_active_set(&state);

    raise(&mut handler, &mut state, GameEvent::turn_begin(PlayerId::new(2)));
    assert!(state.stack.is_empty(), "tied life is not the most");

    state.set_life(PlayerId::new(2), 25);
    raise(&mut handler, &mut state, GameEvent::turn_begin(PlayerId::new(2)));
    assert_eq!(state.stack.len(), 1);
}

/// Optional triggers ask their decider at resolution.
#[test]
fn test_optional_decider_is_opponent() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Bargainer", 0, zones::BATTLEFIELD);
    handler
        .create_trigger(&mut state, host, "Mode$ Drawn | OptionalDecider$ Opponent | Execute$ TrigDraw")
        .unwrap();
    handler.rebuild_active_set(&state);

    raise(&mut handler, &mut state, GameEvent::drawn(host, PlayerId::new(0), 1));
    let ability = &state.stack.peek_top().unwrap().ability;
    assert!(ability.optional);
    assert_eq!(ability.decider, Some(PlayerId::new(1)));
    assert_eq!(ability.activator, PlayerId::new(0));

    struct OnlyPlayerOne(Vec<PlayerId>);
    impl ccg_triggers::rules::DecisionMaker for OnlyPlayerOne {
        fn confirm_optional(&mut self, _: &GameState, player: PlayerId, _: &BoundAbility) -> bool {
            self.0.push(player);
            false
        }
    }

    let mut executor = RecordingExecutor::new();
    let mut decider = OnlyPlayerOne(Vec::new());
    let mut collab = Collaborators::new(&mut executor, &mut decider);
    resolve_all(&mut state, &mut collab);
    drop(collab);
    assert_eq!(decider.0, vec![PlayerId::new(1)]);
    assert!(executor.log.is_empty());
}

/// TriggerController$ hands the ability to the player in the event.
#[test]
fn test_trigger_controller_override() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Tithe", 0, zones::BATTLEFIELD);
    handler
        .create_trigger(
            &mut state,
            host,
            "Mode$ Drawn | ValidPlayer$ Opponent | TriggerController$ TriggeredPlayer | Execute$ TrigGain",
        )
        .unwrap();
    handler.rebuild_active_set(&state);

    raise(&mut handler, &mut state, GameEvent::drawn(host, PlayerId::new(1), 1));
    let entry = state.stack.peek_top().unwrap();
    assert_eq!(entry.controller, PlayerId::new(1));
}

/// SubAbility$ chains are resolved at fire time.
#[test]
fn test_execute_follows_sub_abilities() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = state.alloc_entity();
    state.add_card(
        CardInstance::new(host, "Scholar", PlayerId::new(0), zones::BATTLEFIELD)
            .with_svar("TrigDraw", "DB$ Draw | NumCards$ 2 | SubAbility$ DBDiscard")
            .with_svar("DBDiscard", "DB$ Discard | NumCards$ 1 | Mode$ TgtChoose"),
    );
    handler
        .create_trigger(&mut state, host, "Mode$ Phase | Phase$ Upkeep | ValidPlayer$ You | Execute$ TrigDraw")
        .unwrap();
    handler.rebuild_active_set(&state);

    raise(&mut handler, &mut state, GameEvent::phase(phases::UPKEEP, PlayerId::new(0)));
    let ability = &state.stack.peek_top().unwrap().ability.ability;
    assert_eq!(ability.chain_len(), 2);
    assert_eq!(ability.sub.as_ref().unwrap().api, "Discard");
}

/// Unknown names in a declaration are authoring errors at creation.
#[test]
fn test_authoring_errors() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Typo", 0, zones::BATTLEFIELD);

    let bad = [
        "Mode$ Explodes | Execute$ TrigDraw",
        "Mode$ ChangesZone | Destination$ Narnia | Execute$ TrigDraw",
        "Mode$ Phase | Execute$ TrigDraw",
        "Mode$ Drawn | ActivationLimit$ often | Execute$ TrigDraw",
        "Mode$ Drawn",
        "Mode$ Drawn Execute TrigDraw",
    ];
    for decl in bad {
        let err = handler.create_trigger(&mut state, host, decl).unwrap_err();
        assert!(err.is_authoring(), "{decl}: {err}");
    }
    assert!(state.card(host).unwrap().triggers.is_empty());
}

/// Player-held delayed triggers wait for their player's release.
#[test]
fn test_player_delayed_release() {
    let mut state = GameState::new(GameConfig::standard(2));
    let mut handler = TriggerHandler::new();
    let host = creature(&mut state, "Hourglass", 1, zones::BATTLEFIELD);
    let trigger = handler
        .delayed_trigger(state.config(), host, PlayerId::new(1), "Mode$ TurnBegin | Execute$ TrigDraw", None)
        .unwrap();
    let id = handler.register_player_delayed(PlayerId::new(1), trigger);

    raise(&mut handler, &mut state, GameEvent::turn_begin(PlayerId::new(0)));
    assert!(state.stack.is_empty());

    handler.release_player_delayed(PlayerId::new(1));
    raise(&mut handler, &mut state, GameEvent::turn_begin(PlayerId::new(1)));
    assert_eq!(stacked(&state), vec![id]);
}
