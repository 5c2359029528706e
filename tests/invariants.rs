//! Property tests over random input sequences

use city_hopper::consts::*;
use city_hopper::sim::interact::resolve_enemy_contact;
use city_hopper::sim::worldgen;
use city_hopper::sim::{
    DifficultyMode, Enemy, EnemyKind, GameEvent, GamePhase, GameState, TickInput, tick,
};
use proptest::prelude::*;

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::option::of(-0.5f32..1.5),
    )
        .prop_map(|(left, right, jump, crouch, analog_speed)| TickInput {
            left,
            right,
            jump,
            crouch,
            analog_speed,
            ..Default::default()
        })
}

/// Runs that cannot end, so the street is never reset mid-sequence
fn endless_run(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.mode = DifficultyMode::Easy;
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, SIM_DT);
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn player_stays_in_bounds(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..400),
    ) {
        let mut state = endless_run(seed);
        for input in &inputs {
            tick(&mut state, input, SIM_DT);
            let player = &state.player;
            prop_assert!((0.0..=1.0).contains(&player.stamina));
            prop_assert!(player.pos.x >= 0.0);
            prop_assert!(player.vel.y <= TERMINAL_VELOCITY);
            let expected = if player.crouching {
                PLAYER_CROUCH_HEIGHT
            } else {
                PLAYER_STAND_HEIGHT
            };
            prop_assert_eq!(player.size.y, expected);
        }
    }

    #[test]
    fn frontier_only_moves_forward(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..400),
    ) {
        let mut state = endless_run(seed);
        let mut frontier = state.frontier;
        for input in &inputs {
            tick(&mut state, input, SIM_DT);
            prop_assert_eq!(state.phase, GamePhase::Playing);
            prop_assert!(state.frontier >= frontier);
            frontier = state.frontier;
            // The street is frozen while inside a building
            if !state.is_inside() {
                prop_assert!(state.frontier >= state.camera.right() + GENERATION_BUFFER);
                prop_assert!(state.objects.windows(2).all(|w| w[0].pos.x <= w[1].pos.x));
                prop_assert!(!state.objects.iter().any(|o| o.is_spent()));
            }
        }
    }

    #[test]
    fn repeated_streaming_adds_nothing(seed in any::<u64>(), walk in 0usize..600) {
        let mut state = endless_run(seed);
        let right = TickInput { right: true, ..Default::default() };
        for _ in 0..walk {
            tick(&mut state, &right, SIM_DT);
        }
        if state.is_inside() {
            return Ok(());
        }
        let ids: Vec<u32> = state.objects.iter().map(|o| o.id).collect();
        let enemies = state.enemies.len();
        worldgen::stream(&mut state);
        worldgen::stream(&mut state);
        let again: Vec<u32> = state.objects.iter().map(|o| o.id).collect();
        prop_assert_eq!(ids, again);
        prop_assert_eq!(state.enemies.len(), enemies);
    }

    #[test]
    fn each_enemy_is_defeated_once(kind_index in 0usize..EnemyKind::ALL.len(), stomps in 1usize..8) {
        let mut state = endless_run(7);
        state.enemies.clear();
        state.objects.clear();
        let id = state.next_entity_id();
        state.enemies.push(Enemy::spawn(id, EnemyKind::ALL[kind_index], 900.0));

        let mut defeats = 0;
        for _ in 0..stomps {
            let top = state.enemies[0].pos;
            let player = &mut state.player;
            player.pos.x = top.x;
            player.pos.y = top.y - player.size.y + 4.0;
            player.prev_bottom = top.y;
            player.vel.y = 50.0;

            state.events.clear();
            resolve_enemy_contact(&mut state);
            defeats += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::DefeatEnemy { id: defeated, .. } if *defeated == id))
                .count();
        }

        let enemy = &state.enemies[0];
        let max_health = enemy.kind.max_health() as usize;
        prop_assert_eq!(defeats, usize::from(stomps >= max_health));
        prop_assert_eq!(enemy.dead, stomps >= max_health);
        prop_assert_eq!(state.counters.enemies_defeated as usize, defeats);
        prop_assert_eq!(state.phase, GamePhase::Playing);
    }
}
