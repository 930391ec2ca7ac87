//! Per-tick simulation
//!
//! The movement pass rebuilds the grid, then lets each actor fall unless a
//! colliding neighbour is level with or below it. Spawning places new actors
//! above the field without overlapping anyone; pointer presses squash every
//! actor under the pointer.

use rand::Rng;

use super::actor::ActorId;
use super::grid::CollisionManager;
use super::shape::{OrientedRect, Point};
use super::state::{ArenaEvent, ArenaState};
use crate::consts::MAX_CATCHUP_SPAWNS;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer press position in field coordinates
    pub pointer: Option<Point>,
}

/// Advance the arena by `dt` seconds.
///
/// A `dt` that is negative or not finite is ignored. After a long stall at
/// most [`MAX_CATCHUP_SPAWNS`] overdue spawns happen and the rest is dropped.
pub fn tick(state: &mut ArenaState, input: &TickInput, dt: f32) {
    if !(dt.is_finite() && dt >= 0.0) {
        log::warn!("Ignoring tick with dt = {}", dt);
        return;
    }
    state.time_ticks += 1;

    if let Some(p) = input.pointer {
        hit_test(state, p.x, p.y);
    }

    state.spawn_timer += dt;
    let interval = state.settings.spawn_interval;
    let mut spawns = 0;
    while state.spawn_timer >= interval && spawns < MAX_CATCHUP_SPAWNS {
        state.spawn_timer -= interval;
        spawn(state);
        spawns += 1;
    }
    state.spawn_timer = state.spawn_timer.min(interval);

    move_actors(state, dt);
}

/// Movement pass.
///
/// An actor is blocked for this tick when any actor it collides with has a
/// top edge at or below its own (it would overtake it). Unblocked actors fall
/// by `speed * dt` (at least `min_step`) and pick up their swing rotation.
/// Actors whose center drops below the field are returned to the pool.
pub fn move_actors(state: &mut ArenaState, dt: f32) {
    state.rebuild_grid();

    let min_step = state.settings.min_step;
    let exit_y = state.field_bounds().y_min;
    let ids: Vec<ActorId> = state.active.keys().copied().collect();

    for id in ids {
        let Some(bug) = state.active.get(&id) else {
            continue;
        };
        let top = bug.top();
        let blocked = state
            .grid
            .iter_colliding(id, &state.active)
            .filter_map(|other| state.active.get(&other))
            .any(|other| top >= other.top());

        let Some(bug) = state.active.get_mut(&id) else {
            continue;
        };
        bug.advance_swing(dt);
        if blocked {
            continue;
        }

        let dy = bug.step(dt, min_step);
        bug.move_by(0.0, -dy);

        if bug.center().y < exit_y {
            state.deactivate(id);
            state.events.push(ArenaEvent::Escaped { id });
            log::debug!("Actor {} escaped", id);
        }
    }
}

/// True if `candidate` collides with any active actor.
///
/// Checks shapes directly, so the candidate need not be in the grid.
pub fn spawn_check(state: &ArenaState, candidate: &OrientedRect) -> bool {
    state
        .active
        .values()
        .any(|bug| state.grid.they_collide(candidate, bug.shape()))
}

/// Activate one actor at a random spot above the field.
///
/// Takes a random pooled actor (or creates one if the pool is empty) and
/// tries up to `spawn_attempts` positions. If every position collides the
/// actor goes back to the pool and `None` is returned.
pub fn spawn(state: &mut ArenaState) -> Option<ActorId> {
    let mut bug = if state.pool.is_empty() {
        match state.new_bug() {
            Ok(bug) => bug,
            Err(e) => {
                log::warn!("Could not create actor: {}", e);
                return None;
            }
        }
    } else {
        let pooled = state.pool.len();
        let index = state.rng().random_range(0..pooled);
        state.pool.swap_remove(index)
    };
    bug.reset_swing();

    let field = state.field_bounds();
    let half_width = bug.bounds().width() / 2.0;
    let half_height = bug.bounds().height() / 2.0;
    let (x_lo, x_hi) = (field.x_min + half_width, field.x_max - half_width);
    let y = field.y_max + half_height;

    for _ in 0..state.settings.spawn_attempts {
        let x = if x_lo < x_hi {
            state.rng().random_range(x_lo..=x_hi)
        } else {
            (field.x_min + field.x_max) / 2.0
        };
        bug.place_at(Point::new(x, y));

        if !spawn_check(state, bug.shape()) {
            let id = bug.id;
            state.activate(bug);
            return Some(id);
        }
    }

    log::debug!(
        "Spawn of actor {} rejected after {} attempts",
        bug.id,
        state.settings.spawn_attempts
    );
    state.pool.push(bug);
    None
}

/// Squash every active actor whose shape strictly contains `(x, y)`.
///
/// Returns the squashed IDs; they are already back in the pool.
pub fn hit_test(state: &mut ArenaState, x: f32, y: f32) -> Vec<ActorId> {
    state.rebuild_grid();

    let hits: Vec<ActorId> = state
        .grid
        .objs_touching_point(x, y, &state.active)
        .collect();

    for &id in &hits {
        if state.deactivate(id).is_some() {
            state.events.push(ArenaEvent::Squashed {
                id,
                at: Point::new(x, y),
            });
            log::debug!("Actor {} squashed at ({}, {})", id, x, y);
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::ArenaSettings;

    fn settings() -> ArenaSettings {
        ArenaSettings {
            field_width: 400.0,
            field_height: 300.0,
            cell_width: 50.0,
            cell_height: 50.0,
            pool_size: 6,
            actor_half_width: 10.0,
            actor_half_height: 10.0,
            min_duration: 3.0,
            max_duration: 3.0,
            spawn_interval: 1.0,
            ..Default::default()
        }
    }

    /// Take a pooled actor, put it at (x, y) unrotated and activate it
    fn place(state: &mut ArenaState, x: f32, y: f32) -> ActorId {
        let mut bug = state.pool.pop().unwrap();
        bug.reset_swing();
        bug.advance_swing(0.5);
        bug.move_by(0.0, 0.0);
        bug.place_at(Point::new(x, y));
        let id = bug.id;
        state.activate(bug);
        id
    }

    #[test]
    fn test_free_actor_falls() {
        let mut state = ArenaState::new(settings()).unwrap();
        let id = place(&mut state, 100.0, 200.0);

        move_actors(&mut state, 0.1);
        // speed = (300 + 20) / 3
        let expected = 200.0 - (320.0 / 3.0) * 0.1;
        assert!((state.active[&id].center().y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_min_step_floor() {
        let mut state = ArenaState::new(settings()).unwrap();
        let id = place(&mut state, 100.0, 200.0);

        move_actors(&mut state, 0.0);
        assert!((state.active[&id].center().y - 199.8).abs() < 1e-4);
    }

    #[test]
    fn test_follower_is_blocked_leader_moves() {
        let mut state = ArenaState::new(settings()).unwrap();
        let leader = place(&mut state, 100.0, 200.0);
        let follower = place(&mut state, 105.0, 210.0);

        move_actors(&mut state, SIM_DT);

        // The follower sits above the leader and may not overtake it
        assert_eq!(state.active[&follower].center(), Point::new(105.0, 210.0));
        assert!(state.active[&leader].center().y < 200.0);
    }

    #[test]
    fn test_escaped_actor_returns_to_pool() {
        let mut state = ArenaState::new(settings()).unwrap();
        let id = place(&mut state, 100.0, 0.1);
        state.drain_events();

        move_actors(&mut state, SIM_DT);

        assert!(!state.active.contains_key(&id));
        assert!(!state.grid.knows(id));
        assert_eq!(state.pooled_count(), 6);
        assert_eq!(state.drain_events(), vec![ArenaEvent::Escaped { id }]);
    }

    #[test]
    fn test_hit_test_squashes_overlapping_actors() {
        let mut state = ArenaState::new(settings()).unwrap();
        let a = place(&mut state, 100.0, 100.0);
        let b = place(&mut state, 108.0, 108.0);
        let c = place(&mut state, 300.0, 100.0);
        state.drain_events();

        let mut hits = hit_test(&mut state, 104.0, 104.0);
        hits.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(hits, expected);
        assert_eq!(state.active.keys().copied().collect::<Vec<_>>(), vec![c]);
        assert_eq!(state.drain_events().len(), 2);

        // Nothing under the pointer
        assert!(hit_test(&mut state, 10.0, 10.0).is_empty());
        // Boundary of c is not a hit
        assert!(hit_test(&mut state, 290.0, 100.0).is_empty());
    }

    #[test]
    fn test_spawn_places_actor_above_field() {
        let mut state = ArenaState::new(settings()).unwrap();
        let id = spawn(&mut state).unwrap();

        let bug = &state.active[&id];
        let bounds = bug.bounds();
        assert!(bounds.y_min >= 300.0 - 1e-3);
        assert!(bounds.x_min >= -1e-3 && bounds.x_max <= 400.0 + 1e-3);
        assert_eq!(state.pooled_count(), 5);
        assert!(state.grid.knows(id));
    }

    #[test]
    fn test_spawn_check() {
        let mut state = ArenaState::new(settings()).unwrap();
        place(&mut state, 100.0, 100.0);

        let near = OrientedRect::axis_aligned(Point::new(105.0, 105.0), 10.0, 10.0).unwrap();
        let far = OrientedRect::axis_aligned(Point::new(200.0, 100.0), 10.0, 10.0).unwrap();
        assert!(spawn_check(&state, &near));
        assert!(!spawn_check(&state, &far));
    }

    #[test]
    fn test_spawn_rejected_when_no_room() {
        // Field exactly one actor wide: every attempt lands on the same spot
        let mut state = ArenaState::new(ArenaSettings {
            field_width: 10.0,
            ..settings()
        })
        .unwrap();

        assert!(spawn(&mut state).is_some());
        assert!(spawn(&mut state).is_none());
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.pooled_count(), 5);
    }

    #[test]
    fn test_spawn_grows_past_empty_pool() {
        let mut state = ArenaState::new(ArenaSettings {
            pool_size: 0,
            field_width: 4000.0,
            ..settings()
        })
        .unwrap();

        let id = spawn(&mut state).unwrap();
        assert_eq!(id, 1);
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_tick_spawns_on_interval() {
        let mut state = ArenaState::new(settings()).unwrap();
        let input = TickInput::default();

        tick(&mut state, &input, 0.6);
        assert_eq!(state.active_count(), 0);
        tick(&mut state, &input, 0.6);
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_long_stall_spawns_bounded() {
        let mut state = ArenaState::new(ArenaSettings {
            pool_size: 0,
            field_width: 4000.0,
            spawn_interval: 0.001,
            ..settings()
        })
        .unwrap();

        tick(&mut state, &TickInput::default(), 1.0e8);

        assert_eq!(state.time_ticks, 1);
        assert!(state.spawn_timer <= 0.001);
        let created = state.active_count() + state.pooled_count();
        assert!(created >= 1 && created <= MAX_CATCHUP_SPAWNS as usize);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut state = ArenaState::new(settings()).unwrap();
        let input = TickInput::default();

        tick(&mut state, &input, f32::NAN);
        tick(&mut state, &input, f32::INFINITY);
        tick(&mut state, &input, -1.0);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.spawn_timer, 0.0);

        // Spawning still works afterwards
        for _ in 0..90 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.spawn_timer.is_finite());
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_tick_pointer_press() {
        let mut state = ArenaState::new(settings()).unwrap();
        let id = place(&mut state, 200.0, 150.0);

        let input = TickInput {
            pointer: Some(Point::new(200.0, 150.0)),
        };
        tick(&mut state, &input, SIM_DT);

        assert!(!state.active.contains_key(&id));
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, ArenaEvent::Squashed { id: squashed, .. } if *squashed == id)));
    }

    #[test]
    fn test_actors_eventually_cross_the_field() {
        let mut state = ArenaState::new(settings()).unwrap();
        let input = TickInput::default();
        let mut escaped = 0;

        // 10 seconds: several spawns, 3 second crossings
        for _ in 0..600 {
            tick(&mut state, &input, SIM_DT);
            escaped += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, ArenaEvent::Escaped { .. }))
                .count();
        }

        assert!(escaped > 0);
        assert_eq!(state.active_count() + state.pooled_count(), 6);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = ArenaState::new(settings()).unwrap();
        let mut state2 = ArenaState::new(settings()).unwrap();
        let inputs = [
            TickInput::default(),
            TickInput {
                pointer: Some(Point::new(200.0, 250.0)),
            },
        ];

        for i in 0..300 {
            let input = &inputs[i % 2];
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        let centers1: Vec<_> = state1.active.values().map(|b| b.center()).collect();
        let centers2: Vec<_> = state2.active.values().map(|b| b.center()).collect();
        assert_eq!(centers1, centers2);
    }
}
