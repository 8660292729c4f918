use crate::domain::geometry::{Aabb, Vec2};
use crate::domain::level::LevelObject;
use crate::domain::state::SessionState;
use tracing::debug;

pub const PLAYER_WIDTH: f64 = 24.0;
pub const PLAYER_HEIGHT: f64 = 32.0;

pub fn player_box(position: Vec2) -> Aabb {
    Aabb::new(position.x, position.y, PLAYER_WIDTH, PLAYER_HEIGHT)
}

// Resolves the tentative position against every object, in level order.
//
// The player box is built once from `target` before the loop and is not rebuilt
// after a correction, so later objects are tested against the uncorrected box and
// a later push-out on the same axis overwrites an earlier one.
//
// Returns the collectibles touched this tick that were not collected before.
pub fn resolve_collisions<'a>(
    s: &mut SessionState,
    target: &mut Vec2,
    objects: &'a [LevelObject],
) -> Vec<&'a LevelObject> {
    let player = player_box(*target);
    let mut touched = Vec::new();

    s.on_ground = false;

    for obj in objects {
        let obj_box = obj.aabb();
        if !player.intersects(&obj_box) {
            continue;
        }

        if obj.is_collectible && !s.collected_object_ids.contains(&obj.id) {
            touched.push(obj);
        } else if obj.is_solid {
            let (overlap_x, overlap_y) = player.overlap(&obj_box);

            if overlap_x < overlap_y {
                // Side hit: push out against the direction of travel.
                target.x = if s.velocity.x > 0.0 {
                    obj_box.x - PLAYER_WIDTH
                } else {
                    obj_box.right()
                };
                s.velocity.x = 0.0;
            } else if s.velocity.y > 0.0 {
                // Landing on top.
                target.y = obj_box.y - PLAYER_HEIGHT;
                s.velocity.y = 0.0;
                s.on_ground = true;
            } else {
                // Head bump from below.
                target.y = obj_box.bottom();
                s.velocity.y = 0.0;
            }
        }
    }

    touched
}

// Credits each collectible at most once per session.
pub fn apply_collected(s: &mut SessionState, touched: &[&LevelObject]) {
    for obj in touched {
        if s.collected_object_ids.insert(obj.id) {
            s.coins_collected = s.coins_collected.saturating_add(1);
            s.score = s.score.saturating_add(obj.points_value);
            debug!(object_id = obj.id, score = s.score, "object collected");
        }
    }
}
