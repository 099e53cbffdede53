//! Scene planning.

use reelgen_models::{PlannedSlot, SceneMode, ScenePlan, SlotRole};

/// Plan scene slots for a requested duration.
///
/// The count is `total_secs / unit_secs`, floored and raised to the mode's
/// minimum. A zero unit counts as no full units. In three-point mode the
/// character is on camera at positions 1, N/2 + 1 and N.
pub fn plan_scenes(total_secs: u32, unit_secs: u32, mode: SceneMode) -> ScenePlan {
    let full_units = total_secs.checked_div(unit_secs).unwrap_or(0);
    let count = full_units.max(mode.min_scenes());

    let slots = (1..=count)
        .map(|position| PlannedSlot {
            position,
            role: role_at(position, count, mode),
        })
        .collect();

    ScenePlan { mode, slots }
}

fn role_at(position: u32, count: u32, mode: SceneMode) -> SlotRole {
    match mode {
        SceneMode::Simple => SlotRole::OnCamera,
        SceneMode::ThreePoint => {
            if position == 1 || position == count / 2 + 1 || position == count {
                SlotRole::OnCamera
            } else {
                SlotRole::Cutaway
            }
        }
    }
}

/// Position label used in generation instructions.
pub fn position_label(position: u32, count: u32) -> &'static str {
    if position == 1 {
        "start"
    } else if position == count {
        "end"
    } else if position == count / 2 + 1 {
        "middle"
    } else {
        "supporting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_point_minimum_is_all_on_camera() {
        let plan = plan_scenes(24, 8, SceneMode::ThreePoint);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.on_camera_positions(), vec![1, 2, 3]);
        assert!(plan.cutaway_positions().is_empty());
    }

    #[test]
    fn test_three_point_five_scenes() {
        let plan = plan_scenes(40, 8, SceneMode::ThreePoint);
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.on_camera_positions(), vec![1, 3, 5]);
        assert_eq!(plan.cutaway_positions(), vec![2, 4]);
    }

    #[test]
    fn test_three_point_always_three_on_camera() {
        for total in (24..=400).step_by(8) {
            let plan = plan_scenes(total, 8, SceneMode::ThreePoint);
            let n = plan.len() as u32;
            assert_eq!(plan.on_camera_positions(), vec![1, n / 2 + 1, n], "total {}", total);
        }
    }

    #[test]
    fn test_short_duration_raised_to_minimum() {
        assert_eq!(plan_scenes(8, 8, SceneMode::ThreePoint).len(), 3);
        assert_eq!(plan_scenes(5, 8, SceneMode::Simple).len(), 1);
    }

    #[test]
    fn test_simple_mode_all_on_camera() {
        let plan = plan_scenes(32, 8, SceneMode::Simple);
        assert_eq!(plan.len(), 4);
        assert!(plan.slots.iter().all(|s| s.role == SlotRole::OnCamera));
        let positions: Vec<u32> = plan.slots.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_unit_yields_minimum() {
        assert_eq!(plan_scenes(40, 0, SceneMode::ThreePoint).len(), 3);
        assert_eq!(plan_scenes(40, 0, SceneMode::Simple).len(), 1);
    }

    #[test]
    fn test_position_labels() {
        assert_eq!(position_label(1, 5), "start");
        assert_eq!(position_label(3, 5), "middle");
        assert_eq!(position_label(5, 5), "end");
        assert_eq!(position_label(2, 5), "supporting");
        assert_eq!(position_label(1, 1), "start");
    }
}
