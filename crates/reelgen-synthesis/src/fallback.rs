//! Deterministic stand-ins for slots the backend failed to fill.

use reelgen_models::SlotRole;

/// Visual description used when a block has none.
pub fn fallback_visual(
    character_name: &str,
    visual_style: &str,
    outfit: &str,
    role: SlotRole,
    position: u32,
) -> String {
    match role {
        SlotRole::OnCamera => {
            let appearance = if outfit.trim().is_empty() {
                "professional appearance".to_string()
            } else {
                outfit.trim().trim_end_matches('.').to_string()
            };
            format!(
                "{}, [Style: {}], {}. Speaking directly to the camera with a warm, \
                 confident expression. Eye-level medium shot, soft even studio lighting. \
                 No subtitles.",
                character_name, visual_style, appearance
            )
        }
        SlotRole::Cutaway => format!(
            "Illustrative {} footage for point {}, no on-screen presenter. Clean \
             uncluttered composition, slow camera push-in, soft lighting. No subtitles.",
            visual_style, position
        ),
    }
}

/// Generic numbered dialogue line for a slot.
pub fn fallback_dialogue(character_name: &str, role: SlotRole, position: u32) -> String {
    match (position, role) {
        (1, _) => format!("Hi, I'm {}. Let's learn something new today.", character_name),
        (_, SlotRole::OnCamera) => format!("Here is point number {} to remember.", position),
        (_, SlotRole::Cutaway) => format!("Look closely, this is point number {}.", position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_deterministic() {
        let a = fallback_dialogue("Riya", SlotRole::Cutaway, 4);
        let b = fallback_dialogue("Riya", SlotRole::Cutaway, 4);
        assert_eq!(a, b);
        assert!(a.contains('4'));
    }

    #[test]
    fn test_fallback_lines_fit_smallest_budget() {
        for position in 1..=10 {
            for role in [SlotRole::OnCamera, SlotRole::Cutaway] {
                let line = fallback_dialogue("Apple", role, position);
                assert!(line.split_whitespace().count() <= 15, "{}", line);
            }
        }
    }

    #[test]
    fn test_fallback_visual_uses_outfit() {
        let visual = fallback_visual("Riya", "Realistic Character", "red hoodie.", SlotRole::OnCamera, 1);
        assert!(visual.starts_with("Riya, [Style: Realistic Character], red hoodie."));

        let visual = fallback_visual("Riya", "Realistic Character", "", SlotRole::OnCamera, 3);
        assert!(visual.contains("professional appearance"));

        let cutaway = fallback_visual("Riya", "Realistic Character", "", SlotRole::Cutaway, 2);
        assert!(!cutaway.contains("Riya"));
    }
}
