// Raw controller state to engine intents.

use crate::domain::PlayerInput;
use crate::interface_adapters::protocol::InputDto;

// Maps pressed key names plus explicit flags onto the three engine intents.
//
// Unknown keys are ignored. Conflicting directions are passed through as is; the
// engine resolves them.
pub fn intents(input: &InputDto) -> PlayerInput {
    let mut intents = PlayerInput {
        move_left: input.left,
        move_right: input.right,
        jump: input.jump,
    };

    for key in &input.keys {
        match key.as_str() {
            "ArrowLeft" | "a" | "A" => intents.move_left = true,
            "ArrowRight" | "d" | "D" => intents.move_right = true,
            " " | "Space" | "ArrowUp" | "w" | "W" => intents.jump = true,
            _ => {}
        }
    }

    intents
}
