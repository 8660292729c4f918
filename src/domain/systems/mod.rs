// Per-tick simulation systems. `tick::advance` composes them in order.

pub mod collision;
pub mod movement;
pub mod tick;

pub use tick::advance;
