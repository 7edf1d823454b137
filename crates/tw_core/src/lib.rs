pub mod detail;
pub mod geometry;
pub mod input;
pub mod statemachine;
pub mod time;

pub use detail::DetailTier;
pub use geometry::Rect;
pub use input::{InputState, Key};
pub use statemachine::{StateDefinition, StateMachine, StateReceiver, NO_STATE};
pub use time::TimeState;
