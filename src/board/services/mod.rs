//! Application services for the task board.

mod comments;
mod engine;

pub use comments::TaskCommentsService;
pub use engine::{
    BoardResult, BoardTransitionEngine, TransitionHandle, TransitionOutcome, TransitionStart,
};
