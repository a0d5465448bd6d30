mod engine;
pub mod expression;
pub mod loop_block;
pub mod placeholder;

pub use engine::TemplateEngine;
pub use expression::resolve;
pub use loop_block::{find_next_block, isolate_markers, LoopBlock};
pub use placeholder::{scan, InterpolationPlan, Segment};
