pub mod queue;
pub mod speaker;
