pub mod batch;
pub mod classifier;
pub mod glyphs;
pub mod message;
pub mod pipeline;
pub mod renderer;
pub mod report;
