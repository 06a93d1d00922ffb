//! 流程层：一次笔记本提交的完整流水线

pub mod pipeline;

pub use pipeline::run_pipeline;
