//! 业务能力层
//!
//! 每个模块描述"我能做什么"，不持有稀缺资源，不关心整体流程

pub mod compiler;
pub mod correlator;
pub mod marker;
pub mod renderer;
pub mod segmenter;

pub use compiler::{DocCompiler, ImageUploader};
pub use segmenter::Segmenter;
