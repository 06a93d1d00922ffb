//! 基础设施层：无头浏览器

pub mod capture;

pub use capture::{capture_output_screenshots, launch_headless_browser};
