pub mod config;
pub mod map;
pub mod plan_export;
pub mod preview;
pub mod probe;
pub mod thumbnails;
