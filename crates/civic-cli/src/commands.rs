pub mod analytics;
pub mod list;
pub mod queue;
pub mod replay;
pub mod seed;
pub mod show;
