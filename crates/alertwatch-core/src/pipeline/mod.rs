mod engine;
mod service;

pub use engine::{Announcement, EvaluationReport, Evaluator};
pub use service::{
    fetch_once, run_evaluation_loop, run_fetch_loop, Watcher, WatcherHandle,
};
