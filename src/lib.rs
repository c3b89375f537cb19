pub mod cli;
pub mod coordinator;
pub mod core;
pub mod engine;
pub mod file_scanner;
pub mod launcher;
pub mod logging;
pub mod protocol;
pub mod services;
pub mod steps;
pub mod worker;

pub use crate::core::{
    Artifact, ArtifactSink, ArtifactStream, ProcessingStep, RunReporter, RunSummary, SwarmError,
    SwarmResult, WorkItem, WorkerId, WorkerReport,
};
pub use engine::{run, run_in_process, RunOutcome, SwarmEngine};
pub use file_scanner::FileScanner;
pub use launcher::{InProcessLauncher, Launcher, ProcessLauncher};
pub use services::{NoOpRunReporter, RunOptions, TracingRunReporter, WorkList};
pub use steps::{CommandStep, FnStep};

