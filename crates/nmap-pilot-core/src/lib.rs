pub mod catalog;
pub mod command;
pub mod highlight;
pub mod runner;

pub use command::{
    output_file, NmapCommand, OutputFormat, Target, TargetParseError, TimingPreset, VERBOSE_FLAG,
};
pub use highlight::{classify, render, LineClass};
pub use runner::{OutputSink, ProcessRunner, RunnerError, ScanSession, ScanStatus, StdoutSink};
