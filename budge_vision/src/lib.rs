// THEORY:
// This file is the main entry point for the `budge_vision` library crate.
// It exposes the frame-differencing engine that answers one question: has the
// device carrying this camera been moved?
//
// The public surface is the `MotionPipeline`, which turns a stream of raw frames
// into per-frame `CycleReport`s, and the `Sentinel`, which wraps the pipeline in
// the long-running capture loop with injected display and alert collaborators.
// The individual stages live in `core_modules` and stay usable on their own.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod sentinel;

pub use config::{LoggingConfig, SentinelConfig};
pub use error::{BudgeError, BudgeResult};
pub use pipeline::{CycleReport, MotionPipeline};
pub use sentinel::{
    AlertEmitter, CycleObserver, DisplayControl, FrameSource, NoopDisplay, Sentinel,
    SentinelOutcome, SentinelTiming,
};
