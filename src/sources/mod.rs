//! Device source implementations.
//!
//! The live tracking driver is an external collaborator; in-tree sources
//! cover capture playback and scripted event sequences for tests.

pub mod replay;
pub mod scripted;

pub use replay::ReplaySource;
pub use scripted::ScriptedSource;
