//! Behavior modes and per-driver frame memory

use pid_loop::PidState;
use serde::{Deserialize, Serialize};
use crate::command::DriveCommand;

/// Behavior chosen for a frame, carrying the command it emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Primary target in view, PID-driven pursuit
    Chase(DriveCommand),

    /// Primary lost within the grace window, last chase command held
    HoldChase(DriveCommand),

    /// Small secondary box in view, slow crawl toward it
    Explore(DriveCommand),

    /// Secondary lost within the grace window, last explore command held
    HoldExplore(DriveCommand),

    /// Rotate-in-place search sweep
    IdleRotate(DriveCommand),

    /// Nothing to do
    #[default]
    IdleStop,
}

impl DriveMode {
    pub fn command(&self) -> DriveCommand {
        match *self {
            DriveMode::Chase(c)
            | DriveMode::HoldChase(c)
            | DriveMode::Explore(c)
            | DriveMode::HoldExplore(c)
            | DriveMode::IdleRotate(c) => c,
            DriveMode::IdleStop => DriveCommand::STOP,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DriveMode::Chase(_) => "chase",
            DriveMode::HoldChase(_) => "hold_chase",
            DriveMode::Explore(_) => "explore",
            DriveMode::HoldExplore(_) => "hold_explore",
            DriveMode::IdleRotate(_) => "idle_rotate",
            DriveMode::IdleStop => "idle_stop",
        }
    }

    /// Whether two modes are the same behavior, ignoring the command
    pub fn same_behavior(&self, other: &DriveMode) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Hysteresis counters advanced once per processed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStatistics {
    /// Frames since the primary target was last seen
    pub frames_since_goose: u32,

    /// Frames since a small secondary box was last seen
    pub frames_since_small_box: u32,

    /// Idle-stop frames since the last rotate-in-place sweep
    ///
    /// Only a sweep resets it; chase and explore frames leave it as is.
    pub frames_idle: u32,
}

impl FrameStatistics {
    /// Counters for a driver that has never seen anything: both grace
    /// windows already expired.
    pub fn expired(max_grace_frames: u32) -> Self {
        Self {
            frames_since_goose: max_grace_frames,
            frames_since_small_box: max_grace_frames,
            frames_idle: 0,
        }
    }
}

/// Last commands produced in chase and explore, replayed during grace periods
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousCommand {
    pub chase: DriveCommand,
    pub explore: DriveCommand,
}

/// Full observable state of a driver, for inspection and comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverSnapshot {
    pub mode: DriveMode,
    pub stats: FrameStatistics,
    pub previous: PreviousCommand,
    pub rotation_attempts: u32,
    pub forward_pid: PidState,
    pub rotation_pid: PidState,
}
