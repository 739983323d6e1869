//! Drive commands

use serde::{Deserialize, Serialize};

/// Forward speed and rotation handed to the actuator link
///
/// Forward lies in [0, 1], rotation in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    pub forward: f64,
    pub rotation: f64,
}

impl DriveCommand {
    pub const STOP: DriveCommand = DriveCommand {
        forward: 0.0,
        rotation: 0.0,
    };

    pub fn new(forward: f64, rotation: f64) -> Self {
        Self { forward, rotation }
    }

    pub fn is_stop(&self) -> bool {
        self.forward == 0.0 && self.rotation == 0.0
    }

    /// Force both axes into their output ranges (NaN becomes 0)
    pub fn clamped(self) -> Self {
        let finite = |v: f64| if v.is_nan() { 0.0 } else { v };
        Self {
            forward: finite(self.forward).clamp(0.0, 1.0),
            rotation: finite(self.rotation).clamp(-1.0, 1.0),
        }
    }

    /// Split into single-axis commands, forward first, skipping idle axes
    ///
    /// The microcontroller link is fed one axis per packet.
    pub fn axis_commands(&self) -> Vec<DriveCommand> {
        let mut commands = Vec::with_capacity(2);
        if self.forward != 0.0 {
            commands.push(DriveCommand::new(self.forward, 0.0));
        }
        if self.rotation != 0.0 {
            commands.push(DriveCommand::new(0.0, self.rotation));
        }
        commands
    }
}

impl From<DriveCommand> for (f64, f64) {
    fn from(c: DriveCommand) -> Self {
        (c.forward, c.rotation)
    }
}
