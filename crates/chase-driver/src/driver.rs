//! Behavior state machine and PID drive loops

use pid_loop::PidController;
use tracing::{debug, info, trace};
use vision_targets::{DetectedBox, DetectionFrame, TargetSelector};

use crate::command::DriveCommand;
use crate::config::DriverConfig;
use crate::profile::DriveProfile;
use crate::safety::SafetyGate;
use crate::state::{DriveMode, DriverSnapshot, FrameStatistics, PreviousCommand};
use crate::DriverError;

/// Rotation loop setpoint: target centered in the image
const CENTER_SETPOINT: f64 = 0.0;

/// Per-frame drive controller
///
/// Must be driven from one thread at a time; the safety gate is the only
/// state shared with other tasks.
pub struct Driver {
    profile: DriveProfile,
    config: DriverConfig,
    selector: TargetSelector,
    forward_pid: PidController,
    rotation_pid: PidController,
    gate: SafetyGate,
    stats: FrameStatistics,
    previous: PreviousCommand,
    rotation_attempts: u32,
    mode: DriveMode,
}

impl Driver {
    /// Create a driver with its own safety gate
    pub fn new(profile: DriveProfile, config: DriverConfig) -> Result<Self, DriverError> {
        Self::with_gate(profile, config, SafetyGate::new())
    }

    /// Create a driver reading an existing safety gate
    pub fn with_gate(
        profile: DriveProfile,
        config: DriverConfig,
        gate: SafetyGate,
    ) -> Result<Self, DriverError> {
        config.validate()?;

        let mut forward_pid = PidController::new(profile.forward_kp(), profile.forward_ki(), 0.0)?;
        forward_pid.set_setpoint(config.size_setpoint)?;
        forward_pid.set_output_limits(0.0, 1.0)?;

        let mut rotation_pid = PidController::new(profile.rot_kp(), 0.0, 0.0)?;
        rotation_pid.set_setpoint(CENTER_SETPOINT)?;
        rotation_pid.set_output_limits(-1.0, 1.0)?;

        info!(
            "Creating driver: profile {:?}, grace {} frames, idle threshold {}",
            profile, config.max_grace_frames, config.idle_threshold
        );

        Ok(Self {
            selector: TargetSelector::new(config.selector.clone()),
            stats: FrameStatistics::expired(config.max_grace_frames),
            profile,
            config,
            forward_pid,
            rotation_pid,
            gate,
            previous: PreviousCommand::default(),
            rotation_attempts: 0,
            mode: DriveMode::IdleStop,
        })
    }

    /// Handle for the geofence collaborator
    pub fn safety_gate(&self) -> SafetyGate {
        self.gate.clone()
    }

    pub fn profile(&self) -> &DriveProfile {
        &self.profile
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn stats(&self) -> FrameStatistics {
        self.stats
    }

    /// Mode chosen on the last frame that was not gated
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn snapshot(&self) -> DriverSnapshot {
        DriverSnapshot {
            mode: self.mode,
            stats: self.stats,
            previous: self.previous,
            rotation_attempts: self.rotation_attempts,
            forward_pid: self.forward_pid.state(),
            rotation_pid: self.rotation_pid.state(),
        }
    }

    /// Process one frame and return the drive command
    pub fn drive(&mut self, frame: &DetectionFrame) -> DriveCommand {
        self.step(frame)
            .map(|mode| mode.command())
            .unwrap_or(DriveCommand::STOP)
    }

    /// Process one frame and return the chosen behavior
    ///
    /// Returns `None` when the safety gate held the robot; no driver state
    /// is touched in that case.
    pub fn step(&mut self, frame: &DetectionFrame) -> Option<DriveMode> {
        if self.gate.is_engaged() {
            trace!(sequence = frame.sequence, "frame gated");
            return None;
        }

        let selection = self.selector.select(&frame.boxes);
        let ts = frame.timestamp_ns;
        let grace = self.config.max_grace_frames;

        let mode = if let Some(goose) = selection.primary {
            self.chase(goose, ts)
        } else if self.stats.frames_since_goose < grace {
            self.stats.frames_since_goose += 1;
            DriveMode::HoldChase(self.previous.chase)
        } else if let Some(small_box) = selection.secondary {
            self.explore(small_box, ts)
        } else if self.stats.frames_since_small_box < grace {
            self.stats.frames_since_small_box += 1;
            DriveMode::HoldExplore(self.previous.explore)
        } else {
            self.idle()
        };

        if !mode.same_behavior(&self.mode) {
            info!(sequence = frame.sequence, "Drive mode {} -> {}", self.mode.name(), mode.name());
        }
        debug!(
            sequence = frame.sequence,
            mode = mode.name(),
            forward = mode.command().forward,
            rotation = mode.command().rotation,
            "frame processed"
        );

        self.mode = mode;
        Some(mode)
    }

    fn chase(&mut self, goose: &DetectedBox, ts: u64) -> DriveMode {
        self.stats.frames_since_goose = 0;
        self.rotation_attempts = 0;

        let mut forward = self.forward_pid.compute(goose.size() as f64, ts);
        if forward <= self.profile.forward_threshold() {
            forward = 0.0;
        }
        let rotation = self.rotation_toward(goose, ts);

        let command = DriveCommand::new(forward, rotation).clamped();
        self.previous.chase = command;
        DriveMode::Chase(command)
    }

    fn explore(&mut self, small_box: &DetectedBox, ts: u64) -> DriveMode {
        self.stats.frames_since_small_box = 0;

        let rotation = self.rotation_toward(small_box, ts);
        let forward = self.profile.forward_threshold() + self.config.approach_boost;

        let command = DriveCommand::new(forward, rotation).clamped();
        self.previous.explore = command;
        DriveMode::Explore(command)
    }

    fn idle(&mut self) -> DriveMode {
        if self.stats.frames_idle > self.config.idle_threshold
            && self.rotation_attempts < self.config.max_rotation_attempts
        {
            self.stats.frames_idle = 0;
            self.rotation_attempts += 1;
            let rotation = self.profile.rot_threshold() + self.config.rotate_boost;
            DriveMode::IdleRotate(DriveCommand::new(0.0, rotation).clamped())
        } else {
            self.stats.frames_idle = self.stats.frames_idle.saturating_add(1);
            DriveMode::IdleStop
        }
    }

    /// Rotation loop output for a box, with the deadband applied
    fn rotation_toward(&mut self, target: &DetectedBox, ts: u64) -> f64 {
        let offset = self.center_offset(target);
        let rotation = self.rotation_pid.compute(offset, ts);
        if rotation.abs() <= self.profile.rot_threshold() {
            0.0
        } else {
            rotation
        }
    }

    /// Horizontal distance from the image center to the box center, in the
    /// reference length's physical units
    fn center_offset(&self, target: &DetectedBox) -> f64 {
        let width = target.rect.width();
        if width <= 0 {
            return 0.0;
        }
        let physical_per_pixel = self.config.target_reference_length / width as f64;
        (target.rect.center_x() - self.config.image_center_pixel_x) * physical_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision_targets::BoundingRect;

    const FRAME_NS: u64 = 33_333_333;

    fn goose_at(center_x: i32, width: i32, height: i32) -> DetectedBox {
        DetectedBox::new(BoundingRect::centered(center_x, 200, width, height), "Goose, 90%", 0.9)
    }

    fn frame(sequence: u32, boxes: Vec<DetectedBox>) -> DetectionFrame {
        DetectionFrame::new(sequence, u64::from(sequence) * FRAME_NS, boxes)
    }

    #[test]
    fn test_starts_idle_stop() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        assert_eq!(driver.mode(), DriveMode::IdleStop);

        let mode = driver.step(&frame(0, vec![])).unwrap();
        assert_eq!(mode, DriveMode::IdleStop);
        assert_eq!(driver.stats().frames_idle, 1);
    }

    #[test]
    fn test_center_offset_scaled_by_box_width() {
        let driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        // 54 px wide box -> 0.5 in per pixel; 40 px right of center -> 20 in
        let b = goose_at(380, 54, 54);
        assert!((driver.center_offset(&b) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_chase_turns_toward_off_center_goose() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        // Goose well to the right: offset = 200 px * 27/100 = 54 in
        // rotation = -0.0075 * 54 = -0.405, outside the 0.1 deadband
        let command = driver.drive(&frame(0, vec![goose_at(540, 100, 100)]));
        assert!((command.rotation + 0.405).abs() < 1e-9);
        assert!(command.forward > 0.0);
    }

    #[test]
    fn test_forward_snaps_to_zero_near_setpoint() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        // Area 99 000 vs setpoint 100 000 -> 0.0001 * 1000 = 0.1, inside the 0.2 deadband
        let command = driver.drive(&frame(0, vec![goose_at(340, 330, 300)]));
        assert_eq!(command.forward, 0.0);
    }

    #[test]
    fn test_explore_crawls_at_threshold_plus_boost() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        let duck = DetectedBox::new(BoundingRect::centered(340, 50, 40, 40), "Duck, 70%", 0.7);

        let mode = driver.step(&frame(0, vec![duck])).unwrap();
        match mode {
            DriveMode::Explore(c) => {
                assert!((c.forward - 0.5).abs() < 1e-9);
                assert_eq!(c.rotation, 0.0);
            }
            other => panic!("expected explore, got {:?}", other),
        }
        assert_eq!(driver.stats().frames_since_small_box, 0);
    }

    #[test]
    fn test_primary_overrides_secondary() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        let duck = DetectedBox::new(BoundingRect::centered(100, 50, 40, 40), "Duck, 70%", 0.7);
        let mode = driver
            .step(&frame(0, vec![duck, goose_at(340, 250, 200)]))
            .unwrap();
        assert!(matches!(mode, DriveMode::Chase(_)));
    }

    #[test]
    fn test_hold_explore_after_losing_small_box() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        let duck = DetectedBox::new(BoundingRect::centered(340, 50, 40, 40), "Duck, 70%", 0.7);
        let explore = driver.drive(&frame(0, vec![duck]));

        for seq in 1..=7 {
            let mode = driver.step(&frame(seq, vec![])).unwrap();
            assert_eq!(mode, DriveMode::HoldExplore(explore));
        }
        assert_eq!(driver.step(&frame(8, vec![])), Some(DriveMode::IdleStop));
    }

    #[test]
    fn test_rotation_budget_exhausted() {
        let config = DriverConfig {
            idle_threshold: 2,
            max_rotation_attempts: 1,
            ..Default::default()
        };
        let mut driver = Driver::new(DriveProfile::carpet(), config).unwrap();

        let modes: Vec<_> = (0..10)
            .map(|seq| driver.step(&frame(seq, vec![])).unwrap())
            .collect();
        let rotations = modes
            .iter()
            .filter(|m| matches!(m, DriveMode::IdleRotate(_)))
            .count();
        assert_eq!(rotations, 1);
        assert!(matches!(modes[3], DriveMode::IdleRotate(_)));
    }

    #[test]
    fn test_chase_refills_rotation_budget() {
        let config = DriverConfig {
            max_grace_frames: 0,
            idle_threshold: 0,
            max_rotation_attempts: 1,
            ..Default::default()
        };
        let mut driver = Driver::new(DriveProfile::carpet(), config).unwrap();

        driver.step(&frame(0, vec![]));
        assert!(matches!(driver.step(&frame(1, vec![])), Some(DriveMode::IdleRotate(_))));
        assert_eq!(driver.snapshot().rotation_attempts, 1);

        driver.step(&frame(2, vec![goose_at(340, 250, 200)]));
        assert_eq!(driver.snapshot().rotation_attempts, 0);
    }

    #[test]
    fn test_idle_count_survives_chase() {
        let mut driver = Driver::new(DriveProfile::carpet(), DriverConfig::default()).unwrap();
        for seq in 0..150 {
            driver.step(&frame(seq, vec![]));
        }
        assert_eq!(driver.stats().frames_idle, 150);

        driver.step(&frame(150, vec![goose_at(340, 250, 200)]));
        assert_eq!(driver.stats().frames_idle, 150);

        // Grace window, then idle stop resumes counting from 150
        for seq in 151..=158 {
            driver.step(&frame(seq, vec![]));
        }
        assert_eq!(driver.stats().frames_idle, 151);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = DriverConfig {
            target_reference_length: -1.0,
            ..Default::default()
        };
        assert!(Driver::new(DriveProfile::grass(), config).is_err());
    }

    #[test]
    fn test_grass_idle_rotation_clamped() {
        let config = DriverConfig {
            idle_threshold: 0,
            rotate_boost: 0.5,
            ..Default::default()
        };
        let mut driver = Driver::new(DriveProfile::grass(), config).unwrap();
        driver.drive(&frame(0, vec![]));
        // 0.75 + 0.5 exceeds full scale
        let command = driver.drive(&frame(1, vec![]));
        assert_eq!(command, DriveCommand::new(0.0, 1.0));
    }
}
