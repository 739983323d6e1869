//! Goose Pilot
//!
//! Replays recorded detector output through the chase driver:
//! - Detection frames are driven synchronously on the calling task
//! - GPS fixes go to a geofence task that owns the safety gate
//! - Commands leave through a `CommandSink`, one axis per packet

mod replay;
mod settings;
mod sink;

pub use replay::{parse_replay, ReplayError, ReplayEvent};
pub use settings::PilotSettings;
pub use sink::{CommandSink, JsonLinesSink};

use anyhow::Context;
use chase_driver::{DriveCommand, Driver, SafetyGate};
use geofence::{FenceStatus, GeoPoint, GeofenceMonitor};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;
use vision_targets::DetectionFrame;

/// Initialize logging
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// GPS fix handed to the geofence task, answered once applied
#[derive(Debug)]
pub struct GpsUpdate {
    pub fix: GeoPoint,
    pub ack: oneshot::Sender<FenceStatus>,
}

/// Spawn the task that applies GPS fixes to the safety gate
///
/// The task ends when every sender is dropped and hands the monitor back.
pub fn spawn_geofence_task(
    mut monitor: GeofenceMonitor,
) -> (mpsc::Sender<GpsUpdate>, JoinHandle<GeofenceMonitor>) {
    let (tx, mut rx) = mpsc::channel::<GpsUpdate>(32);

    let handle = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let status = monitor.update(update.fix);
            // Receiver may have given up waiting
            let _ = update.ack.send(status);
        }
        debug!("Geofence task stopped");
        monitor
    });

    (tx, handle)
}

/// Counters reported at the end of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub gated_frames: u64,
    pub fixes: u64,
    pub outside_fixes: u64,
    pub packets_sent: u64,
}

/// Drive a recorded event stream and write every command packet to `sink`
pub async fn run_replay<S: CommandSink>(
    settings: &PilotSettings,
    events: Vec<ReplayEvent>,
    sink: &mut S,
) -> anyhow::Result<ReplaySummary> {
    let profile = settings.drive_profile();
    let gate = SafetyGate::new();
    let mut driver = Driver::with_gate(profile, settings.driver.clone(), gate.clone())
        .context("invalid driver configuration")?;

    let monitor = match settings.fence().context("invalid geofence samples")? {
        Some(fence) => GeofenceMonitor::with_fence(fence, gate),
        None => GeofenceMonitor::new(gate),
    };
    let (gps_tx, gps_task) = spawn_geofence_task(monitor);

    info!(
        "Replaying {} events (forward_kp={}, rot_kp={})",
        events.len(),
        profile.forward_kp(),
        profile.rot_kp()
    );

    let mut summary = ReplaySummary::default();
    for event in events {
        let frame = match event {
            ReplayEvent::Fix(fix) => {
                let (ack, status) = oneshot::channel();
                gps_tx
                    .send(GpsUpdate { fix, ack })
                    .await
                    .context("geofence task stopped")?;
                // Wait for the gate to settle before the next frame
                let status = status.await.context("geofence task dropped a fix")?;
                summary.fixes += 1;
                if status == FenceStatus::Outside {
                    summary.outside_fixes += 1;
                }
                continue;
            }
            ReplayEvent::Frame(frame) => frame,
            ReplayEvent::Detections {
                sequence,
                timestamp_ns,
                detections,
            } => DetectionFrame::new(sequence, timestamp_ns, settings.labels.adapt_all(&detections)),
        };

        summary.frames += 1;
        let command = match driver.step(&frame) {
            Some(mode) => mode.command(),
            None => {
                summary.gated_frames += 1;
                DriveCommand::STOP
            }
        };

        for packet in command.axis_commands() {
            sink.send(frame.sequence, packet)
                .with_context(|| format!("failed to send command for frame {}", frame.sequence))?;
            summary.packets_sent += 1;
        }
    }

    drop(gps_tx);
    gps_task.await.context("geofence task panicked")?;

    Ok(summary)
}
