//! Stdin-driven peripheral emulator.
//!
//! Each input line is one event for the mock rig:
//!
//! | Line           | Effect                                      |
//! |----------------|---------------------------------------------|
//! | `face <label>` | camera delivers the enrolled face of label  |
//! | `stranger`     | camera delivers a frame with no face        |
//! | `card <id>`    | reader returns token `id`                   |
//! | `card-error`   | next token read fails                       |
//! | `camera-fail`  | next frame capture fails                    |
//! | `status`       | print output levels                         |
//! | `quit`         | request shutdown                            |

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use doorward_controller::{MockDevices, MockRig, SharedFacade};
use doorward_core::{EnrollmentData, Identity, TokenId};
use doorward_hardware::Frame;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// One emulator input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RigCommand {
    Face(Identity),
    Stranger,
    Card(TokenId),
    CardError,
    CameraFail,
    Status,
    Quit,
}

impl FromStr for RigCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let argument = words.next();
        if words.next().is_some() {
            bail!("too many arguments: {line}");
        }

        let command = match (verb.to_ascii_lowercase().as_str(), argument) {
            ("face", Some(label)) => RigCommand::Face(Identity::new(label)?),
            ("card", Some(id)) => RigCommand::Card(TokenId::new(id)?),
            ("stranger", None) => RigCommand::Stranger,
            ("card-error", None) => RigCommand::CardError,
            ("camera-fail", None) => RigCommand::CameraFail,
            ("status", None) => RigCommand::Status,
            ("quit" | "exit", None) => RigCommand::Quit,
            ("face" | "card", None) => bail!("{verb} needs an argument"),
            _ => bail!("unknown command: {line}"),
        };
        Ok(command)
    }
}

/// Builds camera frames from enrolled face vectors.
#[derive(Debug, Clone)]
pub struct FaceLibrary {
    enrollment: Arc<EnrollmentData>,
    side: u32,
}

impl FaceLibrary {
    pub fn new(enrollment: Arc<EnrollmentData>, side: usize) -> anyhow::Result<Self> {
        let side = u32::try_from(side).context("face side does not fit a frame")?;
        Ok(Self { enrollment, side })
    }

    /// Frame holding the first enrolled face of `identity`.
    pub fn frame_of(&self, identity: &Identity) -> anyhow::Result<Frame> {
        let values = self
            .enrollment
            .face_of(identity)
            .with_context(|| format!("{identity} is not enrolled"))?;

        let pixels = (self.side * self.side) as usize;
        let channels = match values.len() {
            n if n == pixels => 1,
            n if n == pixels * 3 => 3,
            n => bail!(
                "enrolled face of {identity} has {n} values, expected {pixels} or {}",
                pixels * 3
            ),
        };

        let data = values
            .iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        Ok(Frame::new(self.side, self.side, channels, data)?)
    }

    /// Frame with no face in it.
    pub fn stranger(&self) -> Frame {
        Frame::blank(self.side, self.side)
    }
}

/// Read stdin lines on a dedicated thread.
///
/// The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply emulator lines to the rig until `quit` or end of input.
pub async fn drive(
    mut lines: mpsc::Receiver<String>,
    rig: MockRig,
    faces: FaceLibrary,
    facade: SharedFacade<MockDevices>,
    shutdown: Arc<watch::Sender<bool>>,
) {
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<RigCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "ignored emulator input");
                continue;
            }
        };
        debug!(?command, "emulator input");

        if command == RigCommand::Quit {
            break;
        }
        if let Err(e) = apply(&rig, &faces, &facade, command).await {
            warn!(error = %e, "emulator command failed");
        }
    }

    info!("emulator input finished, requesting shutdown");
    let _ = shutdown.send(true);
}

async fn apply(
    rig: &MockRig,
    faces: &FaceLibrary,
    facade: &SharedFacade<MockDevices>,
    command: RigCommand,
) -> anyhow::Result<()> {
    match command {
        RigCommand::Face(identity) => rig.camera.push_frame(faces.frame_of(&identity)?).await?,
        RigCommand::Stranger => rig.camera.push_frame(faces.stranger()).await?,
        RigCommand::Card(token) => rig.reader.present_token(token).await?,
        RigCommand::CardError => rig.reader.fail_next("card read failed").await?,
        RigCommand::CameraFail => rig.camera.fail_next("camera unplugged").await?,
        RigCommand::Status => {
            let outputs = facade.outputs();
            let (line1, line2) = rig.display.lines();
            println!(
                "latch={} lamp={} ventilation={} display=[{line1} | {line2}]",
                outputs.latch, outputs.lamp, outputs.ventilation
            );
        }
        RigCommand::Quit => {}
    }
    Ok(())
}
