use thiserror::Error;

/// Failures surfaced to the collaborator layer when injecting a command.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InjectError {
    #[error("Robot not connected")]
    RobotNotConnected,
}
