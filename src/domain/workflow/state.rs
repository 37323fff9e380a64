//! Execution stages and the execution state machine
//!
//! `Querying -> Flattening -> LoadingTemplate -> Composing -> Invoking -> Done`,
//! with `Failed` reachable from every running stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ErrorKind, WorkflowError};

/// A discrete transformation or I/O operation within an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Querying,
    Flattening,
    LoadingTemplate,
    Composing,
    Invoking,
}

impl WorkflowStage {
    /// Stages in pipeline order
    pub const ALL: [WorkflowStage; 5] = [
        Self::Querying,
        Self::Flattening,
        Self::LoadingTemplate,
        Self::Composing,
        Self::Invoking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Querying => "querying",
            Self::Flattening => "flattening",
            Self::LoadingTemplate => "loading_template",
            Self::Composing => "composing",
            Self::Invoking => "invoking",
        }
    }

    /// The stage that follows this one, if any
    pub fn next(&self) -> Option<WorkflowStage> {
        match self {
            Self::Querying => Some(Self::Flattening),
            Self::Flattening => Some(Self::LoadingTemplate),
            Self::LoadingTemplate => Some(Self::Composing),
            Self::Composing => Some(Self::Invoking),
            Self::Invoking => None,
        }
    }

    /// Whether the stage suspends on an external service
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Querying | Self::LoadingTemplate | Self::Invoking)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExecutionState {
    Running { stage: WorkflowStage },
    Done,
    Failed { stage: WorkflowStage, kind: ErrorKind },
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::Running {
            stage: WorkflowStage::Querying,
        }
    }
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }

    pub fn current_stage(&self) -> Option<WorkflowStage> {
        match self {
            Self::Running { stage } => Some(*stage),
            _ => None,
        }
    }

    /// Check that the first stage run is the initial one
    pub fn begin(&self, first: WorkflowStage) -> Result<(), WorkflowError> {
        match *self {
            Self::Running { stage } if stage == first => Ok(()),
            Self::Running { stage } => Err(WorkflowError::internal(format!(
                "execution must begin at '{}', not '{}'",
                stage, first
            ))),
            terminal => Err(WorkflowError::internal(format!(
                "execution already terminated ({:?})",
                terminal
            ))),
        }
    }

    /// Enter `next`; it must directly follow the current stage
    pub fn enter(&mut self, next: WorkflowStage) -> Result<(), WorkflowError> {
        match *self {
            Self::Running { stage } if stage.next() == Some(next) => {
                *self = Self::Running { stage: next };
                Ok(())
            }
            Self::Running { stage } => Err(WorkflowError::internal(format!(
                "cannot move from '{}' to '{}'",
                stage, next
            ))),
            terminal => Err(WorkflowError::internal(format!(
                "execution already terminated ({:?})",
                terminal
            ))),
        }
    }

    /// Move to `Done`
    pub fn complete(&mut self) -> Result<(), WorkflowError> {
        match *self {
            Self::Running { .. } => {
                *self = Self::Done;
                Ok(())
            }
            terminal => Err(WorkflowError::internal(format!(
                "execution already terminated ({:?})",
                terminal
            ))),
        }
    }

    /// Move to `Failed`, attributing the failure to `stage`
    pub fn fail(&mut self, stage: WorkflowStage, kind: ErrorKind) -> Result<(), WorkflowError> {
        match *self {
            Self::Running { .. } => {
                *self = Self::Failed { stage, kind };
                Ok(())
            }
            terminal => Err(WorkflowError::internal(format!(
                "execution already terminated ({:?})",
                terminal
            ))),
        }
    }
}
