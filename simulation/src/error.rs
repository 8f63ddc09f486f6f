use quadtree::QuadtreeError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    Empty,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    UnknownGlyph {
        row: usize,
        col: usize,
        glyph: char,
    },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Empty => write!(f, "level map has no tiles"),
            LevelError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "level row {} has {} tiles, expected {}",
                row, found, expected
            ),
            LevelError::UnknownGlyph { row, col, glyph } => {
                write!(f, "unknown tile {:?} at row {}, column {}", glyph, row, col)
            }
        }
    }
}

impl std::error::Error for LevelError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Quadtree(QuadtreeError),
    Level(LevelError),
    Config(String),
    SchedulerNotStarted,
    SchedulerAlreadyStarted,
    SchedulerShutDown,
    WorkerSpawn(String),
}

pub type SimulationResult<T> = Result<T, SimulationError>;

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Quadtree(err) => write!(f, "spatial index: {}", err),
            SimulationError::Level(err) => write!(f, "level: {}", err),
            SimulationError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SimulationError::SchedulerNotStarted => {
                write!(f, "enemy scheduler has not been started")
            }
            SimulationError::SchedulerAlreadyStarted => {
                write!(f, "enemy scheduler is already running and cannot be reconfigured")
            }
            SimulationError::SchedulerShutDown => write!(f, "enemy scheduler has been shut down"),
            SimulationError::WorkerSpawn(msg) => write!(f, "failed to spawn shard worker: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Quadtree(err) => Some(err),
            SimulationError::Level(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuadtreeError> for SimulationError {
    fn from(err: QuadtreeError) -> Self {
        SimulationError::Quadtree(err)
    }
}

impl From<LevelError> for SimulationError {
    fn from(err: LevelError) -> Self {
        SimulationError::Level(err)
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        SimulationError::Config(err.to_string())
    }
}
