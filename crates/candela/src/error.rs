//! Error types for the plotting engine.

/// Plotting engine error.
///
/// Contract violations raise synchronously and abort the current render
/// call. Numeric degeneration (zero-width scale bounds, non-positive log
/// inputs) is deliberately *not* represented here; it propagates as
/// NaN/infinity through geometry instead of costing a branch per vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    /// An axis was constructed with a tick step of zero.
    ZeroTickStep,
    /// A dataset's length is not evenly divisible by the requested
    /// attribute component size.
    IncompatibleSize { size: usize, length: usize },
    /// A dataset was updated after being disposed.
    DatasetDisposed,
    /// The backend rejected a generated shader program.
    ProgramCompile(String),
}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroTickStep => write!(f, "tick step must be non-zero"),
            Self::IncompatibleSize { size, length } => {
                write!(
                    f,
                    "attempted to use incompatible size {} with data of length {}",
                    size, length
                )
            }
            Self::DatasetDisposed => {
                write!(f, "this dataset cannot be updated, it has already been disposed")
            }
            Self::ProgramCompile(msg) => write!(f, "program compilation failed: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {}
