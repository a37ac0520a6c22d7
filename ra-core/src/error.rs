use crate::extent::{Dim, DimRec, Rank};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Two operands disagree on an axis they both have.
    #[error("mismatched dimensions: argument {arg} has size {found} on axis {axis}, driver has {expected}")]
    ShapeMismatch {
        arg: usize,
        axis: Rank,
        expected: Dim,
        found: Dim,
    },

    #[error("driver rank {driver} is smaller than rank {rank} of argument {arg}")]
    RankMismatch { arg: usize, rank: Rank, driver: Rank },

    /// A rank that has to be concrete is a sentinel.
    #[error("cannot traverse an expression of rank {0}")]
    BadRank(Rank),

    #[error("index {index} out of bounds for axis {axis} of size {size}")]
    OutOfBounds { axis: Rank, index: Dim, size: Dim },

    #[error("negative size {size} on axis {axis}")]
    NegativeSize { axis: Rank, size: Dim },

    /// The driver of a traversal has no concrete extent on some axis.
    #[error("sizeless driver: undefined extent {size} on axis {axis}")]
    UndefinedSize { axis: Rank, size: Dim },

    /// An operand handing out `&mut` would be visited more than once per element.
    #[error("argument {arg} is written through and can't be broadcast: it has {rank} of the {driver} axes")]
    BroadcastWrite { arg: usize, rank: Rank, driver: Rank },

    /// Cell rank larger than what the operand has left to give.
    #[error("argument {arg} of rank {rank} has no frame left for cell rank {crank} (live {live})")]
    FrameRank {
        arg: usize,
        rank: Rank,
        crank: Rank,
        live: Rank,
    },

    #[error("shape {shape:?} needs {expected} elements, got {found}")]
    LengthMismatch {
        shape: Vec<Dim>,
        expected: usize,
        found: usize,
    },

    /// The strides of a view don't allow a reinterpretation without copying.
    #[error("cannot {op} a view with dims {dims:?}")]
    Layout {
        op: &'static str,
        dims: Vec<DimRec>,
    },

    #[error("Message: {0}")]
    Msg(String),

    #[error("{inner}\n{backtrace}")]
    WithBacktrace {
        inner: Box<Self>,
        backtrace: Box<std::backtrace::Backtrace>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Arbitrary errors wrapping.
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(err)).bt()
    }

    pub fn bt(self) -> Self {
        let backtrace = std::backtrace::Backtrace::capture();
        match backtrace.status() {
            std::backtrace::BacktraceStatus::Disabled
            | std::backtrace::BacktraceStatus::Unsupported => self,
            _ => Self::WithBacktrace {
                inner: Box::new(self),
                backtrace: Box::new(backtrace),
            },
        }
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Msg(format!($msg).into()).bt())
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Msg(format!($err).into()).bt())
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($fmt, $($arg)*).into()).bt())
    };
}
