//! Common errors across the mwrtm crate

/// Errors raised by the RTM kernel before any column is dispatched.
///
/// Everything here is fatal to the whole batch: either the inputs are
/// structurally wrong (shapes), a value is outside its physical domain, or
/// the worker configuration is invalid. Per-column numeric anomalies (NaN
/// produced from otherwise in-domain inputs) are *not* errors; they
/// propagate into the corresponding output cells so that one bad column
/// cannot void a multi-million-column run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RtmError {
    /// A profile array whose shape does not match `(num_points, num_levels)`.
    #[error("{array} has shape ({rows}, {cols}), expected (num_points, num_levels) = ({num_points}, {num_levels})")]
    ProfileShape {
        array: &'static str,
        rows: usize,
        cols: usize,
        num_points: usize,
        num_levels: usize,
    },
    /// A 1-D array whose length does not match its declared dimension.
    #[error("{array} has length {actual}, expected {expected}")]
    SeriesLength {
        array: &'static str,
        actual: usize,
        expected: usize,
    },
    /// The shared pressure-level array is empty.
    #[error("pressure must contain at least one level")]
    NoLevels,
    /// A shared per-level value (pressure) outside its physical domain.
    #[error("{array}[{level}] = {value} is invalid: {requirement}")]
    LevelDomain {
        array: &'static str,
        level: usize,
        value: f32,
        requirement: &'static str,
    },
    /// A per-channel value (incidence angle or frequency) outside its domain.
    #[error("{array}[{channel}] = {value} is invalid: {requirement}")]
    ChannelDomain {
        array: &'static str,
        channel: usize,
        value: f32,
        requirement: &'static str,
    },
    /// A per-column profile value outside its physical domain.
    #[error("{array}[{column}, {level}] = {value} is invalid: {requirement}")]
    ProfileDomain {
        array: &'static str,
        column: usize,
        level: usize,
        value: f32,
        requirement: &'static str,
    },
    /// A per-column surface value outside its physical domain.
    #[error("{array}[{column}] = {value} is invalid: {requirement}")]
    SurfaceDomain {
        array: &'static str,
        column: usize,
        value: f32,
        requirement: &'static str,
    },
    /// The incidence angle and frequency tables do not pair up.
    #[error("incidence_angle (length {incidence}) and frequency (length {frequency}) must have the same length and be non-empty")]
    ChannelTable { incidence: usize, frequency: usize },
    /// The shared pressure levels change direction partway through.
    #[error("pressure levels are not strictly monotonic at index {level}")]
    NonMonotonicPressure { level: usize },
    /// Every level of a column sits below the surface, leaving no path to
    /// integrate over.
    #[error("column {column}: no pressure level at or above the surface pressure")]
    NoSurface { column: usize },
    /// An explicit worker count of zero.
    #[error("num_threads must be positive when given, got 0")]
    WorkerCount,
    /// The rayon pool could not be constructed.
    #[error("failed to build the worker pool: {0}")]
    WorkerPool(String),
}
