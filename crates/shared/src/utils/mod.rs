mod clock;
mod logs;
mod metrics;
mod otel;
mod shutdown;

pub use self::clock::{Clock, DynClock, FixedClock, SystemClock};
pub use self::logs::init_logger;
pub use self::metrics::{Method, Metrics, Status, SystemMetrics, run_metrics_collector};
pub use self::otel::{OperationTracer, Telemetry, TracingContext};
pub use self::shutdown::shutdown_signal;
