//! Core ordering flow for the translation mini app.
//!
//! This crate owns the ordering state machine and everything that drives it:
//! cancellable timers for the two simulated steps, the upload collector, the
//! progress indicator mapping, and [`OrderSession`], which ties the flow to the
//! analysis and payment providers and to the host bridge.

pub mod builder;
pub mod flow;
pub mod progress;
pub mod session;
pub mod state;
pub mod timer;
pub mod upload;

pub use builder::{BuilderError, SessionBuilder, SessionFactories};
pub use flow::{FlowError, OrderFlow, Transition};
pub use progress::{progress_index, progress_label, PROGRESS_STEPS};
pub use session::{OrderSession, OrderView, ProviderRunner, SessionError};
pub use state::OrderState;
pub use timer::{JobRunner, Scheduler, TimerHandle, TokioScheduler};
pub use upload::{UploadCollector, UploadError};
