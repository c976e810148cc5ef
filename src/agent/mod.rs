//! Agent invocation subsystem.
//!
//! - **Driver**: which agent CLI grammar to speak, and how output is consumed
//! - **Command**: per-driver command vector builders
//! - **Resolve**: executable lookup with a Windows shell fallback
//! - **Launcher**: the resolve/launch state machine with its fallback edges
//! - **Stream** / **Document**: consumers for the two JSON output modes
//! - **Noop**: canned output used when no agent is available
//!
//! The agent CLIs themselves are black boxes. Their argument grammar is
//! encoded in the command builders and their JSON is forwarded, with a best
//! effort at narrating the event shapes we know.

pub mod command;
pub mod document;
pub mod driver;
pub mod launcher;
pub mod noop;
pub mod resolve;
pub mod stream;

pub use command::{DEFAULT_ALLOWED_TOOLS, join_allowed_tools};
pub use driver::{Driver, InvocationRequest, OutputFormat};
pub use launcher::{LaunchOptions, Launcher, Stage};
pub use resolve::Resolver;
