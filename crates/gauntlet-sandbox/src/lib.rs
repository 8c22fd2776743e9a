pub mod config;
pub mod sandbox;

pub use config::SandboxConfig;
pub use sandbox::{CallableRef, ExecOutcome, InProcessSandbox, Sandbox, SandboxFailure};
