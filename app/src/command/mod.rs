//! CLI commands, one strategy type per subcommand.

mod init;
mod run;
mod version;

pub use init::InitStrategy;
pub use run::{RunInput, RunStrategy};
pub use version::VersionStrategy;

/// Contract shared by every command strategy.
///
/// Each strategy declares its own input type, so dispatch in `main`
/// stays static.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
