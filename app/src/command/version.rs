/// Prints the binary version.
#[derive(Debug, Clone, Copy)]
pub struct VersionStrategy;

impl super::CommandStrategy for VersionStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        println!("parley {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
