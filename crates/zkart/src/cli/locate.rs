use anyhow::Context;
use zkart_catalog::{ArtifactKind, Catalog, ProgramFormat};

#[derive(Debug, clap::Args)]
pub struct LocateArg {
    pub variant: String,
    #[arg(long)]
    pub native:  bool,
}

impl LocateArg {
    pub fn run(self) -> anyhow::Result<()> {
        for line in self.render(&Catalog::default())? {
            println!("{line}");
        }
        Ok(())
    }

    fn render(&self, catalog: &Catalog) -> anyhow::Result<Vec<String>> {
        let format = if self.native { ProgramFormat::Native } else { ProgramFormat::Wasm };
        let variant = catalog
            .classify(&self.variant)
            .with_context(|| format!("cannot locate '{}'", self.variant))?;

        Ok(ArtifactKind::ALL
            .iter()
            .map(|kind| {
                let location = catalog.locate(&variant, kind.file(format));
                format!("{:<16} {}  {}", kind.to_string(), location.locator, location.storage)
            })
            .collect())
    }
}
