use zkart_catalog::Variant;

#[derive(Debug, clap::Args)]
pub struct ListArg {
    /// List the proof-of-innocence variants instead of the standard ones.
    #[arg(long)]
    pub poi: bool,
}

impl ListArg {
    pub fn run(self) -> anyhow::Result<()> {
        for variant in self.variants() {
            println!("{variant}");
        }
        Ok(())
    }

    fn variants(&self) -> Vec<Variant> {
        if self.poi {
            Variant::privacy_proof_variants().collect()
        } else {
            Variant::standard_variants().collect()
        }
    }
}
