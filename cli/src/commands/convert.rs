use super::{AppContext, MarktreeCommand};
use marktree::error::Result;
use marktree::import_export::{self, ConvertOptions};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConvertCommand {
    pub source: PathBuf,
}

impl MarktreeCommand for ConvertCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let options = ConvertOptions::from(ctx.config);
        let output_dir = ctx.config.output_dir();

        let summary = import_export::convert_file(&self.source, &output_dir, &options)?;

        eprintln!(
            "✓ Converted {} folder(s) and {} bookmark(s) from {}",
            summary.folders,
            summary.links,
            self.source.display()
        );
        if summary.removed > 0 {
            eprintln!("  Removed {} empty file(s)/folder(s)", summary.removed);
        }
        println!("{}", summary.root.display());
        Ok(())
    }
}
