use crate::commands::convert::ConvertCommand;
use crate::commands::{AppContext, MarktreeCommand};
use clap::Parser;
use marktree::config::Config;
use marktree::error::Result;
use std::path::PathBuf;
use std::sync::OnceLock;

pub fn get_exe_name() -> &'static str {
    static EXE_NAME: OnceLock<String> = OnceLock::new();
    EXE_NAME.get_or_init(|| {
        std::env::args()
            .next()
            .as_ref()
            .map(std::path::Path::new)
            .and_then(|path| path.file_name())
            .and_then(|name| name.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "marktree".to_string())
    })
}

/// Converts HTML file with browser bookmarks to folders and Markdown files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Show the program version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// File with browser bookmarks
    #[arg(name = "BOOKMARKS", required_unless_present = "version")]
    pub bookmarks: Option<PathBuf>,

    /// Directory to create the bookmark tree in (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep index files without bookmarks and empty folders
    #[arg(short, long)]
    pub keep_empty: bool,

    /// Bookmark line template; slots {label}/{0}, {url}/{1}, {date}/{2}
    #[arg(short, long)]
    pub template: Option<String>,

    /// Optional custom configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show debug information
    #[arg(short = 'g', long = "debug")]
    pub debug: bool,
}

/// Command line flags win over the configuration file
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.keep_empty {
        config.keep_empty = true;
    }
    if let Some(template) = &cli.template {
        config.record_template = template.clone();
    }
    if let Some(output) = &cli.output {
        config.output_root = Some(output.clone());
    }
}

pub fn handle_args(cli: Cli, config: &Config) -> Result<()> {
    let Some(source) = cli.bookmarks else {
        return Err(marktree::MarktreeError::Config(format!(
            "No bookmarks file given. Usage: {} <BOOKMARKS>",
            get_exe_name()
        )));
    };

    let ctx = AppContext { config };
    ConvertCommand { source }.execute(&ctx)
}
