use super::import::load_document;
use super::template::RecordTemplate;
use crate::config::{Config, DEFAULT_RECORD_TEMPLATE};
use crate::error::{MarktreeError, Result};
use crate::fs::{FileSystem, LocalFs};
use crate::models::bookmark::BookmarkNode;
use crate::record::ConversionRecord;
use crate::utils;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Index file written into every folder directory, and into the root when it holds links
pub const INDEX_FILE_NAME: &str = "Readme.md";

/// Options of a single conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub keep_empty: bool,
    pub record_template: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            keep_empty: false,
            record_template: DEFAULT_RECORD_TEMPLATE.to_string(),
        }
    }
}

impl From<&Config> for ConvertOptions {
    fn from(config: &Config) -> Self {
        Self {
            keep_empty: config.keep_empty,
            record_template: config.record_template.clone(),
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub root: PathBuf,
    pub folders: usize,
    pub links: usize,
    pub removed: usize,
    pub stamped: usize,
}

#[derive(Debug, Default)]
struct WalkStats {
    folders: usize,
    links: usize,
}

/// Mirrors a bookmark tree as directories with one Markdown index each
///
/// A run is all or nothing: when any step fails, everything created so far
/// is deleted again before the error is returned.
pub struct Converter<F: FileSystem = LocalFs> {
    fs: F,
    keep_empty: bool,
    template: RecordTemplate,
}

impl Converter<LocalFs> {
    pub fn local(options: &ConvertOptions) -> Result<Self> {
        Self::new(LocalFs, options)
    }
}

impl<F: FileSystem> Converter<F> {
    /// Fails on an invalid record template, before anything touches the disk
    pub fn new(fs: F, options: &ConvertOptions) -> Result<Self> {
        Ok(Self {
            fs,
            keep_empty: options.keep_empty,
            template: RecordTemplate::parse(&options.record_template)?,
        })
    }

    pub fn convert(&self, root: &BookmarkNode, destination: &Path) -> Result<ConversionSummary> {
        let BookmarkNode::Folder {
            created_at,
            modified_at,
            children,
            ..
        } = root
        else {
            return Err(MarktreeError::Parse(
                "bookmark document root must be a folder".to_string(),
            ));
        };

        let mut record = ConversionRecord::new();
        let mut stats = WalkStats::default();

        let outcome = self.write_folder(
            destination,
            *created_at,
            *modified_at,
            children,
            true,
            &mut record,
            &mut stats,
        );

        let created = record.len();
        let report = record.finalize(&self.fs, outcome.is_err(), self.keep_empty);

        match outcome {
            Ok(()) => {
                info!(
                    "Converted {} folder(s) and {} link(s) into {:?} ({} pruned)",
                    stats.folders, stats.links, destination, report.removed
                );
                Ok(ConversionSummary {
                    root: destination.to_path_buf(),
                    folders: stats.folders,
                    links: stats.links,
                    removed: report.removed,
                    stamped: report.stamped,
                })
            }
            Err(e) => {
                warn!(
                    "Conversion into {:?} failed, rolled back {} of {} created entities",
                    destination, report.removed, created
                );
                Err(e)
            }
        }
    }

    /// Create `dir` with its index file and fill both from `children`
    ///
    /// With `index_on_demand` the index is only created once the first link
    /// needs it. The index stays open only while this folder's subtree is
    /// written.
    #[allow(clippy::too_many_arguments)]
    fn write_folder(
        &self,
        dir: &Path,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        children: &[BookmarkNode],
        index_on_demand: bool,
        record: &mut ConversionRecord,
        stats: &mut WalkStats,
    ) -> Result<()> {
        self.fs
            .create_dir(dir)
            .map_err(|e| MarktreeError::filesystem(dir, e))?;
        record.created_directory(dir, created_at, modified_at);

        let index_path = dir.join(INDEX_FILE_NAME);
        let mut index = if index_on_demand {
            None
        } else {
            Some(self.open_index(&index_path, created_at, modified_at, record)?)
        };

        for child in children {
            match child {
                BookmarkNode::Folder {
                    name,
                    created_at,
                    modified_at,
                    children,
                } => {
                    let subdir = dir.join(utils::to_path_component(name));
                    self.write_folder(&subdir, *created_at, *modified_at, children, false, record, stats)?;
                    stats.folders += 1;
                }
                BookmarkNode::Link {
                    label,
                    url,
                    added_at,
                } => {
                    let writer = match &mut index {
                        Some(writer) => writer,
                        None => index.insert(self.open_index(
                            &index_path,
                            created_at,
                            modified_at,
                            record,
                        )?),
                    };
                    let line = self.template.render(label, url, added_at);
                    writeln!(writer, "{}", line)
                        .map_err(|e| MarktreeError::filesystem(&index_path, e))?;
                    record.wrote_record(&index_path);
                    stats.links += 1;
                }
            }
        }

        if let Some(mut writer) = index {
            writer
                .flush()
                .map_err(|e| MarktreeError::filesystem(&index_path, e))?;
        }
        Ok(())
    }

    fn open_index(
        &self,
        path: &Path,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        record: &mut ConversionRecord,
    ) -> Result<F::Writer> {
        let writer = self
            .fs
            .create_file(path)
            .map_err(|e| MarktreeError::filesystem(path, e))?;
        record.created_file(path, created_at, modified_at);
        Ok(writer)
    }
}

/// Load `source` and mirror it into `output_dir/<source name without extension>`
pub fn convert_file(
    source: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConversionSummary> {
    let converter = Converter::local(options)?;
    let document = load_document(source)?;
    let destination = output_dir.join(utils::output_name_for(source));
    converter.convert(&document, &destination)
}
