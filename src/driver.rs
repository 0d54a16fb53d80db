//! Batch driver: pair every data file with its specification and convert it.
//!
//! Per-file failures are logged and recorded in the `BatchReport`; only a
//! missing data directory or an uncreatable output directory stops the batch.

use crate::Result;
use crate::error::ConvertError;
use crate::parse::parse_data_file;
use crate::render::write_ndjson;
use crate::spec::load_spec_file;

use anyhow::Context;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Separator between the specification prefix and the rest of a data file name.
pub const KEY_SEPARATOR: char = '_';

/// Folder layout for one batch run.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension (without dot) that marks a data file.
    pub data_suffix: String,
}

impl Config {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        specs_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            specs_dir: specs_dir.into(),
            output_dir: output_dir.into(),
            data_suffix: "txt".to_string(),
        }
    }

    fn is_data_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .map(|ext| ext == self.data_suffix.as_str())
            .unwrap_or(false)
    }
}

/// A data file that converted successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub data_file: String,
    pub spec_file: PathBuf,
    pub output_file: PathBuf,
    pub records: usize,
}

/// What happened to every entry of the data directory.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<FileOutcome>,
    /// Entries that are not data files (wrong suffix or not a regular file).
    pub skipped: Vec<String>,
    pub failed: Vec<(String, ConvertError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Specification key of a data file name: the text before the first `_`.
///
/// Names without a separator use their stem (`orders.txt` -> `orders`).
/// Returns `None` when the key would be empty.
pub fn derive_spec_key(file_name: &str) -> Option<String> {
    let key = match file_name.split_once(KEY_SEPARATOR) {
        Some((prefix, _)) => prefix,
        None => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(""),
    };
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Output file name for a data file: `<stem>.ndjson`.
pub fn output_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{}.ndjson", stem)
}

/// Run the full pipeline for one data file.
pub fn process_file_pair(
    config: &Config,
    file_name: &str,
) -> std::result::Result<FileOutcome, ConvertError> {
    let data_path = config.data_dir.join(file_name);

    let key = derive_spec_key(file_name).ok_or_else(|| {
        ConvertError::not_found(&data_path, "cannot derive a specification key from the name")
    })?;
    let spec_path = config.specs_dir.join(format!("{}.csv", key));
    if !spec_path.is_file() {
        return Err(ConvertError::not_found(
            &spec_path,
            format!("no specification for {}", file_name),
        ));
    }

    let spec = load_spec_file(&spec_path)?;
    let data = parse_data_file(&data_path, &spec)?;

    let output_path = config.output_dir.join(output_file_name(file_name));
    write_ndjson(&data, &output_path)?;

    Ok(FileOutcome {
        data_file: file_name.to_string(),
        spec_file: spec_path,
        output_file: output_path,
        records: data.len(),
    })
}

/// Convert every data file under `config.data_dir`.
pub fn run(config: &Config) -> Result<BatchReport> {
    let entries = fs::read_dir(&config.data_dir)
        .with_context(|| format!("read data directory {}", config.data_dir.display()))?;

    // Sorted for a deterministic processing order.
    let mut names: Vec<(String, bool)> = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("list data directory {}", config.data_dir.display()))?;
        // Follows symlinks, so a link to a data file counts as a file.
        let is_file = fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
        names.push((entry.file_name().to_string_lossy().into_owned(), is_file));
    }
    names.sort();

    if !config.output_dir.is_dir() {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("create output directory {}", config.output_dir.display())
        })?;
        info!("Created output directory: {}", config.output_dir.display());
    }

    let mut report = BatchReport::default();
    for (name, is_file) in names {
        if !is_file || !config.is_data_file(&name) {
            info!("Skipping non-data file: {}", name);
            report.skipped.push(name);
            continue;
        }

        info!("Processing data file: {}", name);
        match process_file_pair(config, &name) {
            Ok(outcome) => {
                info!(
                    "Output file written for {} ({} records).",
                    name, outcome.records
                );
                report.converted.push(outcome);
            }
            Err(e @ ConvertError::NotFound { .. }) => {
                warn!("{}: {}. Skipping.", name, e);
                report.failed.push((name, e));
            }
            Err(e) => {
                error!("Failed to process {}: {}", name, e);
                report.failed.push((name, e));
            }
        }
    }

    info!(
        "Batch finished: converted {}, skipped {}, failed {}.",
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Layout {
        _root: TempDir,
        config: Config,
    }

    fn layout() -> Layout {
        let root = TempDir::new().unwrap();
        let config = Config::new(
            root.path().join("data"),
            root.path().join("specs"),
            root.path().join("output"),
        );
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::create_dir_all(&config.specs_dir).unwrap();
        Layout {
            _root: root,
            config,
        }
    }

    fn put(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    const ID_FLAG: &str = "column name,width,datatype\nid,3,INTEGER\nflag,1,BOOLEAN\n";

    #[test]
    fn spec_key_is_prefix_before_separator() {
        assert_eq!(derive_spec_key("testformat1_2015-06-28.txt"), Some("testformat1".into()));
        assert_eq!(derive_spec_key("a_b_c.txt"), Some("a".into()));
        assert_eq!(derive_spec_key("orders.txt"), Some("orders".into()));
        assert_eq!(derive_spec_key("orders"), Some("orders".into()));
        assert_eq!(derive_spec_key("_dangling.txt"), None);
    }

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(output_file_name("a_2020.01.txt"), "a_2020.01.ndjson");
        assert_eq!(output_file_name("plain"), "plain.ndjson");
    }

    #[test]
    fn converts_matching_pair() {
        let l = layout();
        put(&l.config.specs_dir, "fmt.csv", ID_FLAG);
        put(&l.config.data_dir, "fmt_1.txt", "007T\n123F\n");

        let report = run(&l.config).unwrap();
        assert!(report.is_success());
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.converted[0].records, 2);

        let out = fs::read_to_string(l.config.output_dir.join("fmt_1.ndjson")).unwrap();
        assert_eq!(out, "{\"id\":7,\"flag\":true}\n{\"id\":123,\"flag\":false}\n");
    }

    #[test]
    fn failures_are_isolated_per_file() {
        let l = layout();
        put(&l.config.specs_dir, "good.csv", ID_FLAG);
        put(
            &l.config.specs_dir,
            "weird.csv",
            "column name,width,datatype\nid,3,DATE\n",
        );
        put(&l.config.data_dir, "good_1.txt", "007T\n");
        put(&l.config.data_dir, "good_2.txt", "007T\n07T\n");
        put(&l.config.data_dir, "missing_1.txt", "007T\n");
        put(&l.config.data_dir, "weird_1.txt", "007\n");
        put(&l.config.data_dir, "zz_3.txt", "008F\n");
        put(&l.config.specs_dir, "zz.csv", ID_FLAG);

        let report = run(&l.config).unwrap();
        assert!(!report.is_success());

        let converted: Vec<_> = report.converted.iter().map(|o| o.data_file.as_str()).collect();
        assert_eq!(converted, vec!["good_1.txt", "zz_3.txt"]);

        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|(n, e)| (n.as_str(), e.kind()))
            .collect();
        assert_eq!(
            failed,
            vec![
                ("good_2.txt", "parse"),
                ("missing_1.txt", "not-found"),
                ("weird_1.txt", "format"),
            ]
        );

        assert!(!l.config.output_dir.join("good_2.ndjson").exists());
        assert!(!l.config.output_dir.join("missing_1.ndjson").exists());
        assert!(!l.config.output_dir.join("weird_1.ndjson").exists());
    }

    #[test]
    fn non_data_entries_are_skipped() {
        let l = layout();
        put(&l.config.data_dir, "README.md", "notes");
        put(&l.config.data_dir, "fmt_1.txt.bak", "007T\n");
        fs::create_dir(l.config.data_dir.join("nested_dir.txt")).unwrap();

        let report = run(&l.config).unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.skipped,
            vec!["README.md", "fmt_1.txt.bak", "nested_dir.txt"]
        );
        assert!(report.converted.is_empty());
    }

    #[test]
    fn empty_data_dir_creates_output_dir_only() {
        let l = layout();
        let report = run(&l.config).unwrap();
        assert!(report.is_success());
        assert!(l.config.output_dir.is_dir());
        assert_eq!(fs::read_dir(&l.config.output_dir).unwrap().count(), 0);

        // Second run over an existing output directory is fine.
        assert!(run(&l.config).unwrap().is_success());
    }

    #[test]
    fn custom_suffix_selects_data_files() {
        let mut l = layout();
        l.config.data_suffix = "dat".to_string();
        put(&l.config.specs_dir, "fmt.csv", ID_FLAG);
        put(&l.config.data_dir, "fmt_1.dat", "007T\n");
        put(&l.config.data_dir, "fmt_2.txt", "007T\n");

        let report = run(&l.config).unwrap();
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.skipped, vec!["fmt_2.txt"]);
        assert!(l.config.output_dir.join("fmt_1.ndjson").is_file());
    }

    #[test]
    fn missing_data_dir_aborts_batch() {
        let l = layout();
        let mut config = l.config.clone();
        config.data_dir = config.data_dir.join("absent");
        assert!(run(&config).is_err());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn overflowing_spec_widths_fail_only_that_file() {
        let l = layout();
        put(
            &l.config.specs_dir,
            "big.csv",
            &format!("column name,width,datatype\na,{},TEXT\nb,1,TEXT\n", usize::MAX),
        );
        put(&l.config.specs_dir, "ok.csv", ID_FLAG);
        put(&l.config.data_dir, "big_1.txt", "xy\n");
        put(&l.config.data_dir, "ok_1.txt", "007T\n");

        let report = run(&l.config).unwrap();
        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.converted[0].data_file, "ok_1.txt");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "big_1.txt");
        assert_eq!(report.failed[0].1.kind(), "format");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_data_file_is_converted() {
        let l = layout();
        put(&l.config.specs_dir, "fmt.csv", ID_FLAG);
        let real = l.config.data_dir.parent().unwrap().join("real.txt");
        fs::write(&real, "007T\n").unwrap();
        std::os::unix::fs::symlink(&real, l.config.data_dir.join("fmt_1.txt")).unwrap();
        std::os::unix::fs::symlink(
            l.config.data_dir.parent().unwrap().join("gone.txt"),
            l.config.data_dir.join("fmt_2.txt"),
        )
        .unwrap();

        let report = run(&l.config).unwrap();
        let converted: Vec<_> = report.converted.iter().map(|o| o.data_file.as_str()).collect();
        assert_eq!(converted, vec!["fmt_1.txt"]);
        assert_eq!(report.skipped, vec!["fmt_2.txt"]);
        assert_eq!(
            fs::read_to_string(l.config.output_dir.join("fmt_1.ndjson")).unwrap(),
            "{\"id\":7,\"flag\":true}\n"
        );
    }
}
