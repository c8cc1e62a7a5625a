use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::config::LogConfig;
use crate::error::{ErrorKind, Result};
use crate::request::RequestContext;

/// Appends entries to the log files of one output directory.
///
/// Every file is opened in append mode per entry, so several processes (or
/// several loggers) can write to the same file.
#[derive(Clone, Debug)]
pub struct Logger {
    config: LogConfig,
}

impl Logger {
    /// Validates `config` and creates its output directory if needed.
    pub fn new(config: LogConfig) -> Result<Self> {
        config.validate()?;

        if !config.output_dir.is_dir() {
            fs::create_dir_all(&config.output_dir)
                .map_err(|e| ErrorKind::io_at(&config.output_dir, e))?;

            log::debug!("created log directory {}", config.output_dir.display());
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Appends a single line of text.
    pub fn line(&self, file: &str, data: &str, autodate: bool) -> Result<()> {
        let mut entry = String::new();

        if autodate {
            entry.push_str(&self.timestamp());
        }

        entry.push_str(data);
        entry.push_str(&self.config.endl);

        self.append(file, &entry)
    }

    /// Collapses every whitespace run to one space, then appends the result
    /// as a single line. Meant for SQL and markup built across many source
    /// lines.
    pub fn compact(&self, file: &str, data: &str, autodate: bool) -> Result<()> {
        self.line(file, &compact(data), autodate)
    }

    /// Appends a multi-line block followed by the separator line.
    pub fn block(&self, file: &str, data: &str, autodate: bool) -> Result<()> {
        let endl = &self.config.endl;
        let mut entry = String::new();

        if autodate {
            entry.push_str(&self.timestamp());
            entry.push_str(endl);
        }

        entry.push_str(data);
        entry.push_str(endl);
        entry.push_str(&self.config.new_block);
        entry.push_str(endl);

        self.append(file, &entry)
    }

    /// Appends the pretty `Debug` form of `data` as a block.
    pub fn debug<T: Debug + ?Sized>(&self, file: &str, data: &T, autodate: bool) -> Result<()> {
        let dump = format!("{:#?}", data).replace('\n', &self.config.endl);

        self.block(file, &dump, autodate)
    }

    /// Appends the sections of `context` named by `selector` (letters of
    /// `SGPFRNEC`) as one block. Nothing is written if any letter fails.
    pub fn request(
        &self,
        file: &str,
        selector: &str,
        context: &RequestContext,
        autodate: bool,
    ) -> Result<()> {
        let dumps = context.render(selector, &self.config.endl)?;

        self.block(file, &dumps.join(&self.config.endl), autodate)
    }

    /// `prefix + file + suffix`
    pub fn filename(&self, file: &str) -> String {
        format!(
            "{}{}{}",
            self.config.filename_prefix, file, self.config.filename_suffix
        )
    }

    pub fn filepath(&self, file: &str) -> PathBuf {
        self.config.output_dir.join(self.filename(file))
    }

    pub fn delete(&self, file: &str) -> Result<()> {
        let path = self.filepath(file);

        fs::remove_file(&path).map_err(|e| ErrorKind::io_at(path, e))
    }

    fn timestamp(&self) -> String {
        Local::now().format(&self.config.time_format).to_string()
    }

    fn append(&self, file: &str, entry: &str) -> Result<()> {
        let path = self.filepath(file);

        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ErrorKind::io_at(&path, e))?;

        out.write_all(entry.as_bytes())
            .map_err(|e| ErrorKind::io_at(&path, e))
    }
}

/// Replaces every run of whitespace (newlines and tabs included) with a
/// single space. Leading and trailing runs are kept as one space each.
pub fn compact(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    let mut in_space = false;

    for c in data.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }

            in_space = true;
        }
        else {
            out.push(c);
            in_space = false;
        }
    }

    out
}
