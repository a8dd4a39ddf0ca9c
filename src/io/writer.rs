//! Frame persistence with all-or-nothing commit.

use crate::core::FeatureFrame;
use crate::error::{PipelineError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Write `frame` as CSV: `unique_id`, `ds`, `y` (if present), then feature columns.
pub fn write_frame_csv<W: Write>(frame: &FeatureFrame, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(frame.column_names())?;

    let y = frame.y();
    for row in 0..frame.height() {
        let mut record = Vec::with_capacity(3 + frame.columns().len());
        record.push(frame.unique_id()[row].clone());
        record.push(frame.ds()[row].format("%Y-%m-%d").to_string());
        if let Some(y) = y {
            record.push(y[row].to_string());
        }
        record.extend(frame.columns().iter().map(|(_, c)| c.render(row)));
        out.write_record(&record)?;
    }
    out.flush()
        .map_err(|e| PipelineError::Csv(format!("flush failed: {e}")))?;
    Ok(())
}

/// Output files written into a staging directory and moved into place on commit.
///
/// Dropping an uncommitted stage removes the staging directory, so a failed
/// run leaves no new files behind.
#[derive(Debug)]
pub struct OutputStage {
    output_dir: PathBuf,
    staging_dir: PathBuf,
    files: Vec<String>,
    committed: bool,
}

impl OutputStage {
    /// Create `output_dir` if needed and a fresh staging directory inside it.
    pub fn create(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| PipelineError::io(&output_dir, e))?;

        let staging_dir = output_dir.join(format!(".staging-{}", std::process::id()));
        if staging_dir.exists() {
            fs::remove_dir_all(&staging_dir).map_err(|e| PipelineError::io(&staging_dir, e))?;
        }
        fs::create_dir(&staging_dir).map_err(|e| PipelineError::io(&staging_dir, e))?;

        Ok(Self {
            output_dir,
            staging_dir,
            files: Vec::new(),
            committed: false,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Names of the files staged so far.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Stage a frame as `name`.
    pub fn write_frame(&mut self, name: &str, frame: &FeatureFrame) -> Result<()> {
        let path = self.staged_path(name)?;
        let file = fs::File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
        write_frame_csv(frame, std::io::BufWriter::new(file))?;
        debug!(file = name, rows = frame.height(), "staged frame");
        self.files.push(name.to_string());
        Ok(())
    }

    /// Stage a text file as `name`.
    pub fn write_text(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.staged_path(name)?;
        fs::write(&path, contents).map_err(|e| PipelineError::io(&path, e))?;
        self.files.push(name.to_string());
        Ok(())
    }

    fn staged_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || self.files.iter().any(|f| f == name) {
            return Err(PipelineError::Config(format!(
                "invalid or duplicate output file name '{name}'"
            )));
        }
        Ok(self.staging_dir.join(name))
    }

    /// Move every staged file into the output directory.
    ///
    /// If a move fails, files already moved by this call are removed again
    /// before the error is returned. A file that replaced an older output of
    /// the same name cannot be restored.
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(self.files.len());
        for name in &self.files {
            let from = self.staging_dir.join(name);
            let to = self.output_dir.join(name);
            if let Err(e) = fs::rename(&from, &to) {
                for moved in &written {
                    if let Err(err) = fs::remove_file(moved) {
                        warn!(file = %moved.display(), error = %err, "failed to roll back output file");
                    }
                }
                return Err(PipelineError::io(&to, e));
            }
            written.push(to);
        }
        self.committed = true;
        fs::remove_dir_all(&self.staging_dir)
            .map_err(|e| PipelineError::io(&self.staging_dir, e))?;
        info!(
            dir = %self.output_dir.display(),
            files = written.len(),
            "committed output files"
        );
        Ok(written)
    }
}

impl Drop for OutputStage {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
            warn!(dir = %self.staging_dir.display(), error = %e, "failed to remove staging directory");
        } else if !self.files.is_empty() {
            warn!(
                dir = %self.output_dir.display(),
                discarded = self.files.len(),
                "discarded uncommitted output"
            );
        }
    }
}
