use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::pipeline::stage4_rank::RankedTable;
use crate::pipeline::stage5_partition::Stage5Output;
use crate::report::RunSummary;
use crate::report::json::render_summary_json;

pub fn ranked_file_name(output: &str) -> String {
    format!("{output}.csv")
}

pub fn shard_file_name(output: &str, offset: usize) -> String {
    format!("{output}_subjectset_{offset}.csv")
}

pub fn summary_file_name(output: &str) -> String {
    format!("{output}_summary.json")
}

/// Files staged by one run. Each is written under a `.partial` name next to its
/// destination and only renamed into place by `commit`; dropping the set
/// uncommitted removes the staged files and leaves earlier outputs untouched.
pub struct OutputSet {
    staged: Vec<(PathBuf, PathBuf)>,
    committed: bool,
}

impl OutputSet {
    pub fn new(out_dir: &Path) -> Result<Self> {
        fs::create_dir_all(out_dir).map_err(|source| Error::Output {
            path: out_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            staged: Vec::new(),
            committed: false,
        })
    }

    pub fn write_csv(&mut self, path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        let staging = staging_path(path);
        let res = write_csv(&staging, header, rows);
        self.track(path, staging, res)
    }

    pub fn write_text(&mut self, path: &Path, text: &str) -> Result<()> {
        let staging = staging_path(path);
        let res = write_text(&staging, text);
        self.track(path, staging, res)
    }

    fn track(&mut self, path: &Path, staging: PathBuf, res: std::io::Result<()>) -> Result<()> {
        // Staging names belong to this run; a failed create is still cleaned up.
        self.staged.push((staging, path.to_path_buf()));
        res.map_err(|source| Error::Output {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Moves every staged file onto its destination, replacing older outputs.
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let mut done = Vec::with_capacity(self.staged.len());
        for (staging, path) in &self.staged {
            fs::rename(staging, path).map_err(|source| Error::Output {
                path: path.clone(),
                source,
            })?;
            done.push(path.clone());
        }
        self.committed = true;
        Ok(done)
    }
}

impl Drop for OutputSet {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for (staging, _) in &self.staged {
            if fs::remove_file(staging).is_ok() {
                tracing::warn!(path = %staging.display(), "removed partial output");
            }
        }
    }
}

pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

pub fn write_ranked(outputs: &mut OutputSet, out_dir: &Path, output: &str, ranked: &RankedTable) -> Result<PathBuf> {
    let path = out_dir.join(ranked_file_name(output));
    outputs.write_csv(&path, &ranked.columns, &ranked.rows)?;
    tracing::info!(path = %path.display(), rows = ranked.n_rows(), "ranked table written");
    Ok(path)
}

pub fn write_shards(
    outputs: &mut OutputSet,
    out_dir: &Path,
    output: &str,
    partition: &Stage5Output,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(partition.shards.len());
    for shard in &partition.shards {
        let path = out_dir.join(shard_file_name(output, shard.offset));
        outputs.write_csv(&path, &partition.columns, &shard.rows)?;
        paths.push(path);
    }
    tracing::info!(shards = paths.len(), dir = %out_dir.display(), "subject sets written");
    Ok(paths)
}

pub fn write_summary(outputs: &mut OutputSet, out_dir: &Path, output: &str, summary: &RunSummary) -> Result<PathBuf> {
    let path = out_dir.join(summary_file_name(output));
    let json = render_summary_json(summary).map_err(|e| Error::Output {
        path: path.clone(),
        source: e.into(),
    })?;
    outputs.write_text(&path, &json)?;
    Ok(path)
}

fn write_csv(path: &Path, header: &[String], rows: &[Vec<String>]) -> std::io::Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut w = csv::Writer::from_writer(file);
    w.write_record(header)?;
    for row in rows {
        w.write_record(row)?;
    }
    w.flush()?;
    Ok(())
}

fn write_text(path: &Path, text: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(text.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_write.rs"]
mod tests;
