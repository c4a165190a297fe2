//! File-backed [`RunSink`]: CSV per run, optional OBJ, manifest at the end.
//! A stopped sweep still gets a manifest, marked aborted, listing the runs
//! whose files were written.

use crate::geometry::write_obj_file;
use crate::manifest::{manifest_file_name, RunFiles, RunManifest};
use crate::timeseries::write_csv_file;
use aggpack_core::config::SweepConfig;
use aggpack_core::sweep::{RunOutcome, RunSink, RunStatus, SweepSummary};
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct FileSink {
    directory: PathBuf,
    config: SweepConfig,
    files: HashMap<usize, RunFiles>,
}

impl FileSink {
    /// Creates the configured output directory if needed.
    pub fn new(config: &SweepConfig) -> anyhow::Result<Self> {
        let directory = PathBuf::from(&config.output.directory);
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("creating output directory {}", directory.display()))?;
        Ok(Self {
            directory,
            config: config.clone(),
            files: HashMap::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.directory
            .join(manifest_file_name(&self.config.output.prefix))
    }

    /// Files written so far, keyed by run index.
    pub fn files(&self) -> &HashMap<usize, RunFiles> {
        &self.files
    }
}

impl RunSink for FileSink {
    fn write_run(&mut self, run: &RunOutcome) -> anyhow::Result<()> {
        if run.status != RunStatus::Completed {
            tracing::debug!(run = %run.name, "No output for skipped run");
            self.files.insert(run.index, RunFiles::default());
            return Ok(());
        }

        let csv = format!("{}.csv", run.name);
        write_csv_file(self.directory.join(&csv), &run.records)?;

        let obj = if self.config.output.export_geometry && !run.final_meshes.is_empty() {
            let obj = format!("{}.obj", run.name);
            write_obj_file(self.directory.join(&obj), &run.final_meshes)?;
            Some(obj)
        } else {
            None
        };

        tracing::info!(run = %run.name, csv = %csv, geometry = obj.is_some(), "Run written");
        self.files.insert(
            run.index,
            RunFiles {
                csv: Some(csv),
                obj,
            },
        );
        Ok(())
    }

    fn finish(&mut self, summary: &SweepSummary) -> anyhow::Result<()> {
        if !self.config.output.write_manifest {
            return Ok(());
        }
        let path = self.manifest_path();
        RunManifest::new(&self.config, summary, &self.files).save(&path)?;
        tracing::info!(path = %path.display(), runs = summary.runs.len(), "Manifest written");
        Ok(())
    }

    fn abort(&mut self, summary: &SweepSummary, error: &anyhow::Error) -> anyhow::Result<()> {
        if !self.config.output.write_manifest {
            return Ok(());
        }
        let path = self.manifest_path();
        RunManifest::new(&self.config, summary, &self.files)
            .with_aborted(format!("{error:#}"))
            .save(&path)?;
        tracing::warn!(path = %path.display(), runs = summary.runs.len(), "Partial manifest written");
        Ok(())
    }
}
