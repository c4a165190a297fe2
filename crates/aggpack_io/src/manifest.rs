//! Sweep manifest: one JSON document listing every run of a sweep.

use crate::error::Result;
use crate::serialization::{read_json_file, write_json_file};
use aggpack_core::config::SweepConfig;
use aggpack_core::sweep::{RunSummary, SweepSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Files written for one run, relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFiles {
    pub csv: Option<String>,
    pub obj: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(flatten)]
    pub summary: RunSummary,
    #[serde(flatten)]
    pub files: RunFiles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
    pub base_seed: u64,
    pub total_runs: usize,
    pub completed: usize,
    pub skipped: usize,
    pub elapsed_s: f64,
    pub config: SweepConfig,
    pub runs: Vec<ManifestEntry>,
    /// Why the sweep stopped early. Only the listed runs have valid output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl RunManifest {
    /// Joins the sweep summary with the files each run produced.
    #[must_use]
    pub fn new(
        config: &SweepConfig,
        summary: &SweepSummary,
        files: &HashMap<usize, RunFiles>,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            fingerprint: summary.fingerprint.clone(),
            base_seed: summary.base_seed,
            total_runs: summary.total_runs,
            completed: summary.completed,
            skipped: summary.skipped,
            elapsed_s: summary.elapsed_s,
            config: config.clone(),
            runs: summary
                .runs
                .iter()
                .map(|run| ManifestEntry {
                    summary: run.clone(),
                    files: files.get(&run.index).cloned().unwrap_or_default(),
                })
                .collect(),
            aborted: None,
        }
    }

    /// Marks the manifest as written by a sweep that stopped on `reason`.
    #[must_use]
    pub fn with_aborted(mut self, reason: impl Into<String>) -> Self {
        self.aborted = Some(reason.into());
        self
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_file(path)
    }
}

/// `<prefix>_manifest.json`
#[must_use]
pub fn manifest_file_name(prefix: &str) -> String {
    format!("{prefix}_manifest.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggpack_core::sweep::RunStatus;
    use aggpack_data::ParameterSet;

    fn summary() -> SweepSummary {
        let params = ParameterSet {
            particle_radius: 1.0,
            particles_per_aggregate: 2,
            aggregate_count: 10,
            jump_chance: 0.5,
            density: 1.5,
            field_strength: -500.0,
            frames: 3,
        };
        SweepSummary {
            fingerprint: "abc".to_string(),
            base_seed: 42,
            total_runs: 2,
            completed: 1,
            skipped: 1,
            elapsed_s: 0.5,
            runs: vec![
                RunSummary {
                    index: 0,
                    name: "run_a".to_string(),
                    params,
                    seed: 42,
                    attempts: 1,
                    status: RunStatus::Completed,
                    frames: 3,
                    final_packing_fraction: Some(0.2),
                    duration_s: 0.2,
                },
                RunSummary {
                    index: 1,
                    name: "run_b".to_string(),
                    params,
                    seed: 43,
                    attempts: 1,
                    status: RunStatus::Skipped {
                        error_kind: "placement_exhausted".to_string(),
                        message: "no room".to_string(),
                    },
                    frames: 0,
                    final_packing_fraction: None,
                    duration_s: 0.3,
                },
            ],
        }
    }

    #[test]
    fn test_entries_carry_files() {
        let mut files = HashMap::new();
        files.insert(
            0,
            RunFiles {
                csv: Some("run_a.csv".to_string()),
                obj: None,
            },
        );
        let manifest = RunManifest::new(&SweepConfig::default(), &summary(), &files);
        assert_eq!(manifest.runs.len(), 2);
        assert_eq!(manifest.runs[0].files.csv.as_deref(), Some("run_a.csv"));
        assert_eq!(manifest.runs[1].files, RunFiles::default());
    }

    #[test]
    fn test_status_is_flattened() {
        let manifest = RunManifest::new(&SweepConfig::default(), &summary(), &HashMap::new());
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["runs"][0]["status"], "completed");
        assert_eq!(json["runs"][1]["status"], "skipped");
        assert_eq!(json["runs"][1]["error_kind"], "placement_exhausted");
    }

    #[test]
    fn test_aborted_marker_only_when_set() {
        let manifest = RunManifest::new(&SweepConfig::default(), &summary(), &HashMap::new());
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("aborted").is_none());

        let json = serde_json::to_value(manifest.with_aborted("run_b failed")).unwrap();
        assert_eq!(json["aborted"], "run_b failed");
        let back: RunManifest = serde_json::from_value(json).unwrap();
        assert_eq!(back.aborted.as_deref(), Some("run_b failed"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(manifest_file_name("agg"), "agg_manifest.json");
    }
}
