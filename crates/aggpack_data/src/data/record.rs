use serde::{Deserialize, Serialize};

/// One row of a run's time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame index, starting at 0.
    pub time: u32,
    /// Total solid volume of all aggregates. Constant within a run.
    pub aggregate_volume: f64,
    pub bounding_radius: f64,
    /// Ratio in (0, 1] or a percentage, depending on the run's unit setting.
    pub packing_fraction: f64,
    /// Farthest surface point from the bounding-sphere center.
    pub max_radius: f64,
}

/// The parameters of one sweep combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub particle_radius: f64,
    pub particles_per_aggregate: usize,
    pub aggregate_count: usize,
    pub jump_chance: f64,
    pub density: f64,
    pub field_strength: f64,
    pub frames: u32,
}

impl ParameterSet {
    /// Deterministic output name for this combination, e.g.
    /// `aggregate_data_Np_5_Na_500_jc0p25`. Every `.` becomes `p` so the
    /// stem is safe to extend with a file extension.
    #[must_use]
    pub fn file_stem(&self, prefix: &str) -> String {
        format!(
            "{prefix}_Np_{}_Na_{}_jc{}",
            self.particles_per_aggregate,
            self.aggregate_count,
            format_decimal(self.jump_chance)
        )
        .replace('.', "p")
    }
}

/// Formats a float with at least one fractional digit (`1.0` stays `1.0`,
/// `0.25` stays `0.25`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(jump_chance: f64) -> ParameterSet {
        ParameterSet {
            particle_radius: 1.0,
            particles_per_aggregate: 5,
            aggregate_count: 500,
            jump_chance,
            density: 1.5,
            field_strength: -500.0,
            frames: 800,
        }
    }

    #[test]
    fn test_file_stem_replaces_dots() {
        assert_eq!(
            params(0.25).file_stem("aggregate_data"),
            "aggregate_data_Np_5_Na_500_jc0p25"
        );
    }

    #[test]
    fn test_file_stem_whole_number_jump_chance() {
        assert_eq!(params(1.0).file_stem("run"), "run_Np_5_Na_500_jc1p0");
        assert_eq!(params(0.0).file_stem("run"), "run_Np_5_Na_500_jc0p0");
    }

    #[test]
    fn test_file_stem_prefix_dots() {
        assert_eq!(params(0.5).file_stem("v1.2"), "v1p2_Np_5_Na_500_jc0p5");
    }
}
