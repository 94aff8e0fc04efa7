//! CSV tables.

use std::io::Write;

use crate::error::Result;
use crate::simulation::{MonteCarloReport, RealizationResult, Summary};

const COLUMNS: [&str; 15] = [
    "iteration",
    "filler_fraction",
    "percolates",
    "paths",
    "mean_path_length",
    "dfs_hops",
    "electric_conductance",
    "thermal_conductance",
    "youngs_modulus",
    "poisson_ratio",
    "clusters",
    "max_cluster_radius",
    "correlation_length",
    "fdm_conductivity_x",
    "fdm_conductivity_y",
];

/// CSV writer for Monte Carlo results.
pub struct CsvReport<W: Write> {
    out: W,
}

impl<W: Write> CsvReport<W> {
    /// Wrap an output stream.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the header, one row per realization and a trailing summary
    /// row whose iteration column reads `mean`.
    pub fn write_report(&mut self, report: &MonteCarloReport) -> Result<()> {
        self.write_header()?;
        for result in &report.results {
            self.write_result(result)?;
        }
        self.write_summary(&report.summary)?;
        self.out.flush()?;
        Ok(())
    }

    /// Write the column header.
    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", COLUMNS.join(","))?;
        Ok(())
    }

    /// Write one realization row.
    pub fn write_result(&mut self, r: &RealizationResult) -> Result<()> {
        let (fdm_x, fdm_y) = r
            .fdm
            .map_or((String::new(), String::new()), |s| {
                (number(s.conductivity_x()), number(s.conductivity_y()))
            });
        let fields = [
            r.iteration.to_string(),
            number(r.filler_fraction),
            u8::from(r.percolates).to_string(),
            r.path_count().to_string(),
            number(r.mean_path_length()),
            r.dfs_hops.map_or(String::new(), |h| h.to_string()),
            number(r.electric_conductance),
            number(r.thermal_conductance),
            number(r.youngs_modulus()),
            number(r.poisson_ratio()),
            r.clusters
                .as_ref()
                .map_or(String::new(), |c| c.clusters.len().to_string()),
            number(r.max_cluster_radius()),
            number(r.correlation_length()),
            fdm_x,
            fdm_y,
        ];
        writeln!(self.out, "{}", fields.join(","))?;
        Ok(())
    }

    /// Write the summary row.
    pub fn write_summary(&mut self, s: &Summary) -> Result<()> {
        let fields = [
            "mean".to_string(),
            number(s.filler_fraction),
            number(s.percolation_probability),
            number(s.mean_path_count),
            number(s.mean_path_length),
            String::new(),
            number(s.electric_conductance),
            number(s.thermal_conductance),
            number(s.youngs_modulus),
            number(s.poisson_ratio),
            String::new(),
            number(s.max_cluster_radius),
            number(s.correlation_length),
            number(s.fdm_conductivity_x),
            number(s.fdm_conductivity_y),
        ];
        writeln!(self.out, "{}", fields.join(","))?;
        Ok(())
    }

    /// Recover the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn number(value: f64) -> String {
    format!("{:.6e}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::FdmSolution;

    fn result() -> RealizationResult {
        RealizationResult {
            iteration: 2,
            filler_fraction: 0.5,
            percolates: false,
            paths: Vec::new(),
            dfs_hops: None,
            electric_conductance: 0.0,
            thermal_conductance: 0.0,
            clusters: None,
            fdm: Some(FdmSolution {
                current_x: 0.25,
                current_y: 0.5,
                field: (1.0, 1.0),
                iterations: 3,
                residual: 0.0,
                converged: true,
            }),
        }
    }

    #[test]
    fn test_rows_match_header() {
        let mut report = CsvReport::new(Vec::new());
        report.write_header().unwrap();
        report.write_result(&result()).unwrap();
        report.write_summary(&Summary::from_results(&[result()])).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split(',').count(), COLUMNS.len());
        }
        assert!(lines[1].starts_with("2,5.000000e-1,0,0,"));
        assert!(lines[1].ends_with(",2.500000e-1,5.000000e-1"));
        assert!(lines[2].starts_with("mean,"));
    }
}
