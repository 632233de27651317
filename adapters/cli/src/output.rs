//! Artefacts written for the plotting collaborators.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use clr_landscape_core::{RunKey, SnapshotGrid};
use clr_landscape_system_season::{BatchResult, RunResult, RunSink, SinkError, SweepResult};

/// Writes per-run snapshot maps, metric tables, and per-batch returns as CSV
/// files into a single directory.
#[derive(Clone, Debug)]
pub(crate) struct CsvDirectorySink {
    root: PathBuf,
}

impl CsvDirectorySink {
    /// Creates the output directory if needed.
    pub(crate) fn create(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn write_csv<F>(&self, name: String, body: F) -> Result<(), SinkError>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        let path = self.root.join(name);
        let result = File::create(&path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            body(&mut writer)?;
            writer.flush()
        });
        result.map_err(|source| SinkError::Io { path, source })
    }
}

impl RunSink for CsvDirectorySink {
    fn snapshot(&self, key: &RunKey, grid: &SnapshotGrid) -> Result<(), SinkError> {
        let name = format!("map-{}-{}-{}.csv", grid.day(), key.run, key.combination());
        self.write_csv(name, |writer| {
            for row in grid.rows() {
                let line: Vec<String> = row.iter().map(u8::to_string).collect();
                writeln!(writer, "{}", line.join(","))?;
            }
            Ok(())
        })
    }

    fn run_completed(&self, result: &RunResult) -> Result<(), SinkError> {
        let name = format!("results-{}-{}.csv", result.key.run, result.key.combination());
        self.write_csv(name, |writer| {
            writeln!(
                writer,
                "day,infectivity_score,infected_cell_count,infected_plant_count"
            )?;
            for metric in &result.metrics {
                writeln!(
                    writer,
                    "{},{},{},{}",
                    metric.day,
                    metric.infectivity_score,
                    metric.infected_cell_count,
                    metric.infected_plant_count
                )?;
            }
            Ok(())
        })
    }

    fn batch_completed(&self, batch: &BatchResult) -> Result<(), SinkError> {
        let name = format!("returns-{}.csv", batch.combination());
        self.write_csv(name, |writer| {
            writeln!(writer, "run,harvest")?;
            for (harvest, run) in batch.returns() {
                writeln!(writer, "{run},{harvest}")?;
            }
            Ok(())
        })
    }
}

/// Writes every batch of the sweep as pretty-printed JSON.
pub(crate) fn write_summary(path: &Path, sweep: &SweepResult) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, sweep)?;
    writer.flush()?;
    Ok(())
}
