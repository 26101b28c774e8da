//! Result columns written to text files, one value per line.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::config::OutputConfig;
use crate::sweep::SweepRecord;

/// Write the resolution, tree search time and brute-force time columns.
pub fn write(output: &OutputConfig, records: &[SweepRecord]) -> anyhow::Result<()> {
    std::fs::create_dir_all(&output.directory)
        .with_context(|| format!("creating {}", output.directory.display()))?;

    write_column(
        &output.directory.join(&output.resolution_file),
        records.iter().map(|r| format!("{:e}", r.resolution)),
    )?;
    write_column(
        &output.directory.join(&output.time_file),
        records.iter().map(|r| r.search_ns.to_string()),
    )?;
    write_column(
        &output.directory.join(&output.brute_file),
        records.iter().map(|r| r.brute_ns.to_string()),
    )?;
    Ok(())
}

fn write_column(path: &Path, values: impl Iterator<Item = String>) -> anyhow::Result<()> {
    let mut contents = String::new();
    let mut lines = 0;
    for value in values {
        contents.push_str(&value);
        contents.push('\n');
        lines += 1;
    }
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    debug!("Wrote {} lines to {}", lines, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(resolution: f64, search_ns: u128, brute_ns: u128) -> SweepRecord {
        SweepRecord {
            resolution,
            search_ns,
            brute_ns,
            insert_ns: 0,
            nodes: 1,
            max_depth: 0,
            candidates: 0,
            matches: 0,
            missing: 0,
        }
    }

    #[test]
    fn test_write_three_columns() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            directory: dir.path().join("results"),
            ..OutputConfig::default()
        };
        let records = [record(0.5, 120, 9000), record(1.0, 80, 9100)];

        write(&output, &records).unwrap();

        let read = |name: &str| std::fs::read_to_string(output.directory.join(name)).unwrap();
        assert_eq!(read("quadtree_resolution.txt"), "5e-1\n1e0\n");
        assert_eq!(read("quadtree_time.txt"), "120\n80\n");
        assert_eq!(read("quadtree_brute.txt"), "9000\n9100\n");
    }
}
