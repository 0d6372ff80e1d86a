use std::fs;
use std::path::Path;

use crate::error::{ModelError, Result};

// Observed pond-depth-vs-time record from a falling head test.
// Immutable after load; rows stay in file order (not re-sorted).
#[derive(Clone, Debug)]
pub struct DataSet {
    pub times: Vec<f64>,  // Measurement times [time units of the test]
    pub depths: Vec<f64>, // Pond depth at each time [length units of the test]
    pub start: f64,       // min(times)
    pub end: f64,         // max(times)
}

impl DataSet {
    pub fn new(times: Vec<f64>, depths: Vec<f64>) -> Result<Self> {
        if times.is_empty() || times.len() != depths.len() {
            return Err(ModelError::Parse {
                line: 0,
                message: format!(
                    "need equal, nonzero time/depth counts, got {} and {}",
                    times.len(),
                    depths.len()
                ),
            });
        }
        let start = times.iter().copied().fold(f64::INFINITY, f64::min);
        let end = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(DataSet {
            times,
            depths,
            start,
            end,
        })
    }

    // Load "<name>.txt" under dir. First line is a header and is discarded;
    // every following line must hold two whitespace-separated numeric fields.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!("{name}.txt"));
        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelError::NotFound(name.to_string())
            } else {
                ModelError::Io(e)
            }
        })?;

        let mut times = Vec::new();
        let mut depths = Vec::new();
        for (i, line) in text.lines().enumerate().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(ModelError::Parse {
                    line: i + 1,
                    message: format!("expected 2 columns, got {}", fields.len()),
                });
            }
            let t: f64 = fields[0].parse().map_err(|_| ModelError::Parse {
                line: i + 1,
                message: format!("non-numeric time '{}'", fields[0]),
            })?;
            let h: f64 = fields[1].parse().map_err(|_| ModelError::Parse {
                line: i + 1,
                message: format!("non-numeric depth '{}'", fields[1]),
            })?;
            times.push(t);
            depths.push(h);
        }
        if times.is_empty() {
            return Err(ModelError::Parse {
                line: text.lines().count(),
                message: "no data rows".to_string(),
            });
        }
        Self::new(times, depths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("percolation_dataset_{tag}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_two_column_file_and_skips_header() {
        let dir = temp_dir("load");
        fs::write(dir.join("pond.txt"), "t\th\n0.0\t0.50\n10.0\t0.32\n100.0\t0.10\n").unwrap();
        let set = DataSet::load(&dir, "pond").unwrap();
        assert_eq!(set.times, vec![0.0, 10.0, 100.0]);
        assert_eq!(set.depths, vec![0.50, 0.32, 0.10]);
        assert_eq!(set.start, 0.0);
        assert_eq!(set.end, 100.0);
    }

    #[test]
    fn domain_from_min_max_even_when_unsorted() {
        let set = DataSet::new(vec![50.0, 0.0, 100.0], vec![0.3, 0.5, 0.1]).unwrap();
        assert_eq!(set.start, 0.0);
        assert_eq!(set.end, 100.0);
        // Row order is preserved as read
        assert_eq!(set.times[0], 50.0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = temp_dir("missing");
        match DataSet::load(&dir, "absent") {
            Err(ModelError::NotFound(name)) => assert_eq!(name, "absent"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let dir = temp_dir("malformed");
        fs::write(dir.join("bad.txt"), "t\th\n0.0\t0.50\n5.0\tnope\n").unwrap();
        match DataSet::load(&dir, "bad") {
            Err(ModelError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn wrong_column_count_is_parse_error() {
        let dir = temp_dir("columns");
        fs::write(dir.join("bad.txt"), "t\th\n0.0\t0.50\t9.9\n").unwrap();
        assert!(matches!(
            DataSet::load(&dir, "bad"),
            Err(ModelError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn header_only_file_is_rejected() {
        let dir = temp_dir("empty");
        fs::write(dir.join("empty.txt"), "t\th\n").unwrap();
        assert!(matches!(DataSet::load(&dir, "empty"), Err(ModelError::Parse { .. })));
    }
}
