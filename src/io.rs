use std::fmt::Display;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::time::Instant;

use camino::Utf8Path;
use console::Style;

use crate::error::LoadError;
use crate::input::InputRecord;
use crate::output::Evaluation;

const ANSI_BLUE: Style = Style::new().blue();

pub fn as_overhead(s: Instant) -> impl Display {
    let e = Instant::now();
    let f = format!("(+{}ms)", e.duration_since(s).as_millis());
    ANSI_BLUE.apply_to(f)
}

/// Read a JSON input record.
pub fn load_input(path: &Utf8Path) -> Result<InputRecord, LoadError> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn is_cbor(path: &Utf8Path) -> bool {
    path.extension() == Some("cbor")
}

/// Read a snapshot, CBOR when the extension is `.cbor` and JSON otherwise.
pub fn load_snapshot(path: &Utf8Path) -> Result<Evaluation, LoadError> {
    let reader = BufReader::new(fs::File::open(path)?);
    if is_cbor(path) {
        Ok(ciborium::from_reader(reader)?)
    } else {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Write a snapshot, CBOR when the extension is `.cbor` and pretty JSON otherwise.
pub fn save_snapshot(evaluation: &Evaluation, path: &Utf8Path) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(fs::File::create(path)?);
    if is_cbor(path) {
        ciborium::into_writer(evaluation, writer)?;
    } else {
        serde_json::to_writer_pretty(writer, evaluation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Year;
    use crate::evaluate;
    use camino::Utf8PathBuf;

    fn temp(name: &str) -> Utf8PathBuf {
        let dir = std::env::temp_dir().join(format!("formulary-io-{}", std::process::id()));
        Utf8PathBuf::from_path_buf(dir.join(name)).unwrap()
    }

    #[test]
    fn test_snapshot_formats() {
        let input = InputRecord::default();
        let evaluation = evaluate(&input, Year::Y2024).unwrap();

        for name in ["snapshot.json", "snapshot.cbor"] {
            let path = temp(name);
            save_snapshot(&evaluation, &path).unwrap();
            let loaded = load_snapshot(&path).unwrap();
            assert_eq!(loaded.year, evaluation.year);
            assert_eq!(loaded.units, evaluation.units);
            assert_eq!(loaded.summary, evaluation.summary);
            fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_overhead_shows_millis() {
        let text = as_overhead(Instant::now()).to_string();
        assert!(text.contains("(+"));
        assert!(text.contains("ms)"));
    }

    #[test]
    fn test_load_input_reports_bad_json() {
        let path = temp("broken.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_input(&path), Err(LoadError::Json(_))));
        fs::remove_file(&path).unwrap();
    }
}
