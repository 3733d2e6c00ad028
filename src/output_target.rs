/// Input/output path checks for a run.
use std::path::{Path, PathBuf};

use crate::batch_processor::is_gpx_file;
use crate::error::{Result, TramosError};

/// Default plan file name when the input is a folder.
pub const DEFAULT_PLAN_FILENAME: &str = "CalculadorDeTramos.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    SingleTrack(PathBuf),
    Folder(PathBuf),
}

pub fn classify_input(input: &Path) -> Result<InputKind> {
    if input.is_dir() {
        Ok(InputKind::Folder(input.to_path_buf()))
    } else if input.is_file() && is_gpx_file(input) {
        Ok(InputKind::SingleTrack(input.to_path_buf()))
    } else {
        Err(TramosError::InvalidInput(format!(
            "{} must be an existing .gpx file or a folder",
            input.display()
        )))
    }
}

/// Where the plan is written. A missing output is derived from the input; a
/// `.csv` extension is appended when absent. The parent folder must exist.
pub fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let mut path = match output {
        Some(path) => path.to_path_buf(),
        None if input.is_dir() => input.join(DEFAULT_PLAN_FILENAME),
        None => input.with_extension("csv"),
    };

    let has_csv_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !has_csv_extension {
        let mut name = path.clone().into_os_string();
        name.push(".csv");
        path = PathBuf::from(name);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(TramosError::InvalidOutput(format!(
            "output folder {} does not exist",
            parent.display()
        )));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tramos-output-{}-{}", label, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_output_for_file() {
        let dir = scratch_dir("file");
        let input = dir.join("ruta.gpx");
        fs::write(&input, "").unwrap();
        assert_eq!(resolve_output(&input, None).unwrap(), dir.join("ruta.csv"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_output_for_folder() {
        let dir = scratch_dir("folder");
        assert_eq!(resolve_output(&dir, None).unwrap(), dir.join(DEFAULT_PLAN_FILENAME));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_extension_is_appended() {
        let dir = scratch_dir("extension");
        let input = dir.join("ruta.gpx");
        assert_eq!(
            resolve_output(&input, Some(&dir.join("plan"))).unwrap(),
            dir.join("plan.csv")
        );
        assert_eq!(
            resolve_output(&input, Some(&dir.join("plan.xlsx"))).unwrap(),
            dir.join("plan.xlsx.csv")
        );
        assert_eq!(
            resolve_output(&input, Some(&dir.join("PLAN.CSV"))).unwrap(),
            dir.join("PLAN.CSV")
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_output_folder() {
        let dir = scratch_dir("missing");
        let target = dir.join("no-such-folder").join("plan.csv");
        assert!(matches!(
            resolve_output(&dir, Some(&target)),
            Err(TramosError::InvalidOutput(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_classify_input() {
        let dir = scratch_dir("classify");
        let track = dir.join("ruta.GPX");
        let other = dir.join("ruta.txt");
        fs::write(&track, "").unwrap();
        fs::write(&other, "").unwrap();

        assert_eq!(classify_input(&dir).unwrap(), InputKind::Folder(dir.clone()));
        assert_eq!(classify_input(&track).unwrap(), InputKind::SingleTrack(track.clone()));
        assert!(matches!(classify_input(&other), Err(TramosError::InvalidInput(_))));
        assert!(matches!(
            classify_input(&dir.join("absent.gpx")),
            Err(TramosError::InvalidInput(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
