//! Download targets from a LAADS archive CSV manifest.

use std::path::Path;

use log::warn;

use super::{filename_from_url, join_url, DownloadTarget, FetchError};

/// Column holding archive path fragments in manifests exported from the
/// LAADS search UI.
pub const DEFAULT_URL_COLUMN: &str = "fileUrls for custom selected";

pub const LAADS_BASE_URL: &str = "https://ladsweb.modaps.eosdis.nasa.gov";

/// Read a manifest CSV and build one download target per non-empty row of
/// the URL column. Rows whose fragment yields no filename are skipped with
/// a warning.
pub fn targets_from_csv(
    path: &Path,
    column: &str,
    base_url: &str,
    dest_dir: &Path,
    token: Option<&str>,
) -> Result<Vec<DownloadTarget>, FetchError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let index = match headers.iter().position(|h| h == column) {
        Some(index) => index,
        None => {
            return Err(FetchError::MissingColumn {
                column: column.to_string(),
                available: headers.iter().map(str::to_string).collect(),
            });
        }
    };

    let mut targets = Vec::new();

    for record in reader.records() {
        let record = record?;

        let fragment = match record.get(index) {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => continue,
        };

        let url = join_url(base_url, fragment);
        let filename = match filename_from_url(&url) {
            Some(name) => name,
            None => {
                warn!("Skipping manifest row with no filename: {}", fragment);
                continue;
            }
        };

        targets.push(DownloadTarget {
            url,
            dest: dest_dir.join(filename),
            token: token.map(str::to_string),
        });
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_manifest(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("manifest.csv");
        let mut file = File::create(&path).expect("Failed to create manifest");
        file.write_all(contents.as_bytes()).expect("Failed to write manifest");
        (dir, path)
    }

    #[test]
    fn test_targets_from_csv() {
        let (_dir, path) = write_manifest(
            "name,fileUrls for custom selected,size\n\
             a,/archive/allData/61/MOD021KM/2024/153/MOD021KM.A2024153.1655.061.hdf,12\n\
             b,/archive/allData/61/MOD021KM/2024/153/MOD021KM.A2024153.1835.061.hdf,15\n",
        );

        let targets = targets_from_csv(
            &path,
            DEFAULT_URL_COLUMN,
            LAADS_BASE_URL,
            Path::new("/data/modis"),
            Some("token-value"),
        )
        .expect("Failed to read manifest");

        assert_eq!(targets.len(), 2);
        assert_eq!(
            targets[0].url,
            "https://ladsweb.modaps.eosdis.nasa.gov/archive/allData/61/MOD021KM/2024/153/MOD021KM.A2024153.1655.061.hdf"
        );
        assert_eq!(
            targets[0].dest,
            Path::new("/data/modis/MOD021KM.A2024153.1655.061.hdf")
        );
        assert_eq!(targets[0].token.as_deref(), Some("token-value"));
    }

    #[test]
    fn test_missing_column_lists_available() {
        let (_dir, path) = write_manifest("name,url\na,/archive/file.hdf\n");

        let result = targets_from_csv(
            &path,
            DEFAULT_URL_COLUMN,
            LAADS_BASE_URL,
            Path::new("/data/modis"),
            None,
        );

        match result {
            Err(FetchError::MissingColumn { column, available }) => {
                assert_eq!(column, DEFAULT_URL_COLUMN);
                assert_eq!(available, vec!["name".to_string(), "url".to_string()]);
            }
            other => panic!("Expected missing column error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_rows_skipped() {
        let (_dir, path) = write_manifest(
            "fileUrls for custom selected\n/archive/one.hdf\n\n   \n/archive/two.hdf\n",
        );

        let targets = targets_from_csv(
            &path,
            DEFAULT_URL_COLUMN,
            LAADS_BASE_URL,
            Path::new("/data/modis"),
            None,
        )
        .expect("Failed to read manifest");

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].dest, Path::new("/data/modis/two.hdf"));
    }
}
