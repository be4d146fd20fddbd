use crate::{Error, render::RenderedFile};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Materialize the rendered tree under `out_dir`.
///
/// The destructive wipe runs here, strictly after rendering has succeeded:
/// a doomed run must never destroy a previous valid tree. Write failures
/// abort immediately; the error reports how many files landed before the
/// failure, and nothing is rolled back; the destination is a generated-only,
/// disposable directory.
pub fn write_output(out_dir: &Path, files: &[RenderedFile], wipe: bool) -> Result<(), Error> {
    if wipe && out_dir.exists() {
        info!(dir = %out_dir.display(), "wiping output directory");
        fs::remove_dir_all(out_dir).map_err(|source| Error::Write {
            path: out_dir.to_path_buf(),
            written: 0,
            source,
        })?;
    }

    fs::create_dir_all(out_dir).map_err(|source| Error::Write {
        path: out_dir.to_path_buf(),
        written: 0,
        source,
    })?;

    for (written, file) in files.iter().enumerate() {
        let path = out_dir.join(&file.path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Write {
                path: path.clone(),
                written,
                source,
            })?;
        }

        fs::write(&path, &file.contents).map_err(|source| Error::Write {
            path: path.clone(),
            written,
            source,
        })?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote artifact");
    }

    info!(files = files.len(), dir = %out_dir.display(), "output tree written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_output;
    use crate::Error;
    use crate::render::RenderedFile;
    use std::path::PathBuf;

    fn rendered(path: &str, contents: &str) -> RenderedFile {
        RenderedFile {
            path: PathBuf::from(path),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn writes_all_files_under_the_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("models");
        let files = vec![
            rendered("mod.rs", "pub mod user;\n"),
            rendered("user.rs", "pub struct User;\n"),
        ];

        write_output(&out, &files, false).expect("write must succeed");

        assert_eq!(
            std::fs::read_to_string(out.join("user.rs")).unwrap(),
            "pub struct User;\n"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("mod.rs")).unwrap(),
            "pub mod user;\n"
        );
    }

    #[test]
    fn wipe_removes_stale_files_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("models");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale.rs"), "pub struct Stale;\n").unwrap();

        write_output(&out, &[rendered("user.rs", "pub struct User;\n")], true)
            .expect("write must succeed");

        assert!(!out.join("stale.rs").exists());
        assert!(out.join("user.rs").exists());
    }

    #[test]
    fn without_wipe_existing_files_survive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("models");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("keep.rs"), "pub struct Keep;\n").unwrap();

        write_output(&out, &[rendered("user.rs", "x")], false).expect("write must succeed");

        assert!(out.join("keep.rs").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_failure_reports_path_and_progress() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("models");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o555)).unwrap();

        let err = write_output(&out, &[rendered("user.rs", "x")], false)
            .expect_err("read-only destination must fail");

        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(
            err,
            Error::Write { path, written: 0, .. } if path.ends_with("user.rs")
        ));
    }
}
