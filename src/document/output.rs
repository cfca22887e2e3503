use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::engine::error::TemplateError;

/// A destination file that only appears once [`PendingOutput::commit`]
/// succeeds.
///
/// The temp file is created next to the destination up front, which doubles
/// as the writability check. Dropping without committing removes it.
pub struct PendingOutput {
    path: PathBuf,
    file: NamedTempFile,
}

impl PendingOutput {
    pub fn create(path: &Path) -> Result<Self, TemplateError> {
        let dir = output_directory(path);
        let mut builder = tempfile::Builder::new();
        builder.prefix(".repair-docs-").suffix(".tmp");
        // Same mode a plain file creation would get: 0o666 less the umask.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let file = builder
            .tempfile_in(&dir)
            .map_err(|source| TemplateError::OutputNotWritable { dir, source })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `bytes` and moves them over the destination. A destination that
    /// already exists keeps its permissions.
    pub fn commit(mut self, bytes: &[u8]) -> Result<(), TemplateError> {
        self.file.write_all(bytes)?;
        if let Ok(existing) = std::fs::metadata(&self.path) {
            self.file.as_file().set_permissions(existing.permissions())?;
        }
        self.file.as_file().sync_all()?;
        self.file
            .persist(&self.path)
            .map_err(|e| TemplateError::Io(e.error))?;
        Ok(())
    }
}

pub(crate) fn output_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_writes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.docx");

        let pending = PendingOutput::create(&target).unwrap();
        assert!(!target.exists());
        pending.commit(b"payload").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.docx");

        drop(PendingOutput::create(&target).unwrap());

        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.docx");

        let err = PendingOutput::create(&target).err().unwrap();
        assert!(err.is_permission());
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_gets_default_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference");
        std::fs::File::create(&reference).unwrap();
        let target = dir.path().join("out.docx");

        PendingOutput::create(&target).unwrap().commit(b"x").unwrap();

        assert_eq!(mode(&target), mode(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_output_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.docx");
        std::fs::write(&target, b"old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();

        PendingOutput::create(&target).unwrap().commit(b"new").unwrap();

        assert_eq!(mode(&target), 0o640);
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_bare_file_name_uses_current_directory() {
        assert_eq!(output_directory(Path::new("out.docx")), PathBuf::from("."));
    }
}
