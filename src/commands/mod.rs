pub mod load;
pub mod save;
pub mod show;

use anyhow::{Context as _, Result};
use snapshot::{Release, store};

use crate::archive;
use crate::paths::SnapshotPaths;

/// Unpack the snapshot archive and decode its releases
///
/// The intermediate text file is removed whether or not decoding succeeds.
pub(crate) fn read_snapshot(paths: &SnapshotPaths) -> Result<Vec<Release>> {
    let loaded = archive::unpack(&paths.archive, &paths.text).and_then(|()| {
        store::load(&paths.text).with_context(|| {
            format!("Could not read releases from {}", paths.archive.display())
        })
    });
    archive::discard(&paths.text);
    loaded
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeCluster, context, release};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_snapshot_removes_text() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), &[]);
        let cluster = FakeCluster::with(vec![release("api", "replicas: 2\n")]);

        save::run(&ctx, &cluster).unwrap();
        let releases = read_snapshot(&ctx.config.paths).unwrap();

        assert_eq!(releases, vec![release("api", "replicas: 2\n")]);
        assert!(!ctx.config.paths.text.exists());
    }

    #[test]
    fn test_read_snapshot_missing_archive() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), &[]);

        assert!(read_snapshot(&ctx.config.paths).is_err());
        assert!(!ctx.config.paths.text.exists());
    }

    #[test]
    fn test_read_snapshot_corrupt_text() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), &[]);
        std::fs::write(&ctx.config.paths.text, "not-a-release").unwrap();
        archive::pack(&ctx.config.paths.text, &ctx.config.paths.archive).unwrap();

        let err = read_snapshot(&ctx.config.paths).unwrap_err();
        assert!(format!("{err:#}").contains("Could not read releases"));
        assert!(!ctx.config.paths.text.exists());
    }
}
