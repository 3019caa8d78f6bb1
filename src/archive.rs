use crate::storage::SliceStore;

use std::io::{Cursor, Write};
use thiserror::Error;
use tracing::debug;
use zip::{
    CompressionMethod,
    result::ZipError,
    write::{SimpleFileOptions, ZipWriter},
};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),
}

pub struct ZipArchiver;

impl ZipArchiver {
    /// Bundle a batch's images into an in-memory deflate-compressed zip.
    ///
    /// With an allow-list only the named blobs are included, preserving the
    /// store's ordering; otherwise the whole batch goes in. Entries are
    /// archived under `{batch_id}/{filename}`.
    pub fn archive_batch(
        store: &dyn SliceStore,
        batch_id: &str,
        allow: Option<&[String]>,
    ) -> Result<Vec<u8>, ArchiveError> {
        let names = store.list_batch(batch_id)?;
        let selected: Vec<String> = match allow {
            Some(allow) => names
                .into_iter()
                .filter(|name| allow.iter().any(|wanted| wanted == name))
                .collect(),
            None => names,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for name in &selected {
            let bytes = store.read_blob(batch_id, name)?;
            writer.start_file(format!("{batch_id}/{name}"), options)?;
            writer.write_all(&bytes)?;
        }
        writer.finish()?;

        debug!(batch_id, entries = selected.len(), "archived batch");
        Ok(cursor.into_inner())
    }

    /// Archive filename for a batch
    pub fn archive_name(batch_id: &str) -> String {
        format!("{batch_id}.zip")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsStore;

    fn seeded_store() -> FsStore {
        let store = FsStore::open_temp().unwrap();
        store.create_batch("scan_slices").unwrap();
        store.write_blob("scan_slices", "slice_0001.png", b"one").unwrap();
        store.write_blob("scan_slices", "slice_0002.png", b"two").unwrap();
        store.write_blob("scan_slices", "slice_0003.png", b"three").unwrap();
        store
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn archives_the_whole_batch() {
        let store = seeded_store();
        let bytes = ZipArchiver::archive_batch(&store, "scan_slices", None).unwrap();
        assert_eq!(
            entry_names(&bytes),
            vec![
                "scan_slices/slice_0001.png",
                "scan_slices/slice_0002.png",
                "scan_slices/slice_0003.png",
            ]
        );
    }

    #[test]
    fn allow_list_filters_entries() {
        let store = seeded_store();
        let allow = vec!["slice_0002.png".to_string()];
        let bytes = ZipArchiver::archive_batch(&store, "scan_slices", Some(&allow)).unwrap();
        assert_eq!(entry_names(&bytes), vec!["scan_slices/slice_0002.png"]);
    }

    #[test]
    fn entries_round_trip_contents() {
        let store = seeded_store();
        let bytes = ZipArchiver::archive_batch(&store, "scan_slices", None).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = Vec::new();
        std::io::copy(
            &mut archive.by_name("scan_slices/slice_0002.png").unwrap(),
            &mut content,
        )
        .unwrap();
        assert_eq!(content, b"two");
    }

    #[test]
    fn archive_name_is_batch_scoped() {
        assert_eq!(ZipArchiver::archive_name("scan_slices"), "scan_slices.zip");
    }
}
