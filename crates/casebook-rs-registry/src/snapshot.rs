//! Binary snapshot encoding for a whole record collection.
//!
//! Layout: `CASEBOOK` magic, little-endian `u32` record count, then one frame
//! per record (`u32` payload length followed by the JSON-encoded record).

use crate::error::RegistryError;
use crate::model::PersonRecord;
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Magic bytes at the start of every snapshot.
const SNAPSHOT_MAGIC: &[u8; 8] = b"CASEBOOK";
/// Size of the length/count prefixes.
const PREFIX_LEN: usize = 4;

/// Encode records in order into snapshot bytes.
pub fn encode(records: &[PersonRecord]) -> Result<Vec<u8>, RegistryError> {
    let mut out = Vec::with_capacity(SNAPSHOT_MAGIC.len() + PREFIX_LEN);
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.extend_from_slice(&count_prefix(records.len())?);
    for record in records {
        let payload = serde_json::to_vec(record)?;
        let len =
            u32::try_from(payload.len()).map_err(|_| RegistryError::FrameTooLarge(payload.len()))?;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&payload);
    }
    Ok(out)
}

/// Little-endian record count header.
fn count_prefix(count: usize) -> Result<[u8; PREFIX_LEN], RegistryError> {
    u32::try_from(count)
        .map(u32::to_le_bytes)
        .map_err(|_| RegistryError::TooManyRecords(count))
}

/// Decode snapshot bytes back into an ordered collection.
pub fn decode(bytes: &[u8]) -> Result<Vec<PersonRecord>, RegistryError> {
    let mut cursor = Cursor { bytes, offset: 0 };
    let magic = cursor.take(SNAPSHOT_MAGIC.len(), "magic")?;
    if magic != SNAPSHOT_MAGIC {
        return Err(RegistryError::Decode("bad magic".to_string()));
    }
    let count = cursor.read_u32("record count")? as usize;
    let mut records = Vec::with_capacity(count.min(1024));
    for index in 0..count {
        let len = cursor.read_u32("frame length")? as usize;
        let payload = cursor.take(len, "frame payload")?;
        let record: PersonRecord = serde_json::from_slice(payload)
            .map_err(|err| RegistryError::Decode(format!("record {index}: {err}")))?;
        records.push(record);
    }
    if cursor.offset != bytes.len() {
        return Err(RegistryError::Decode(format!(
            "{} trailing bytes after {count} records",
            bytes.len() - cursor.offset
        )));
    }
    Ok(records)
}

/// Overwrite the contents of the existing file at `path` with `bytes`.
///
/// The file is opened without `create`, so a missing target is an error and
/// never a new file. Symlinks resolve to their target and the file keeps its
/// permissions.
pub(crate) fn overwrite_existing(path: &Path, bytes: &[u8]) -> Result<(), RegistryError> {
    let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    debug!(
        "snapshot written (path={}, bytes={})",
        path.display(),
        bytes.len()
    );
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], RegistryError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                RegistryError::Decode(format!("truncated {what} at offset {}", self.offset))
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, RegistryError> {
        let raw = self.take(PREFIX_LEN, what)?;
        let mut buf = [0u8; PREFIX_LEN];
        buf.copy_from_slice(raw);
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::{SNAPSHOT_MAGIC, count_prefix, decode, encode, overwrite_existing};
    use crate::error::RegistryError;
    use crate::model::PersonRecord;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_collection_round_trips() {
        let bytes = encode(&[]).expect("encode");
        assert_eq!(bytes.len(), SNAPSHOT_MAGIC.len() + 4);
        assert_eq!(decode(&bytes).expect("decode"), Vec::new());
    }

    #[test]
    fn keeps_order_and_fields() {
        let mut infected = PersonRecord::create("Bruno", "", false).expect("create");
        infected.mark_infected();
        let records = vec![
            PersonRecord::create("Ana", "asthma", false).expect("create"),
            infected,
        ];
        let decoded = decode(&encode(&records).expect("encode")).expect("decode");
        assert_eq!(decoded, records);
    }

    #[test]
    fn rejects_empty_input() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode(&[]).expect("encode");
        bytes[0] = b'X';
        let err = decode(&bytes).unwrap_err();
        assert!(format!("{err}").contains("bad magic"));
    }

    #[test]
    fn rejects_truncated_frame() {
        let record = PersonRecord::create("Ana", "", false).expect("create");
        let bytes = encode(&[record]).expect("encode");
        let err = decode(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(format!("{err}").contains("truncated frame payload"));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = encode(&[]).expect("encode");
        bytes.push(0);
        let err = decode(&bytes).unwrap_err();
        assert!(format!("{err}").contains("trailing"));
    }

    #[test]
    fn overwrite_requires_existing_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("absent.bin");
        let err = overwrite_existing(&path, b"data").unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn overwrite_truncates_longer_contents() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("cases.bin");
        fs::write(&path, vec![0xAB; 64]).expect("fill");
        overwrite_existing(&path, b"abc").expect("write");
        assert_eq!(fs::read(&path).expect("read"), b"abc");
        assert_eq!(fs::read_dir(temp.path()).expect("dir").count(), 1);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_count_is_an_encode_error() {
        let err = count_prefix(usize::MAX).unwrap_err();
        assert!(matches!(err, RegistryError::TooManyRecords(usize::MAX)));
        assert_eq!(count_prefix(2).expect("count"), [2, 0, 0, 0]);
    }

    #[test]
    fn reserved_id_in_frame_is_rejected() {
        let payload = format!(
            r#"{{"id":{},"name":"Ana","condition":"","infected":false,"created_at":"2021-05-26"}}"#,
            u64::MAX
        );
        let mut bytes = SNAPSHOT_MAGIC.to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload.as_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(format!("{err}").contains("record 0"));
        assert!(format!("{err}").contains("out of range"));
    }
}
