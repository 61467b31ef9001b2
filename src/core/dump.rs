// Framed binary dump files: validated fixed header plus a bincode payload.
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::value::Value;

pub const DUMP_MAGIC: [u8; 4] = *b"BKDP";
pub const DUMP_VERSION: u32 = 1;
pub const DUMP_HEADER_LEN: usize = 56;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DumpHeader {
    payload_len: u64,
    payload_len_xor: u64,
    digest: [u8; 32],
}

impl DumpHeader {
    fn new(payload: &[u8]) -> Self {
        let payload_len = payload.len() as u64;
        Self {
            payload_len,
            payload_len_xor: payload_len ^ u64::MAX,
            digest: Sha256::digest(payload).into(),
        }
    }

    fn encode(&self) -> [u8; DUMP_HEADER_LEN] {
        let mut buf = [0u8; DUMP_HEADER_LEN];
        buf[0..4].copy_from_slice(&DUMP_MAGIC);
        buf[4..8].copy_from_slice(&DUMP_VERSION.to_le_bytes());
        buf[8..16].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[16..24].copy_from_slice(&self.payload_len_xor.to_le_bytes());
        buf[24..56].copy_from_slice(&self.digest);
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < DUMP_HEADER_LEN {
            return Err(Error::new(ErrorKind::Corrupt).with_message("dump header too small"));
        }
        if buf[0..4] != DUMP_MAGIC {
            return Err(Error::new(ErrorKind::Corrupt).with_message("bad dump magic"));
        }
        let version = u32::from_le_bytes(read_4(buf, 4));
        if version != DUMP_VERSION {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message(format!("unsupported dump version {version}")));
        }
        let payload_len = u64::from_le_bytes(read_8(buf, 8));
        let payload_len_xor = u64::from_le_bytes(read_8(buf, 16));
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&buf[24..56]);
        Ok(Self {
            payload_len,
            payload_len_xor,
            digest,
        })
    }

    fn validate(&self, payload: &[u8]) -> Result<(), Error> {
        if self.payload_len ^ self.payload_len_xor != u64::MAX {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message("payload length xor mismatch"));
        }
        if self.payload_len != payload.len() as u64 {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message("payload length does not match file size"));
        }
        let digest: [u8; 32] = Sha256::digest(payload).into();
        if digest != self.digest {
            return Err(Error::new(ErrorKind::Corrupt).with_message("payload digest mismatch"));
        }
        Ok(())
    }
}

fn read_4(buf: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&buf[offset..offset + 4]);
    out
}

fn read_8(buf: &[u8], offset: usize) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&buf[offset..offset + 8]);
    out
}

/// Serialize a value tree to `path`, truncating any existing file.
pub fn dump_value(path: impl AsRef<Path>, value: &Value) -> Result<(), Error> {
    let path = path.as_ref();
    let payload = bincode::serialize(value).map_err(|err| {
        Error::new(ErrorKind::Serialize)
            .with_message("value tree failed to encode")
            .with_source(err)
    })?;

    let header = DumpHeader::new(&payload);
    let mut bytes = Vec::with_capacity(DUMP_HEADER_LEN + payload.len());
    bytes.extend_from_slice(&header.encode());
    bytes.extend_from_slice(&payload);

    fs::write(path, bytes)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))
}

/// Reload a dump written by [`dump_value`]. The result is structurally
/// equal to the value that was dumped. Reload is guaranteed only within the
/// same library family; the payload encoding carries no cross-version
/// contract.
pub fn load_value(path: impl AsRef<Path>) -> Result<Value, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))?;

    if bytes.len() < DUMP_HEADER_LEN {
        return Err(Error::new(ErrorKind::Corrupt)
            .with_message("dump file too small")
            .with_path(path));
    }
    let header = DumpHeader::decode(&bytes).map_err(|err| err.with_path(path))?;
    let payload = &bytes[DUMP_HEADER_LEN..];
    header.validate(payload).map_err(|err| err.with_path(path))?;

    bincode::deserialize(payload).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("payload failed to decode")
            .with_path(path)
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{DUMP_HEADER_LEN, dump_value, load_value};
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;
    use std::collections::BTreeMap;

    fn sample() -> Value {
        let mut runs = BTreeMap::new();
        runs.insert(
            "times".to_string(),
            Value::List(vec![Value::Number(0.5), Value::Number(1.5)]),
        );
        runs.insert("label".to_string(), Value::Text("run 12".to_string()));
        runs.insert("done".to_string(), Value::Bool(true));
        Value::Map(runs)
    }

    #[test]
    fn dump_then_load_is_structurally_equal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.dat");
        let value = sample();
        dump_value(&path, &value).expect("dump");
        let loaded = load_value(&path).expect("load");
        assert_eq!(loaded, value);
    }

    #[test]
    fn dump_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.dat");
        dump_value(&path, &sample()).expect("first");
        dump_value(&path, &Value::Number(7.0)).expect("second");
        assert_eq!(load_value(&path).expect("load"), Value::Number(7.0));
    }

    #[test]
    fn tampered_payload_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.dat");
        dump_value(&path, &sample()).expect("dump");

        let mut bytes = std::fs::read(&path).expect("read");
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, bytes).expect("write");

        let err = load_value(&path).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.dat");
        dump_value(&path, &sample()).expect("dump");

        let bytes = std::fs::read(&path).expect("read");
        std::fs::write(&path, &bytes[..DUMP_HEADER_LEN - 4]).expect("truncate");

        let err = load_value(&path).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn missing_dump_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_value(dir.path().join("nope.dat")).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
