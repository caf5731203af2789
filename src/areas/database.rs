//! Loose object store
//!
//! Objects live under `objects/<2 hex>/<38 hex>` as zlib-compressed envelopes.
//! Writes are content-addressed, so storing the same object twice is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::envelope::Envelope;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Longest header prefix scanned for the type token: "commit" plus a space
const MAX_TYPE_TOKEN: usize = 7;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    verify_reads: bool,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database {
            path,
            verify_reads: false,
        }
    }

    /// Re-hash every object read and fail when the digest differs from its id
    pub fn with_verified_reads(mut self, verify_reads: bool) -> Self {
        self.verify_reads = verify_reads;
        self
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Store `payload` as an object of type `object_type` and return its id
    pub fn put(&self, object_type: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        let envelope = Envelope::encode(object_type, payload);
        let object_id = ObjectId::hash_of(&envelope);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            tracing::debug!(oid = %object_id, %object_type, "object already stored");
            return Ok(object_id);
        }

        let compressed = Self::compress(&envelope)?;
        self.write_object(&object_path, &compressed)?;

        tracing::debug!(
            oid = %object_id,
            %object_type,
            size = payload.len(),
            compressed = compressed.len(),
            "stored object"
        );

        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.put(object.object_type(), &object.serialize()?)
    }

    pub fn put_blob(&self, blob: &Blob) -> Result<ObjectId> {
        self.store(blob)
    }

    pub fn put_tree(&self, tree: &Tree) -> Result<ObjectId> {
        self.store(tree)
    }

    pub fn put_commit(&self, _payload: &[u8]) -> Result<ObjectId> {
        Err(Error::NotImplemented("commit objects"))
    }

    /// Read an object and return its type and payload
    pub fn load(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let raw = self.read_object(object_id)?;
        let envelope = Envelope::decode(&raw)?;

        if self.verify_reads {
            let actual = ObjectId::hash_of(&raw);
            if actual != *object_id {
                return Err(Error::CorruptObject(format!(
                    "content of {} hashes to {}",
                    object_id, actual
                )));
            }
        }

        tracing::debug!(
            oid = %object_id,
            object_type = %envelope.object_type,
            size = envelope.size,
            "loaded object"
        );

        let payload = raw.slice(envelope.payload_offset..);
        Ok((envelope.object_type, payload))
    }

    /// Read an object's payload, insisting on its type
    pub fn get(&self, object_id: &ObjectId, expected: ObjectType) -> Result<Bytes> {
        let (actual, payload) = self.load(object_id)?;

        if actual != expected {
            return Err(Error::TypeMismatch {
                oid: object_id.to_hex(),
                expected,
                actual,
            });
        }

        Ok(payload)
    }

    /// Object type, inflating only as far as the first space
    pub fn get_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let file = self.open_object(object_id)?;
        let mut decoder = ZlibDecoder::new(file);

        let mut token = Vec::with_capacity(MAX_TYPE_TOKEN);
        let mut byte = [0u8; 1];
        loop {
            let read = decoder
                .read(&mut byte)
                .map_err(|e| Self::inflate_error(object_id, e))?;
            if read == 0 || token.len() == MAX_TYPE_TOKEN {
                return Err(Error::CorruptObject(format!(
                    "{}: no type token in header",
                    object_id
                )));
            }
            if byte[0] == b' ' {
                break;
            }
            token.push(byte[0]);
        }

        ObjectType::parse(&token)
    }

    pub fn get_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        Blob::deserialize(self.get(object_id, ObjectType::Blob)?)
    }

    pub fn get_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        Tree::deserialize(self.get(object_id, ObjectType::Tree)?)
    }

    pub fn get_commit(&self, _object_id: &ObjectId) -> Result<Bytes> {
        Err(Error::NotImplemented("commit objects"))
    }

    fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    fn open_object(&self, object_id: &ObjectId) -> Result<std::fs::File> {
        let object_path = self.object_path(object_id);

        if !object_path.is_file() {
            return Err(Error::NotFound(object_path));
        }

        match std::fs::File::open(&object_path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(object_path)),
            Err(e) => Err(e.into()),
        }
    }

    fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let file = self.open_object(object_id)?;

        let mut decoder = ZlibDecoder::new(file);
        let mut content = Vec::new();
        decoder
            .read_to_end(&mut content)
            .map_err(|e| Self::inflate_error(object_id, e))?;

        Ok(content.into())
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path.parent().ok_or_else(|| {
            Error::Format(format!("invalid object path {}", object_path.display()))
        })?;

        // another writer may have created it first
        match std::fs::create_dir(object_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) if e.kind() == ErrorKind::NotFound => std::fs::create_dir_all(object_dir)?,
            Err(e) => return Err(e.into()),
        }

        let temp_path = object_dir.join(Self::generate_temp_name());
        let result = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .and_then(|mut file| file.write_all(content))
            .and_then(|()| std::fs::rename(&temp_path, object_path));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn inflate_error(object_id: &ObjectId, error: std::io::Error) -> Error {
        Error::CorruptObject(format!("{}: cannot inflate: {}", object_id, error))
    }

    fn generate_temp_name() -> String {
        format!(
            "tmp-obj-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        )
    }
}
