//! `multipart/form-data` decoding.
//!
//! The decoder turns the request stream into a sequence of [`MultipartEvent`]s,
//! streaming file parts to disk as it goes. The [accumulator](accumulator) folds those events
//! into a [`MultipartBody`], resolving exactly once with either the finished maps or the first
//! error.

pub mod accumulator;
mod decoder;

pub use accumulator::{accumulate, Accumulator};
pub(crate) use decoder::decode_multipart;

use crate::body::FieldMap;
use crate::fields::MultiMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Uploaded files by field name.
pub type FileMap = MultiMap<FileDescriptor>;

/// Called for every file part before its content is written.
///
/// Receives the field name and the descriptor of the file about to be written; changing the
/// descriptor's path changes where the upload is stored.
pub type FileBeginCallback = Arc<dyn Fn(&str, &mut FileDescriptor) + Send + Sync>;

/// An uploaded file stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    path: PathBuf,
    size: u64,
    name: Option<String>,
    content_type: Option<String>,
    modified: Option<SystemTime>,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>, name: Option<String>, content_type: Option<String>) -> Self {
        Self { path: path.into(), size: 0, name, content_type, modified: None }
    }

    /// Where the content is, or will be, stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Bytes written so far.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The file name sent by the client.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// When the content was completely written.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub(crate) fn written(&mut self, size: u64) {
        self.size = size;
        self.modified = Some(SystemTime::now());
    }
}

/// One decoded multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartEvent {
    Field { name: String, value: String },
    File { name: String, file: FileDescriptor },
}

/// The fields and files of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MultipartBody {
    fields: FieldMap,
    files: FileMap,
}

impl MultipartBody {
    pub fn new(fields: FieldMap, files: FileMap) -> Self {
        Self { fields, files }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn into_parts(self) -> (FieldMap, FileMap) {
        (self.fields, self.files)
    }
}
