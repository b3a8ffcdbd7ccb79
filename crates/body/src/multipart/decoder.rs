use crate::body::{Parsed, ParsedBody, ReqBody};
use crate::config::MultipartOptions;
use crate::error::BodyError;
use crate::multipart::{accumulate, FileBeginCallback, FileDescriptor, MultipartEvent};
use bytes::BytesMut;
use futures::{stream, Stream};
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http_body_util::BodyExt;
use multer::{Field, Multipart};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{trace, warn};
use uuid::Uuid;

/// Decodes a multipart body into fields and files.
pub(crate) async fn decode_multipart(
    headers: &HeaderMap,
    body: ReqBody,
    options: &MultipartOptions,
    on_file_begin: Option<&FileBeginCallback>,
) -> Result<ParsedBody, BodyError> {
    let decoder = MultipartDecoder::new(headers, body, options, on_file_begin)?;
    let multipart = accumulate(decoder.into_events()).await?;
    Ok(ParsedBody::from(Parsed::Multipart(multipart)))
}

/// Produces one [`MultipartEvent`] per named part.
///
/// File parts are streamed to the upload directory. When decoding fails, every file written
/// for this request is removed before the error is returned.
struct MultipartDecoder<'a> {
    multipart: Multipart<'static>,
    options: &'a MultipartOptions,
    on_file_begin: Option<&'a FileBeginCallback>,
    field_count: usize,
    fields_size: u64,
    written: Vec<PathBuf>,
}

impl<'a> MultipartDecoder<'a> {
    fn new(
        headers: &HeaderMap,
        body: ReqBody,
        options: &'a MultipartOptions,
        on_file_begin: Option<&'a FileBeginCallback>,
    ) -> Result<Self, BodyError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| BodyError::malformed("multipart", "missing content type"))?;
        let boundary = multer::parse_boundary(content_type)?;

        Ok(Self {
            multipart: Multipart::new(body.into_data_stream(), boundary),
            options,
            on_file_begin,
            field_count: 0,
            fields_size: 0,
            written: Vec::new(),
        })
    }

    fn into_events(self) -> impl Stream<Item = Result<MultipartEvent, BodyError>> + Send + 'a {
        stream::try_unfold(self, |mut decoder| async move {
            let event = decoder.next_event().await?;
            Ok::<_, BodyError>(event.map(|event| (event, decoder)))
        })
    }

    async fn next_event(&mut self) -> Result<Option<MultipartEvent>, BodyError> {
        match self.decode_next().await {
            Ok(event) => Ok(event),
            Err(e) => {
                self.discard_files().await;
                Err(e)
            }
        }
    }

    async fn decode_next(&mut self) -> Result<Option<MultipartEvent>, BodyError> {
        while let Some(field) = self.multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                trace!("skip multipart part without a name");
                continue;
            };

            let event = match field.file_name().map(ToOwned::to_owned) {
                Some(file_name) => self.read_file(name, file_name, field).await?,
                None => self.read_field(name, field).await?,
            };
            return Ok(Some(event));
        }

        Ok(None)
    }

    async fn read_field(&mut self, name: String, mut field: Field<'static>) -> Result<MultipartEvent, BodyError> {
        self.field_count += 1;
        if self.field_count > self.options.max_fields {
            return Err(BodyError::too_many_fields(self.options.max_fields));
        }

        let limit = self.options.max_fields_size;
        let mut value = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            self.fields_size += chunk.len() as u64;
            if limit.is_exceeded_by(self.fields_size) {
                return Err(BodyError::payload_too_large(limit.as_u64()));
            }
            value.extend_from_slice(&chunk);
        }

        trace!(field = %name, size = value.len(), "multipart field");
        Ok(MultipartEvent::Field { name, value: self.options.encoding.decode(&value) })
    }

    async fn read_file(
        &mut self,
        name: String,
        file_name: String,
        mut field: Field<'static>,
    ) -> Result<MultipartEvent, BodyError> {
        let content_type = field.content_type().map(ToString::to_string);
        let mut file = FileDescriptor::new(self.upload_path(&file_name), Some(file_name), content_type);
        if let Some(on_file_begin) = self.on_file_begin {
            on_file_begin(&name, &mut file);
        }

        let mut out = File::create(file.path()).await?;
        self.written.push(file.path().to_path_buf());

        let limit = self.options.max_file_size;
        let mut size = 0_u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if limit.is_exceeded_by(size) {
                return Err(BodyError::payload_too_large(limit.as_u64()));
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        file.written(size);

        trace!(field = %name, path = %file.path().display(), size, "multipart file");
        Ok(MultipartEvent::File { name, file })
    }

    fn upload_path(&self, file_name: &str) -> PathBuf {
        let mut stored = format!("upload_{}", Uuid::new_v4().simple());
        if self.options.keep_extensions
            && let Some(extension) = extension(file_name)
        {
            stored.push('.');
            stored.push_str(extension);
        }
        self.options.upload_dir.join(stored)
    }

    async fn discard_files(&mut self) {
        for path in self.written.drain(..) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(cause = %e, path = %path.display(), "failed to remove partial upload");
            }
        }
    }
}

/// The leading alphanumeric run of the file name's extension.
fn extension(file_name: &str) -> Option<&str> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    let end = extension.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(extension.len());
    (end > 0).then(|| &extension[..end])
}
