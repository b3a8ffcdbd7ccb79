//! Folds multipart events into a [`MultipartBody`].

use crate::body::FieldMap;
use crate::error::BodyError;
use crate::multipart::{FileMap, MultipartBody, MultipartEvent};
use futures::{Stream, TryStreamExt};
use std::pin::pin;

/// Collects fields and files, promoting a name to a list on its second value.
///
/// Fields and files are tracked separately, so the same name may appear in both.
#[derive(Debug, Default)]
pub struct Accumulator {
    fields: FieldMap,
    files: FileMap,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MultipartEvent) {
        match event {
            MultipartEvent::Field { name, value } => self.fields.insert(name, value),
            MultipartEvent::File { name, file } => self.files.insert(name, file),
        }
    }

    pub fn finish(self) -> MultipartBody {
        MultipartBody::new(self.fields, self.files)
    }
}

/// Drives `events` to the end and returns the accumulated body.
///
/// Resolves exactly once: with the body when the stream ends, or with the first error. The
/// stream is not polled again after an error and the partially accumulated maps are dropped.
pub async fn accumulate<S>(events: S) -> Result<MultipartBody, BodyError>
where
    S: Stream<Item = Result<MultipartEvent, BodyError>>,
{
    let mut events = pin!(events);
    let mut accumulator = Accumulator::new();

    while let Some(event) = events.try_next().await? {
        accumulator.push(event);
    }

    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::{accumulate, Accumulator};
    use crate::error::BodyError;
    use crate::fields::Multi;
    use crate::multipart::{FileDescriptor, MultipartEvent};
    use futures::stream::{self, StreamExt};

    fn field(name: &str, value: &str) -> Result<MultipartEvent, BodyError> {
        Ok(MultipartEvent::Field { name: name.into(), value: value.into() })
    }

    fn file(name: &str, path: &str) -> Result<MultipartEvent, BodyError> {
        Ok(MultipartEvent::File { name: name.into(), file: descriptor(path) })
    }

    fn descriptor(path: &str) -> FileDescriptor {
        FileDescriptor::new(path, Some(format!("{path}.png")), Some("image/png".into()))
    }

    #[tokio::test]
    async fn single_field() {
        let body = accumulate(stream::iter(vec![field("name", "alice")])).await.unwrap();

        assert_eq!(body.fields().get("name"), Some(&Multi::Single("alice".to_string())));
        assert!(body.files().is_empty());
    }

    #[tokio::test]
    async fn repeated_files_become_list() {
        let body = accumulate(stream::iter(vec![file("avatar", "f1"), file("avatar", "f2")])).await.unwrap();

        assert_eq!(body.files().get("avatar"), Some(&Multi::Multiple(vec![descriptor("f1"), descriptor("f2")])));
        assert!(body.fields().is_empty());
    }

    #[tokio::test]
    async fn fields_and_files_are_independent() {
        let events = vec![field("doc", "caption"), file("doc", "f1"), field("doc", "second caption")];
        let body = accumulate(stream::iter(events)).await.unwrap();

        assert_eq!(body.fields().get("doc").unwrap().len(), 2);
        assert_eq!(body.files().get("doc"), Some(&Multi::Single(descriptor("f1"))));
    }

    #[tokio::test]
    async fn shape_depends_only_on_count() {
        let base = ["a", "c", "b", "c"];
        for rotation in 0..base.len() {
            let mut names = base.to_vec();
            names.rotate_left(rotation);

            let body = accumulate(stream::iter(names.iter().map(|name| field(name, name)))).await.unwrap();

            assert_eq!(body.fields().len(), 3);
            assert!(!body.fields().get("a").unwrap().is_multiple());
            assert!(!body.fields().get("b").unwrap().is_multiple());
            assert_eq!(body.fields().get("c").unwrap().len(), 2);
        }
    }

    #[tokio::test]
    async fn empty_stream() {
        let body = accumulate(stream::iter(Vec::<Result<MultipartEvent, BodyError>>::new())).await.unwrap();

        assert!(body.fields().is_empty());
        assert!(body.files().is_empty());
    }

    #[tokio::test]
    async fn error_discards_partial_result() {
        let events = vec![field("name", "alice"), file("avatar", "f1"), Err(BodyError::payload_too_large(10))];
        let result = accumulate(stream::iter(events)).await;

        assert!(matches!(result, Err(BodyError::PayloadTooLarge { limit: 10 })));
    }

    #[tokio::test]
    async fn not_polled_after_error() {
        let events = stream::iter(vec![field("name", "alice"), Err(BodyError::malformed("multipart", "bad framing"))])
            .chain(stream::poll_fn(|_| -> std::task::Poll<Option<Result<MultipartEvent, BodyError>>> {
                panic!("stream polled after the error")
            }));

        let result = accumulate(events).await;
        assert!(matches!(result, Err(BodyError::Malformed { .. })));
    }

    #[test]
    fn push_and_finish() {
        let mut accumulator = Accumulator::new();
        accumulator.push(MultipartEvent::Field { name: "tag".into(), value: "a".into() });
        accumulator.push(MultipartEvent::Field { name: "tag".into(), value: "b".into() });
        accumulator.push(MultipartEvent::Field { name: "tag".into(), value: "c".into() });

        let (fields, files) = accumulator.finish().into_parts();
        assert_eq!(fields.get("tag"), Some(&Multi::Multiple(vec!["a".into(), "b".into(), "c".into()])));
        assert!(files.is_empty());
    }
}
