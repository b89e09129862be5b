use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use time::OffsetDateTime;

use crate::audiofile::{
    AudioFile, AudioKind, Audiobook, Id, MetadataUpdate, NewAudioFile, Podcast, Song,
};
use crate::db::Db;
use crate::errors::BackendError;

/// An in-memory implementation used by the route tests. IDs are
/// assigned per kind, like the per-table sequences in the real store.
#[derive(Default)]
pub(crate) struct MemoryDb {
    records: RwLock<HashMap<AudioKind, BTreeMap<Id, AudioFile>>>,
}

impl Db for MemoryDb {
    fn count_all(&self) -> BoxFuture<Result<i64, BackendError>> {
        let records = self.records.read().unwrap();
        let count = records.values().map(|table| table.len() as i64).sum();

        async move { Ok(count) }.boxed()
    }

    fn delete(&self, kind: AudioKind, id: Id) -> BoxFuture<Result<(), BackendError>> {
        let removed = self
            .records
            .write()
            .unwrap()
            .entry(kind)
            .or_default()
            .remove(&id);

        async move {
            match removed {
                Some(_) => Ok(()),
                None => Err(BackendError::NonExistentRecord { kind, id }),
            }
        }
        .boxed()
    }

    fn insert(&self, file: NewAudioFile) -> BoxFuture<Result<AudioFile, BackendError>> {
        let kind = file.kind();
        let mut records = self.records.write().unwrap();
        let table = records.entry(kind).or_default();
        let id = table.keys().next_back().map(|id| id + 1).unwrap_or(1);
        let uploaded_time = OffsetDateTime::now_utc();

        let record = match file {
            NewAudioFile::Song(song) => AudioFile::Song(Song {
                id,
                name: song.name,
                duration: song.duration,
                uploaded_time,
            }),
            NewAudioFile::Podcast(podcast) => AudioFile::Podcast(Podcast {
                id,
                name: podcast.name,
                duration: podcast.duration,
                uploaded_time,
                host: podcast.host,
                participants: podcast.participants,
            }),
            NewAudioFile::Audiobook(audiobook) => AudioFile::Audiobook(Audiobook {
                id,
                name: audiobook.name,
                duration: audiobook.duration,
                uploaded_time,
                author: audiobook.author,
                narrator: audiobook.narrator,
            }),
        };

        table.insert(id, record.clone());

        async move { Ok(record) }.boxed()
    }

    fn list(&self, kind: AudioKind) -> BoxFuture<Result<Vec<AudioFile>, BackendError>> {
        let records = self.records.read().unwrap();
        let files = records
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default();

        async move { Ok(files) }.boxed()
    }

    fn retrieve(
        &self,
        kind: AudioKind,
        id: Id,
    ) -> BoxFuture<Result<Option<AudioFile>, BackendError>> {
        let record = self
            .records
            .read()
            .unwrap()
            .get(&kind)
            .and_then(|table| table.get(&id))
            .cloned();

        async move { Ok(record) }.boxed()
    }

    fn update(
        &self,
        kind: AudioKind,
        id: Id,
        fields: MetadataUpdate,
    ) -> BoxFuture<Result<Option<AudioFile>, BackendError>> {
        let mut records = self.records.write().unwrap();
        let record = records
            .entry(kind)
            .or_default()
            .get_mut(&id)
            .map(|record| {
                apply(record, fields);
                record.clone()
            });

        async move { Ok(record) }.boxed()
    }
}

fn apply(record: &mut AudioFile, fields: MetadataUpdate) {
    match record {
        AudioFile::Song(song) => {
            set(&mut song.name, fields.name);
            set(&mut song.duration, fields.duration);
            set(&mut song.uploaded_time, fields.uploaded_time);
        }
        AudioFile::Podcast(podcast) => {
            set(&mut podcast.name, fields.name);
            set(&mut podcast.duration, fields.duration);
            set(&mut podcast.uploaded_time, fields.uploaded_time);
            set(&mut podcast.host, fields.host);
            set(&mut podcast.participants, fields.participants);
        }
        AudioFile::Audiobook(audiobook) => {
            set(&mut audiobook.name, fields.name);
            set(&mut audiobook.duration, fields.duration);
            set(&mut audiobook.uploaded_time, fields.uploaded_time);
            set(&mut audiobook.author, fields.author);
            set(&mut audiobook.narrator, fields.narrator);
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
