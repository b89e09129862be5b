use futures::future::BoxFuture;

use crate::audiofile::{AudioFile, AudioKind, Id, MetadataUpdate, NewAudioFile};
use crate::errors::BackendError;

pub trait Db {
    fn count_all(&self) -> BoxFuture<Result<i64, BackendError>>;

    fn delete(&self, kind: AudioKind, id: Id) -> BoxFuture<Result<(), BackendError>>;

    fn insert(&self, file: NewAudioFile) -> BoxFuture<Result<AudioFile, BackendError>>;

    fn list(&self, kind: AudioKind) -> BoxFuture<Result<Vec<AudioFile>, BackendError>>;

    fn retrieve(&self, kind: AudioKind, id: Id)
        -> BoxFuture<Result<Option<AudioFile>, BackendError>>;

    fn update(
        &self,
        kind: AudioKind,
        id: Id,
        fields: MetadataUpdate,
    ) -> BoxFuture<Result<Option<AudioFile>, BackendError>>;
}

#[cfg(test)]
pub(crate) mod memory;

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::postgres::{PgPool, PgRow};

    use crate::audiofile::{
        AudioFile, AudioKind, Audiobook, Id, MetadataUpdate, NewAudioFile, Podcast, Song,
    };
    use crate::errors::BackendError;

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn count_all(&self) -> BoxFuture<Result<i64, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, (i64,)>(include_str!("queries/count.sql"));

                let (count,) = query.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(count)
            }
            .boxed()
        }

        fn delete(&self, kind: AudioKind, id: Id) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let query = sqlx::query(delete_sql(kind));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentRecord { kind, id })
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn insert(&self, file: NewAudioFile) -> BoxFuture<Result<AudioFile, BackendError>> {
            async move {
                match file {
                    NewAudioFile::Song(song) => {
                        sqlx::query(include_str!("queries/create_song.sql"))
                            .bind(&song.name)
                            .bind(song.duration)
                            .try_map(|row: PgRow| map_song(&row))
                            .fetch_one(&self.pool)
                            .await
                            .map_err(map_sqlx_error)
                    }
                    NewAudioFile::Podcast(podcast) => {
                        sqlx::query(include_str!("queries/create_podcast.sql"))
                            .bind(&podcast.name)
                            .bind(podcast.duration)
                            .bind(&podcast.host)
                            .bind(&podcast.participants)
                            .try_map(|row: PgRow| map_podcast(&row))
                            .fetch_one(&self.pool)
                            .await
                            .map_err(map_sqlx_error)
                    }
                    NewAudioFile::Audiobook(audiobook) => {
                        sqlx::query(include_str!("queries/create_audiobook.sql"))
                            .bind(&audiobook.name)
                            .bind(audiobook.duration)
                            .bind(&audiobook.author)
                            .bind(&audiobook.narrator)
                            .try_map(|row: PgRow| map_audiobook(&row))
                            .fetch_one(&self.pool)
                            .await
                            .map_err(map_sqlx_error)
                    }
                }
            }
            .boxed()
        }

        fn list(&self, kind: AudioKind) -> BoxFuture<Result<Vec<AudioFile>, BackendError>> {
            async move {
                let map = mapper(kind);
                let query = sqlx::query(list_sql(kind));

                let records = query
                    .try_map(|row: PgRow| map(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(records)
            }
            .boxed()
        }

        fn retrieve(
            &self,
            kind: AudioKind,
            id: Id,
        ) -> BoxFuture<Result<Option<AudioFile>, BackendError>> {
            async move {
                let map = mapper(kind);
                let query = sqlx::query(retrieve_sql(kind));

                let record = query
                    .bind(id)
                    .try_map(|row: PgRow| map(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(record)
            }
            .boxed()
        }

        fn update(
            &self,
            kind: AudioKind,
            id: Id,
            fields: MetadataUpdate,
        ) -> BoxFuture<Result<Option<AudioFile>, BackendError>> {
            async move {
                let map = mapper(kind);
                let query = sqlx::query(update_sql(kind))
                    .bind(id)
                    .bind(&fields.name)
                    .bind(fields.duration)
                    .bind(fields.uploaded_time);

                let query = match kind {
                    AudioKind::Song => query,
                    AudioKind::Podcast => query.bind(&fields.host).bind(&fields.participants),
                    AudioKind::Audiobook => query.bind(&fields.author).bind(&fields.narrator),
                };

                let record = query
                    .try_map(|row: PgRow| map(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(record)
            }
            .boxed()
        }
    }

    fn delete_sql(kind: AudioKind) -> &'static str {
        match kind {
            AudioKind::Song => include_str!("queries/delete_song.sql"),
            AudioKind::Podcast => include_str!("queries/delete_podcast.sql"),
            AudioKind::Audiobook => include_str!("queries/delete_audiobook.sql"),
        }
    }

    fn list_sql(kind: AudioKind) -> &'static str {
        match kind {
            AudioKind::Song => include_str!("queries/list_song.sql"),
            AudioKind::Podcast => include_str!("queries/list_podcast.sql"),
            AudioKind::Audiobook => include_str!("queries/list_audiobook.sql"),
        }
    }

    fn retrieve_sql(kind: AudioKind) -> &'static str {
        match kind {
            AudioKind::Song => include_str!("queries/retrieve_song.sql"),
            AudioKind::Podcast => include_str!("queries/retrieve_podcast.sql"),
            AudioKind::Audiobook => include_str!("queries/retrieve_audiobook.sql"),
        }
    }

    fn update_sql(kind: AudioKind) -> &'static str {
        match kind {
            AudioKind::Song => include_str!("queries/update_song.sql"),
            AudioKind::Podcast => include_str!("queries/update_podcast.sql"),
            AudioKind::Audiobook => include_str!("queries/update_audiobook.sql"),
        }
    }

    fn mapper(kind: AudioKind) -> fn(&PgRow) -> Result<AudioFile, sqlx::Error> {
        match kind {
            AudioKind::Song => map_song,
            AudioKind::Podcast => map_podcast,
            AudioKind::Audiobook => map_audiobook,
        }
    }

    fn map_song(row: &PgRow) -> Result<AudioFile, sqlx::Error> {
        Ok(AudioFile::Song(Song {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            duration: try_get(row, "duration")?,
            uploaded_time: try_get(row, "uploaded_time")?,
        }))
    }

    fn map_podcast(row: &PgRow) -> Result<AudioFile, sqlx::Error> {
        Ok(AudioFile::Podcast(Podcast {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            duration: try_get(row, "duration")?,
            uploaded_time: try_get(row, "uploaded_time")?,
            host: try_get(row, "host")?,
            participants: try_get(row, "participants")?,
        }))
    }

    fn map_audiobook(row: &PgRow) -> Result<AudioFile, sqlx::Error> {
        Ok(AudioFile::Audiobook(Audiobook {
            id: try_get(row, "id")?,
            name: try_get(row, "name")?,
            duration: try_get(row, "duration")?,
            uploaded_time: try_get(row, "uploaded_time")?,
            author: try_get(row, "author")?,
            narrator: try_get(row, "narrator")?,
        }))
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }
}
