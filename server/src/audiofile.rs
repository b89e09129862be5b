use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// An ID in the database.
pub type Id = i64;

/// The record kinds this service manages. Each kind maps to its own
/// database table, named after the kind tag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    Song,
    Podcast,
    Audiobook,
}

impl AudioKind {
    pub const ALL: [AudioKind; 3] = [AudioKind::Song, AudioKind::Podcast, AudioKind::Audiobook];

    /// The kind tag, which doubles as the name of the backing table.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioKind::Song => "song",
            AudioKind::Podcast => "podcast",
            AudioKind::Audiobook => "audiobook",
        }
    }
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "song" => Ok(AudioKind::Song),
            "podcast" => Ok(AudioKind::Podcast),
            "audiobook" => Ok(AudioKind::Audiobook),
            _ => Err(UnknownKind),
        }
    }
}

/// Returned when a string does not name one of the record kinds.
#[derive(Clone, Copy, Debug)]
pub struct UnknownKind;

/// A single stored record of any kind.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AudioFile {
    Song(Song),
    Podcast(Podcast),
    Audiobook(Audiobook),
}

impl AudioFile {
    pub fn id(&self) -> Id {
        match self {
            AudioFile::Song(song) => song.id,
            AudioFile::Podcast(podcast) => podcast.id,
            AudioFile::Audiobook(audiobook) => audiobook.id,
        }
    }

    pub fn kind(&self) -> AudioKind {
        match self {
            AudioFile::Song(_) => AudioKind::Song,
            AudioFile::Podcast(_) => AudioKind::Podcast,
            AudioFile::Audiobook(_) => AudioKind::Audiobook,
        }
    }
}

/// A single song in the database.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Song {
    /// The ID of the record.
    pub(crate) id: Id,

    /// The name provided.
    pub(crate) name: String,

    /// The duration provided, in seconds.
    pub(crate) duration: i32,

    /// The time the record was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) uploaded_time: OffsetDateTime,
}

/// A single podcast in the database.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Podcast {
    /// The ID of the record.
    pub(crate) id: Id,

    /// The name provided.
    pub(crate) name: String,

    /// The duration provided, in seconds.
    pub(crate) duration: i32,

    /// The time the record was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) uploaded_time: OffsetDateTime,

    /// The host provided.
    pub(crate) host: String,

    /// The participants provided, if any.
    pub(crate) participants: Vec<String>,
}

/// A single audiobook in the database.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Audiobook {
    /// The ID of the record.
    pub(crate) id: Id,

    /// The name provided.
    pub(crate) name: String,

    /// The duration provided, in seconds.
    pub(crate) duration: i32,

    /// The time the record was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) uploaded_time: OffsetDateTime,

    /// The author provided.
    pub(crate) author: String,

    /// The narrator provided.
    pub(crate) narrator: String,
}

/// A validated record to insert, before the database assigns its ID and
/// upload time.
#[derive(Clone, Debug)]
pub enum NewAudioFile {
    Song(NewSong),
    Podcast(NewPodcast),
    Audiobook(NewAudiobook),
}

impl NewAudioFile {
    pub fn kind(&self) -> AudioKind {
        match self {
            NewAudioFile::Song(_) => AudioKind::Song,
            NewAudioFile::Podcast(_) => AudioKind::Podcast,
            NewAudioFile::Audiobook(_) => AudioKind::Audiobook,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewSong {
    pub(crate) name: String,
    pub(crate) duration: i32,
}

#[derive(Clone, Debug)]
pub struct NewPodcast {
    pub(crate) name: String,
    pub(crate) duration: i32,
    pub(crate) host: String,
    pub(crate) participants: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct NewAudiobook {
    pub(crate) name: String,
    pub(crate) duration: i32,
    pub(crate) author: String,
    pub(crate) narrator: String,
}

/// The validated field set of a full or partial update. Fields left as
/// `None` keep their stored values; fields that do not apply to the
/// record kind are never set.
#[derive(Clone, Debug, Default)]
pub struct MetadataUpdate {
    pub(crate) name: Option<String>,
    pub(crate) duration: Option<i32>,
    pub(crate) uploaded_time: Option<OffsetDateTime>,
    pub(crate) host: Option<String>,
    pub(crate) participants: Option<Vec<String>>,
    pub(crate) author: Option<String>,
    pub(crate) narrator: Option<String>,
}
