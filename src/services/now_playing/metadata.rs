use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

use super::{MediaError, PlaybackStatus, Track};

const TITLE_KEY: &str = "xesam:title";
const ALBUM_KEY: &str = "xesam:album";
const ARTIST_KEY: &str = "xesam:artist";
const ART_URL_KEY: &str = "mpris:artUrl";

/// Decode the value of the `PlaybackStatus` property
///
/// # Errors
/// Returns `MediaError::MalformedPlaybackStatus` if the value is not one of the
/// MPRIS status strings.
pub fn decode_playback_status(value: &Value<'_>) -> Result<PlaybackStatus, MediaError> {
    let status = as_str(value).ok_or_else(|| {
        MediaError::MalformedPlaybackStatus(format!("expected a string, got {}", value.value_signature()))
    })?;
    status.parse()
}

/// Decode the value of the `Metadata` property into a track
///
/// # Errors
/// Returns `MediaError::MalformedMetadata` if the value is not a dictionary or any
/// of title, album, artist and art URL is missing or has the wrong type.
pub fn decode_track(value: &Value<'_>) -> Result<Track, MediaError> {
    let owned = value
        .try_to_owned()
        .map_err(|e| MediaError::MalformedMetadata(e.to_string()))?;
    let map = HashMap::<String, OwnedValue>::try_from(unwrap_variant_owned(owned))
        .map_err(|e| MediaError::MalformedMetadata(format!("expected a{{sv}}: {e}")))?;

    track_from_map(&map)
}

/// Build a track from an already decoded metadata map
///
/// # Errors
/// Returns `MediaError::MalformedMetadata` if a required key is missing or mistyped.
pub fn track_from_map(metadata: &HashMap<String, OwnedValue>) -> Result<Track, MediaError> {
    Ok(Track {
        title: required_str(metadata, TITLE_KEY)?,
        album: required_str(metadata, ALBUM_KEY)?,
        artists: required_artists(metadata)?,
        art_url: required_str(metadata, ART_URL_KEY)?,
    })
}

fn required_str(metadata: &HashMap<String, OwnedValue>, key: &str) -> Result<String, MediaError> {
    let value = metadata
        .get(key)
        .ok_or_else(|| MediaError::MalformedMetadata(format!("missing {key}")))?;

    as_str(value)
        .map(str::to_string)
        .ok_or_else(|| MediaError::MalformedMetadata(format!("{key} is not a string")))
}

fn required_artists(metadata: &HashMap<String, OwnedValue>) -> Result<Vec<String>, MediaError> {
    let value = metadata
        .get(ARTIST_KEY)
        .ok_or_else(|| MediaError::MalformedMetadata(format!("missing {ARTIST_KEY}")))?;

    match unwrap_variant(value) {
        Value::Array(array) => array
            .iter()
            .map(|artist| {
                as_str(artist).map(str::to_string).ok_or_else(|| {
                    MediaError::MalformedMetadata(format!("{ARTIST_KEY} holds a non-string entry"))
                })
            })
            .collect(),
        // Some players send a single artist as a plain string.
        Value::Str(artist) => Ok(vec![artist.to_string()]),
        _ => Err(MediaError::MalformedMetadata(format!(
            "{ARTIST_KEY} is not a string list"
        ))),
    }
}

fn as_str<'a>(value: &'a Value<'_>) -> Option<&'a str> {
    match unwrap_variant(value) {
        Value::Str(s) => Some(s.as_str()),
        _ => None,
    }
}

fn unwrap_variant<'a, 'v>(value: &'a Value<'v>) -> &'a Value<'v> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}

fn unwrap_variant_owned(value: OwnedValue) -> OwnedValue {
    match &*value {
        Value::Value(inner) => match inner.try_to_owned() {
            Ok(inner) => unwrap_variant_owned(inner),
            Err(_) => value,
        },
        _ => value,
    }
}
