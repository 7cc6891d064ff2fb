//! Human-readable track descriptions for logs and status lines

use crate::types::TrackRecord;

/// `artist / album / title`
pub fn format_track(track: &TrackRecord) -> String {
    format!(
        "{} / {} / {}",
        track.artist_name, track.album_name, track.track_name
    )
}

/// `artist / album / title (date, QUALITY)`, omitting the date when unknown
pub fn format_track_detail(track: &TrackRecord) -> String {
    match &track.album_release_date {
        Some(date) => format!(
            "{} ({}, {})",
            format_track(track),
            date,
            track.quality_tag.as_str()
        ),
        None => format!("{} ({})", format_track(track), track.quality_tag.as_str()),
    }
}
