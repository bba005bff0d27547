//! Picking stream variants out of what the extractor offers.

use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::model::{MediaSource, StreamDescriptor, StreamKind};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// The only container video variants are picked from; it muxes with AAC audio
/// without re-encoding the video track.
pub const VIDEO_CONTAINER: &str = "mp4";

/// Orders video formats by resolution, then bitrate.
fn compare_video(a: &StreamDescriptor, b: &StreamDescriptor) -> Ordering {
    let a_height = a.height.unwrap_or(0);
    let b_height = b.height.unwrap_or(0);

    a_height.cmp(&b_height).then_with(|| {
        let a_rate = a.bitrate.unwrap_or(OrderedFloat(0.0));
        let b_rate = b.bitrate.unwrap_or(OrderedFloat(0.0));
        a_rate.cmp(&b_rate)
    })
}

fn is_selectable_video(stream: &StreamDescriptor) -> bool {
    stream.kind == StreamKind::VideoOnly
        && stream.container == VIDEO_CONTAINER
        && stream.height.is_some()
}

/// Non-progressive video variants in [`VIDEO_CONTAINER`], highest resolution
/// first, one entry per resolution label (the highest bitrate one).
pub fn resolutions(streams: &[StreamDescriptor]) -> Vec<(String, StreamDescriptor)> {
    let mut candidates: Vec<&StreamDescriptor> =
        streams.iter().filter(|s| is_selectable_video(s)).collect();
    candidates.sort_by(|a, b| compare_video(b, a));

    let mut unique: Vec<(String, StreamDescriptor)> = Vec::new();
    for stream in candidates {
        let Some(label) = stream.resolution() else {
            continue;
        };
        if unique.iter().any(|(seen, _)| *seen == label) {
            continue;
        }
        unique.push((label, stream.clone()));
    }
    unique
}

/// The audio-only variant with the highest bitrate.
pub fn best_audio(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    streams
        .iter()
        .filter(|s| s.kind == StreamKind::AudioOnly)
        .max_by_key(|s| s.bitrate.unwrap_or(OrderedFloat(0.0)))
}

/// The highest resolution video variant in [`VIDEO_CONTAINER`].
pub fn best_video(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    streams
        .iter()
        .filter(|s| is_selectable_video(s))
        .max_by(|a, b| compare_video(a, b))
}

/// Fetches the video's variants and returns [`resolutions`] of them.
pub async fn list_resolutions<E: Extractor + ?Sized>(
    extractor: &E,
    source: &MediaSource,
) -> Result<Vec<(String, StreamDescriptor)>> {
    let info = extractor.fetch_info(source).await?;
    Ok(resolutions(&info.streams))
}

/// Fetches the video's variants and returns the best audio one.
pub async fn highest_audio<E: Extractor + ?Sized>(
    extractor: &E,
    source: &MediaSource,
) -> Result<StreamDescriptor> {
    let info = extractor.fetch_info(source).await?;
    best_audio(&info.streams)
        .cloned()
        .ok_or_else(|| Error::StreamUnavailable("audio".to_string()))
}

/// Fetches the video's variants and returns the best video one. Any failure,
/// including the fetch itself, yields `None`.
pub async fn highest_video<E: Extractor + ?Sized>(
    extractor: &E,
    source: &MediaSource,
) -> Option<StreamDescriptor> {
    match extractor.fetch_info(source).await {
        Ok(info) => best_video(&info.streams).cloned(),
        Err(e) => {
            log::debug!("No video stream for {}: {}", source, e);
            None
        }
    }
}
