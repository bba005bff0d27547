mod common;

use common::{FakeExtractor, audio_only, video};
use tubesave::validator::{self, LinkStatus};
use tubesave::{MediaSource, YtDlp, selector};

#[tokio::test]
async fn always_failing_extractor_is_invalid_failed() {
    let extractor = FakeExtractor::new();
    assert_eq!(
        validator::validate(&extractor, "https://x/missing").await,
        LinkStatus::InvalidFailed
    );
    assert_eq!(
        validator::validate_playlist(&extractor, "https://x/playlist?list=PL1").await,
        LinkStatus::InvalidFailed
    );
}

#[tokio::test]
async fn regex_errors_are_invalid_regex() {
    let extractor = FakeExtractor::new();
    assert_eq!(
        validator::validate(&extractor, "not a link").await,
        LinkStatus::InvalidRegex
    );
}

#[tokio::test]
async fn malformed_links_never_reach_yt_dlp() {
    // The binary does not exist: a spawn attempt would be an InvalidFailed.
    let extractor = YtDlp::new("/nonexistent/yt-dlp");
    assert_eq!(
        validator::validate(&extractor, "youtube dot com").await,
        LinkStatus::InvalidRegex
    );
    assert_eq!(
        validator::validate(&extractor, "https://www.youtube.com/watch?v=dQw4w9WgXcQ").await,
        LinkStatus::InvalidFailed
    );
}

#[tokio::test]
async fn known_video_is_valid() {
    let extractor = FakeExtractor::new().with_video(video("https://x/video1", "My Song!"));
    let status = validator::validate(&extractor, "  https://x/video1  ").await;
    assert!(status.is_valid());
}

#[tokio::test]
async fn listed_resolutions_are_unique_and_descending() {
    let extractor = FakeExtractor::new().with_video(video("https://x/clip", "Clip"));
    let list = selector::list_resolutions(&extractor, &MediaSource::new("https://x/clip"))
        .await
        .unwrap();

    let labels: Vec<&str> = list.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(labels, vec!["1080p", "720p"]);
    let mut unique = labels.clone();
    unique.dedup();
    assert_eq!(unique, labels);
}

#[tokio::test]
async fn stream_lookups_follow_their_failure_contracts() {
    let extractor = FakeExtractor::new().with_video(audio_only("https://x/pod", "Pod"));
    let pod = MediaSource::new("https://x/pod");
    let gone = MediaSource::new("https://x/gone");

    assert_eq!(
        selector::highest_audio(&extractor, &pod).await.unwrap().format_id,
        "251"
    );
    assert!(selector::highest_audio(&extractor, &gone).await.is_err());
    assert!(selector::highest_video(&extractor, &pod).await.is_none());
    assert!(selector::highest_video(&extractor, &gone).await.is_none());
    assert!(selector::list_resolutions(&extractor, &gone).await.is_err());
}

#[tokio::test]
async fn unknown_link_mentioning_regex_is_invalid_failed() {
    let extractor = FakeExtractor::new();
    assert_eq!(
        validator::validate(&extractor, "https://x/regex-guide").await,
        LinkStatus::InvalidFailed
    );
}
