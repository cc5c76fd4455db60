//! Batch upload with partial upstream failure.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use vitrine_core::Media;
use vitrine_integration_tests::TestContext;
use vitrine_server::media::MediaFile;

fn file(name: &str, content_type: &str) -> MediaFile {
    MediaFile {
        bytes: b"bytes".to_vec(),
        content_type: content_type.to_string(),
        file_name: Some(name.to_string()),
    }
}

#[tokio::test]
async fn test_one_failure_out_of_three_returns_two_in_order() {
    let ctx = TestContext::new();
    ctx.media.fail_upload_of("two.png");
    // The first file finishes last; results still follow request order.
    ctx.media
        .delay_upload_of("one.png", Duration::from_millis(50));

    let uploaded = ctx
        .state
        .uploads()
        .upload_all(vec![
            file("one.png", "image/png"),
            file("two.png", "image/png"),
            file("three.mp4", "video/mp4"),
        ])
        .await;

    assert_eq!(
        uploaded,
        vec![
            Media::image("https://media.test/catalog-items/one.png"),
            Media::video("https://media.test/catalog-items/three.mp4"),
        ]
    );
    assert_eq!(ctx.media.upload_calls(), 3);
}

#[tokio::test]
async fn test_all_failures_yield_empty_result() {
    let ctx = TestContext::new();
    ctx.media.fail_upload_of("a.png");
    ctx.media.fail_upload_of("b.png");

    let uploaded = ctx
        .state
        .uploads()
        .upload_all(vec![file("a.png", "image/png"), file("b.png", "image/png")])
        .await;

    assert!(uploaded.is_empty());
}
