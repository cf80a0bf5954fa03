use std::path::Path;

use webgrade::classify::{
    Classification, Rejection, ResolvedUrl, SubmissionSource, classify_contents, classify_file,
};

fn hosted(contents: &str) -> Classification {
    classify_contents(contents, SubmissionSource::Hosted)
}

#[test]
fn redirect_wins_over_a_hyperlink() {
    let page = r#"<html><head>
        <meta http-equiv="Refresh" content="0; url=https://amy.github.io/cereal/">
        </head><body><a href="https://example.com/other">other</a></body></html>"#;
    match hosted(page) {
        Classification::Hosted(url) => assert_eq!(url.raw, "https://amy.github.io/cereal/"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn refresh_without_a_target_falls_back_to_the_hyperlink() {
    let page = r#"<meta http-equiv="refresh" content="5">
        <a href="https://amy.github.io/cereal/">my page</a>"#;
    match hosted(page) {
        Classification::Hosted(url) => assert_eq!(url.raw, "https://amy.github.io/cereal/"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn first_hyperlink_is_used_without_a_redirect() {
    let page = r#"<a href=" https://amy.neocities.org/ ">site</a><a href="https://x.example/">x</a>"#;
    match hosted(page) {
        Classification::Hosted(url) => {
            assert_eq!(url.raw, "https://amy.neocities.org/");
            assert!(url.validated);
            assert!(!url.is_local);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_url_is_rejected_with_score_one() {
    match hosted("<html><body><p>I forgot the link</p></body></html>") {
        Classification::Rejected(rejection) => {
            assert_eq!(rejection, Rejection::NoUrl);
            assert_eq!(rejection.score(), 1);
            assert!(rejection.feedback().starts_with("No valid URL found"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn loopback_urls_are_rejected_even_when_malformed() {
    for href in ["http://localhost:5500/index.html", "127.0.0.1/index.html", "http://[::1]/"] {
        let page = format!(r#"<a href="{href}">mine</a>"#);
        assert!(
            matches!(
                hosted(&page),
                Classification::Rejected(Rejection::LocalAddress { .. })
            ),
            "{href} should be local"
        );
    }
}

#[test]
fn urls_without_a_scheme_are_invalid() {
    let resolved = ResolvedUrl::new("www.amy.example/index.html");
    assert!(!resolved.validated);
    assert!(matches!(
        hosted(r#"<a href="www.amy.example/index.html">site</a>"#),
        Classification::Rejected(Rejection::InvalidUrl { .. })
    ));
}

#[test]
fn images_are_rejected_before_reading() {
    let classification = classify_file(Path::new("amy_cereal.PNG"), SubmissionSource::Hosted);
    match classification {
        Classification::Rejected(Rejection::WrongFileType { extension }) => {
            assert_eq!(extension, "png")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn uploaded_grading_rejects_link_only_files() {
    let link = r#"<a href="https://amy.github.io/">my page</a>"#;
    assert!(matches!(
        classify_contents(link, SubmissionSource::Uploaded),
        Classification::Rejected(Rejection::UrlInsteadOfFile { .. })
    ));

    let local = r#"<meta http-equiv="refresh" content="0;url=http://127.0.0.1:5500/">"#;
    assert!(matches!(
        classify_contents(local, SubmissionSource::Uploaded),
        Classification::Rejected(Rejection::LocalAddress { .. })
    ));

    let page = r#"<h1>Hi</h1><p>See <a href="https://example.com">this</a></p>"#;
    assert!(matches!(
        classify_contents(page, SubmissionSource::Uploaded),
        Classification::Uploaded(_)
    ));
}
