// tests/providers_eleduck.rs
use jobwatch::sources::eleduck::{extract_post_body, EleduckSource};

const POSTS_JSON: &str = include_str!("fixtures/eleduck_posts.json");
const POST_HTML: &str = include_str!("fixtures/eleduck_post.html");

#[test]
fn listing_page_parses_posts() {
    let source = EleduckSource::new(reqwest::Client::new(), vec!["前端".to_string()]);
    let items = source.items_from_page(POSTS_JSON).unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "4yBzb");
    assert_eq!(items[0].title, "[全职远程] 招远程前端工程师 (React)");
    assert_eq!(
        items[0].link.as_deref(),
        Some("https://eleduck.com/posts/4yBzb")
    );

    // Null full_title falls back to title; numeric ids are stringified.
    assert_eq!(items[1].title, "产品经理一枚求带");
    assert_eq!(items[2].id, "90215");
}

#[test]
fn post_body_extraction_targets_the_content_region() {
    let body = extract_post_body(POST_HTML).unwrap();
    assert!(body.contains("前端工程师"));
    assert!(body.contains("React / TypeScript"));
    // nbsp entities are decoded and whitespace collapsed
    assert!(body.contains("25k - 40k"));
    // Comment region is outside .post-contents
    assert!(!body.contains("评论区"));
}
