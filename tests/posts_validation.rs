use dashcharts::PostError;
use dashcharts::posts::{
    BODY_MAX_LENGTH, CreatePost, Post, PostCategory, PostFilters, PostsPage, SortBy, SortOrder,
    TITLE_MAX_LENGTH, UpdatePost, forbidden_word, validate_create, validate_update,
};
use serde_json::json;

fn draft() -> CreatePost {
    CreatePost {
        title: "Lunch menu".into(),
        body: "Kimchi stew on Friday".into(),
        category: PostCategory::Free,
        tags: vec!["food".into()],
    }
}

#[test]
fn query_contains_only_set_params_in_order() {
    assert_eq!(PostFilters::default().to_query(), "");

    let f = PostFilters {
        search: Some("coffee & tea".into()),
        category: Some(PostCategory::Qna),
        sort_by: Some(SortBy::CreatedAt),
        sort_order: Some(SortOrder::Desc),
        cursor: Some("abc-1".into()),
        limit: Some(10),
    };
    assert_eq!(
        f.to_query(),
        "search=coffee%20%26%20tea&category=QNA&sortBy=createdAt&sortOrder=desc&cursor=abc-1&limit=10"
    );

    let only_limit = PostFilters {
        limit: Some(5),
        search: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(only_limit.to_query(), "limit=5");
}

#[test]
fn valid_draft_passes() {
    assert_eq!(validate_create(&draft()), Ok(()));
}

#[test]
fn length_limits() {
    let mut p = draft();
    p.title = "   ".into();
    assert_eq!(validate_create(&p), Err(PostError::EmptyTitle));

    p.title = "가".repeat(TITLE_MAX_LENGTH);
    assert_eq!(validate_create(&p), Ok(()));
    p.title = "가".repeat(TITLE_MAX_LENGTH + 1);
    assert!(matches!(validate_create(&p), Err(PostError::TitleTooLong { .. })));

    let mut p = draft();
    p.body = "x".repeat(BODY_MAX_LENGTH + 1);
    assert_eq!(
        validate_create(&p),
        Err(PostError::BodyTooLong {
            len: BODY_MAX_LENGTH + 1,
            max: BODY_MAX_LENGTH
        })
    );
}

#[test]
fn tag_limits() {
    let mut p = draft();
    p.tags = (0..6).map(|i| format!("t{i}")).collect();
    assert!(matches!(validate_create(&p), Err(PostError::TooManyTags { count: 6, .. })));

    p.tags = vec!["x".repeat(25)];
    assert!(matches!(validate_create(&p), Err(PostError::TagTooLong { .. })));
}

#[test]
fn forbidden_words_are_rejected_everywhere() {
    assert_eq!(forbidden_word("연락은 텔레그램으로"), Some("텔레그램"));
    assert_eq!(forbidden_word("hello"), None);

    let mut p = draft();
    p.body = "프놈펜 여행".into();
    let err = validate_create(&p).unwrap_err();
    assert_eq!(
        err,
        PostError::ForbiddenWord {
            field: "body",
            word: "프놈펜".into()
        }
    );
    assert!(err.to_string().contains("body"));

    let mut p = draft();
    p.tags = vec!["캄보디아".into()];
    assert!(matches!(
        validate_create(&p),
        Err(PostError::ForbiddenWord { field: "tags", .. })
    ));
}

#[test]
fn update_checks_only_changed_fields() {
    assert_eq!(validate_update(&UpdatePost::default()), Ok(()));
    let patch = UpdatePost {
        title: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(validate_update(&patch), Err(PostError::EmptyTitle));

    let patch = UpdatePost {
        category: Some(PostCategory::Notice),
        ..Default::default()
    };
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"category": "NOTICE"}));
}

#[test]
fn page_decodes_camel_case() {
    let page: PostsPage = serde_json::from_value(json!({
        "items": [{
            "id": "p1",
            "userId": "u1",
            "title": "Hello",
            "body": "World",
            "category": "NOTICE",
            "tags": ["a"],
            "createdAt": "2025-01-02T03:04:05Z"
        }],
        "prevCursor": null,
        "nextCursor": "c2"
    }))
    .unwrap();
    assert_eq!(page.items.len(), 1);
    let post: &Post = &page.items[0];
    assert_eq!(post.category, PostCategory::Notice);
    assert_eq!(post.created_at.to_rfc3339(), "2025-01-02T03:04:05+00:00");
    assert!(post.updated_at.is_none());
    assert_eq!(page.next_cursor.as_deref(), Some("c2"));
}

#[test]
fn category_parsing_and_labels() {
    assert_eq!(PostCategory::parse(" qna "), Some(PostCategory::Qna));
    assert_eq!(PostCategory::parse("other"), None);
    assert_eq!(PostCategory::Qna.label(), "Q&A");
}
