//! Handler-level tests running the full route table against the in-memory
//! store, including the twelve-post pagination walk, facet filtering,
//! password stripping, review ownership and profile authentication.

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use jam_api::configure_routes;
use jam_api::handlers::AppState;
use jam_auth_simple::SimpleIdentityProvider;
use jam_core::models::{Post, Review};
use jam_core::store::MemoryStore;
use jam_core::traits::{BlobStore, Collection, JamStore, StoredBlob};

const TEST_SECRET: &str = "test-secret";

struct NullBlobStore;

#[async_trait]
impl BlobStore for NullBlobStore {
    async fn put(
        &self,
        path: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<StoredBlob> {
        Ok(StoredBlob {
            file_path: path.to_string(),
            url: format!("/media/{path}"),
        })
    }
}

fn app_state(store: MemoryStore) -> web::Data<AppState> {
    web::Data::new(AppState {
        store: Box::new(store),
        blobs: Box::new(NullBlobStore),
        auth: Box::new(SimpleIdentityProvider::new(TEST_SECRET)),
    })
}

fn sample_post(seq: u128, title: &str, tags: &[&str]) -> Post {
    Post {
        id: Uuid::from_u128(seq),
        user_id: "user_ada".to_string(),
        user_name: Some("ada".to_string()),
        title: title.to_string(),
        body: format!("body of {title}"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        audio_upload_id: None,
        album_art_url: None,
        created_at: Utc::now(),
    }
}

fn sample_review(post_id: Uuid, reviewer: &str, rating: u8) -> Review {
    Review {
        id: Uuid::now_v7(),
        post_id,
        reviewer_user_id: reviewer.to_string(),
        reviewer_user_name: None,
        rating,
        comment: None,
        created_at: Utc::now(),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn twelve_posts_walk_in_three_pages() {
    let store = MemoryStore::new();
    for seq in 1..=12 {
        store
            .posts()
            .insert(sample_post(seq, &format!("post {seq}"), &[]))
            .await
            .unwrap();
    }
    let app = init_app!(app_state(store));

    let page1: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/posts?limit=5")
            .to_request(),
    )
    .await;
    assert_eq!(page1["success"], true);
    assert_eq!(page1["count"], 5);
    assert_eq!(
        page1["nextCursor"],
        json!(Uuid::from_u128(5).to_string())
    );

    let uri = format!(
        "/api/posts?limit=5&cursor={}",
        page1["nextCursor"].as_str().unwrap()
    );
    let page2: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(page2["count"], 5);
    assert_eq!(
        page2["nextCursor"],
        json!(Uuid::from_u128(10).to_string())
    );

    let uri = format!(
        "/api/posts?limit=5&cursor={}",
        page2["nextCursor"].as_str().unwrap()
    );
    let page3: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(page3["count"], 2);
    assert!(page3["nextCursor"].is_null());
}

#[actix_web::test]
async fn facets_and_search_filter_the_newsfeed() {
    let store = MemoryStore::new();
    store
        .posts()
        .insert(sample_post(1, "guitar rock", &["instrument:guitar", "genre:rock"]))
        .await
        .unwrap();
    store
        .posts()
        .insert(sample_post(2, "bass rock", &["instrument:bass", "genre:rock"]))
        .await
        .unwrap();
    store
        .posts()
        .insert(sample_post(3, "drums jazz", &["instrument:drums", "genre:jazz"]))
        .await
        .unwrap();
    let app = init_app!(app_state(store));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/posts?instrument=guitar&instrument=drums&genre=rock")
            .to_request(),
    )
    .await;
    // (guitar OR drums) AND rock
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "guitar rock");

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/posts?search=DRUMS")
            .to_request(),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "drums jazz");
}

#[actix_web::test]
async fn single_post_lookup_validates_and_404s() {
    let app = init_app!(app_state(MemoryStore::new()));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/posts?id=not-a-record-id")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let uri = format!("/api/posts?id={}", Uuid::now_v7());
    let resp =
        test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn post_crud_round_trip() {
    let app = init_app!(app_state(MemoryStore::new()));

    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({
                "userId": "user_ada",
                "title": "Looking for a Drummer",
                "body": "weekly rehearsals",
                "tags": ["instrument:drums"]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri("/api/posts")
            .set_json(json!({ "id": id, "title": "Found one!" }))
            .to_request(),
    )
    .await;
    assert_eq!(updated["data"]["title"], "Found one!");
    assert_eq!(updated["data"]["body"], "weekly rehearsals");

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/posts?id={id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/posts?id={id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn missing_required_fields_are_rejected_before_the_store() {
    let app = init_app!(app_state(MemoryStore::new()));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "no author" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn users_never_expose_the_password_hash() {
    let app = init_app!(app_state(MemoryStore::new()));

    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({
                "username": "carla",
                "password": "correct horse battery",
                "instruments": ["Piano"]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created["success"], true);
    assert!(created["data"].get("passwordHash").is_none());

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/users").to_request(),
    )
    .await;
    assert_eq!(listed["count"], 1);
    assert!(listed["data"][0].get("passwordHash").is_none());

    // Too-short passwords never reach the store.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "username": "dee", "password": "short" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn review_mutations_are_owner_only() {
    let store = MemoryStore::new();
    let post_id = Uuid::from_u128(42);
    let review = store
        .reviews()
        .insert(sample_review(post_id, "user_ben", 4))
        .await
        .unwrap();
    let app = init_app!(app_state(store));

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/reviews")
            .set_json(json!({
                "id": review.id.to_string(),
                "reviewerUserId": "user_imposter",
                "rating": 1
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!(
                "/api/reviews?id={}&userId=user_imposter",
                review.id
            ))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    // Out-of-range ratings are rejected even for the owner.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/reviews")
            .set_json(json!({
                "id": review.id.to_string(),
                "reviewerUserId": "user_ben",
                "rating": 9
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/reviews?id={}&userId=user_ben", review.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn review_summary_aggregates_for_one_post() {
    let store = MemoryStore::new();
    let post_id = Uuid::from_u128(7);
    for rating in [5, 5, 5, 1] {
        store
            .reviews()
            .insert(sample_review(post_id, "user_ben", rating))
            .await
            .unwrap();
    }
    // A review of another post must not leak into the aggregate.
    store
        .reviews()
        .insert(sample_review(Uuid::from_u128(8), "user_ben", 1))
        .await
        .unwrap();
    let app = init_app!(app_state(store));

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/reviews/summary?postId={}", post_id))
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["average"], "4.0");
    assert_eq!(body["data"]["stars"], 4);
    assert_eq!(body["data"]["count"], 4);
}

#[actix_web::test]
async fn profile_endpoints_require_a_bearer_token() {
    let app = init_app!(app_state(MemoryStore::new()));
    let auth = SimpleIdentityProvider::new(TEST_SECRET);
    let token = auth.issue_token("user_ada");

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/api/profile").to_request()).await;
    assert_eq!(resp.status(), 401);

    // No profile yet: authenticated GET answers 200 with null data.
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/profile")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/profile")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "username": "ada", "instruments": ["Guitar"] }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    // One profile per identity.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/profile")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "username": "ada2" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // Public lookup by username needs no token.
    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/profile/ada")
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["userId"], "user_ada");
}

#[actix_web::test]
async fn comments_filter_by_parent_and_allow_anonymous_authors() {
    let app = init_app!(app_state(MemoryStore::new()));
    let parent = Uuid::from_u128(11);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/comments")
            .set_json(json!({
                "parentType": "Post",
                "parentId": parent.to_string(),
                "text": "nice take"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/comments")
            .set_json(json!({
                "parentType": "AudioUpload",
                "parentId": Uuid::from_u128(12).to_string(),
                "text": "other parent"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/comments?parentId={parent}"))
            .to_request(),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["text"], "nice take");
    assert!(body["data"][0]["userId"].is_null());

    // Malformed parent filter is a 400, unlike an unknown-but-valid one.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/comments?parentId=garbage")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn health_answers_without_auth() {
    let app = init_app!(app_state(MemoryStore::new()));
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
    assert_eq!(body["status"], "ok");
}
