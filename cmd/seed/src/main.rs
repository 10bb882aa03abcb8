//! Seeds the document store with a small demo data set: two identities
//! with profiles, a legacy account, tagged posts, an audio upload record,
//! reviews and comments. Safe to point at an empty database; re-running
//! against an existing one simply inserts another batch.

use chrono::Utc;
use uuid::Uuid;

use jam_auth_simple::SimpleIdentityProvider;
use jam_core::models::{AudioUpload, Comment, ParentKind, Post, Profile, Review, User};
use jam_core::tags::{encode_tag, FacetKind};
use jam_core::traits::{Collection, IdentityProvider, JamStore};
use jam_store_sqlite::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        std::env::var("JAM_DATABASE_URL").unwrap_or_else(|_| "sqlite:jam_session.db".to_string());
    let auth_secret =
        std::env::var("JAM_AUTH_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());

    let store = SqliteStore::new(&database_url).await?;
    let auth = SimpleIdentityProvider::new(&auth_secret);

    let ada = "user_ada";
    let ben = "user_ben";

    for (user_id, username, instruments, genre, location) in [
        (ada, "ada", vec!["Guitar", "Vocals"], "Rock", "Berlin"),
        (ben, "ben", vec!["Drums"], "Jazz", "Hamburg"),
    ] {
        store
            .profiles()
            .insert(Profile {
                id: Uuid::now_v7(),
                user_id: user_id.to_string(),
                username: Some(username.to_string()),
                instruments: instruments.iter().map(|s| s.to_string()).collect(),
                preferred_genre: Some(genre.to_string()),
                location: Some(location.to_string()),
                contact: Some(format!("{username}@example.com")),
                created_at: Utc::now(),
            })
            .await?;
    }

    store
        .users()
        .insert(User {
            id: Uuid::now_v7(),
            username: "legacy_carla".to_string(),
            password_hash: auth.hash_password("correct horse battery")?,
            instruments: vec!["Piano".to_string()],
            preferred_genre: Some("Pop".to_string()),
            location: Some("Köln".to_string()),
            contact: None,
            created_at: Utc::now(),
        })
        .await?;

    let upload = store
        .audio_uploads()
        .insert(AudioUpload {
            id: Uuid::now_v7(),
            user_id: ada.to_string(),
            filename: "first-take.mp3".to_string(),
            title: Some("First take".to_string()),
            tags: vec![encode_tag(FacetKind::Genre, "Rock")],
            file_path: Some(format!("audio/{ada}/0-first-take.mp3")),
            url: Some(format!("/media/audio/{ada}/0-first-take.mp3")),
            mime_type: Some("audio/mpeg".to_string()),
            original_name: Some("first-take.mp3".to_string()),
            size: Some(3_141_592),
            created_at: Utc::now(),
        })
        .await?;

    let mut first_post = None;
    for (user_id, user_name, title, body, tags) in [
        (
            ada,
            "ada",
            "Looking for a drummer",
            "Weekly rehearsals, originals only.",
            vec![
                encode_tag(FacetKind::Skill, "Intermediate"),
                encode_tag(FacetKind::Instrument, "Drums"),
                encode_tag(FacetKind::Genre, "Rock"),
            ],
        ),
        (
            ben,
            "ben",
            "Jazz trio wants a bassist",
            "Standards and a few originals, gigs monthly.",
            vec![
                encode_tag(FacetKind::Skill, "Professional"),
                encode_tag(FacetKind::Instrument, "Bass"),
                encode_tag(FacetKind::Genre, "Jazz"),
            ],
        ),
        (
            ada,
            "ada",
            "Feedback on my first take?",
            "Rough mix attached, be gentle.",
            vec![encode_tag(FacetKind::Genre, "Rock")],
        ),
    ] {
        let post = store
            .posts()
            .insert(Post {
                id: Uuid::now_v7(),
                user_id: user_id.to_string(),
                user_name: Some(user_name.to_string()),
                title: title.to_string(),
                body: body.to_string(),
                tags,
                audio_upload_id: (title.contains("take")).then_some(upload.id),
                album_art_url: None,
                created_at: Utc::now(),
            })
            .await?;
        first_post.get_or_insert(post);
    }

    let post = first_post.expect("seeded at least one post");
    store
        .reviews()
        .insert(Review {
            id: Uuid::now_v7(),
            post_id: post.id,
            reviewer_user_id: ben.to_string(),
            reviewer_user_name: Some("ben".to_string()),
            rating: 5,
            comment: Some("Tight groove, would jam again.".to_string()),
            created_at: Utc::now(),
        })
        .await?;

    store
        .comments()
        .insert(Comment {
            id: Uuid::now_v7(),
            user_id: Some(ben.to_string()),
            user_name: Some("ben".to_string()),
            parent_type: ParentKind::Post,
            parent_id: post.id,
            text: "Still looking? I might know someone.".to_string(),
            created_at: Utc::now(),
        })
        .await?;

    log::info!("seeded demo data into {database_url}");
    log::info!("bearer token for {ada}: {}", auth.issue_token(ada));
    log::info!("bearer token for {ben}: {}", auth.issue_token(ben));
    Ok(())
}
