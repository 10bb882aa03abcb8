//! # jam-api
//!
//! The web routing and orchestration layer for Jam Session.

pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod params;
pub mod response;

use actix_web::{web, HttpResponse};

use handlers::{audio_uploads, comments, posts, profiles, reviews, users};

/// Configures the routes for the API.
///
/// Scoped so the main binary can mount everything under a different prefix
/// if needed (e.g. /v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::get_posts))
                    .route(web::post().to(posts::create_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .service(
                web::resource("/comments")
                    .route(web::get().to(comments::get_comments))
                    .route(web::post().to(comments::create_comment))
                    .route(web::put().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            .service(
                web::resource("/audio_uploads")
                    .route(web::get().to(audio_uploads::get_audio_uploads))
                    .route(web::post().to(audio_uploads::create_audio_upload))
                    .route(web::put().to(audio_uploads::update_audio_upload))
                    .route(web::delete().to(audio_uploads::delete_audio_upload)),
            )
            .service(
                web::resource("/audio_uploads/upload")
                    .route(web::post().to(audio_uploads::upload_audio)),
            )
            .service(
                web::resource("/users")
                    .route(web::get().to(users::get_users))
                    .route(web::post().to(users::create_user))
                    .route(web::put().to(users::update_user))
                    .route(web::delete().to(users::delete_user)),
            )
            .service(
                web::resource("/users/password").route(web::put().to(users::update_password)),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(profiles::get_my_profile))
                    .route(web::post().to(profiles::create_profile))
                    .route(web::patch().to(profiles::patch_profile)),
            )
            .service(
                web::resource("/profile/user/{userId}")
                    .route(web::get().to(profiles::get_profile_by_user_id)),
            )
            .service(
                web::resource("/profile/{username}")
                    .route(web::get().to(profiles::get_profile_by_username)),
            )
            .service(web::resource("/all_profiles").route(web::get().to(profiles::all_profiles)))
            .service(
                web::resource("/reviews")
                    .route(web::get().to(reviews::get_reviews))
                    .route(web::post().to(reviews::create_review))
                    .route(web::put().to(reviews::update_review))
                    .route(web::delete().to(reviews::delete_review)),
            )
            .service(
                web::resource("/reviews/summary").route(web::get().to(reviews::review_summary)),
            ),
    );
    cfg.route("/health", web::get().to(handlers::health));
}

/// Malformed JSON bodies get the same envelope as every other 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Malformed JSON body: {err}");
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(response::Envelope::<()>::failure(message)),
        )
        .into()
    })
}
