//! HTTP-level tests over an in-memory application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};

use yatube_core::domain::{Authored, NewGroup, NewPost, NewUser, Post, User};
use yatube_core::ports::{
    BaseRepository, INDEX_CACHE_PREFIX, PasswordService, PostFilter, SessionTokens,
};
use yatube_core::services::Repositories;
use yatube_infra::{
    Argon2PasswordService, InMemoryRateLimiter, InMemoryStore, JwtConfig, JwtSessionTokens,
    RateLimitConfig,
};
use yatube_shared::dto::{CommentFormData, LoginFormData, SignupFormData};

use super::multipart::MAX_TEXT_FIELD_BYTES;
use super::{configure_routes, not_found};
use crate::config::WebSettings;
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::csrf::Csrf;
use crate::middleware::error::error_pages;
use crate::state::AppState;

const HOST: &str = "testserver";
const ORIGIN: &str = "http://testserver";
const BOUNDARY: &str = "----yatube-test-boundary";
const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(Csrf)
                .wrap(error_pages())
                .app_data(web::Data::new($state.clone()))
                .configure(|cfg| configure_routes(cfg, $state.auth_limiter.clone()))
                .default_service(web::to(not_found)),
        )
        .await
    };
}

struct Fixture {
    state: AppState,
    repos: Repositories,
}

fn media_root() -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    std::env::temp_dir().join(format!(
        "yatube-web-test-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ))
}

fn fixture() -> Fixture {
    let settings = WebSettings {
        media_root: media_root(),
        ..WebSettings::default()
    };
    let (state, store): (AppState, InMemoryStore) = AppState::in_memory(settings);
    Fixture {
        state,
        repos: store.repositories(),
    }
}

impl Fixture {
    async fn user(&self, username: &str) -> User {
        self.repos
            .users
            .create(NewUser::new(username, "!unusable"))
            .await
            .unwrap()
    }

    async fn group(&self, slug: &str) -> i64 {
        self.repos
            .groups
            .create(NewGroup::new("Test group", slug, "Test description").unwrap())
            .await
            .unwrap()
            .id
    }

    async fn post(&self, author: &User, text: &str, group_id: Option<i64>) -> Post {
        self.repos
            .posts
            .create(NewPost {
                content: Authored::new(author.id, text),
                group_id,
                image: None,
            })
            .await
            .unwrap()
    }
}

fn session(user: &User) -> Cookie<'static> {
    let token = JwtSessionTokens::new(JwtConfig::default())
        .issue(user.id, &user.username)
        .unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

/// A same-origin POST, the way a browser submits the site's own forms.
fn form_post(uri: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::HOST, HOST))
        .insert_header((header::ORIGIN, ORIGIN))
}

fn multipart_body(text: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    multipart_body_bytes(text.as_bytes(), image)
}

fn multipart_body_bytes(text: &[u8], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"text\"\r\n\r\n");
    body.extend_from_slice(text);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"group\"\r\n\r\n\r\n");

    if let Some((filename, data)) = image {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/gif\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_post(uri: &str, body: Vec<u8>) -> test::TestRequest {
    form_post(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

fn location(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn template(body: &str) -> Option<&str> {
    let start = body.find("data-template=\"")? + "data-template=\"".len();
    let end = body[start..].find('"')?;
    Some(&body[start..start + end])
}

fn articles(body: &str) -> usize {
    body.matches("<article>").count()
}

#[actix_web::test]
async fn test_public_pages_render_their_templates() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let group_id = fx.group("test-slug").await;
    let post = fx.post(&author, "Test post", Some(group_id)).await;
    let app = init_app!(fx.state);

    let cases = [
        ("/".to_string(), "posts/index.html"),
        ("/group/test-slug/".to_string(), "posts/group_list.html"),
        ("/profile/leo/".to_string(), "posts/profile.html"),
        (format!("/posts/{}/", post.id), "posts/post_detail.html"),
        ("/about/author/".to_string(), "about/author.html"),
        ("/about/tech/".to_string(), "about/tech.html"),
        ("/auth/signup/".to_string(), "users/signup.html"),
        ("/auth/login/".to_string(), "users/login.html"),
    ];

    for (uri, expected) in cases {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(template(&body), Some(expected), "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_authorized_pages_render_their_templates() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let post = fx.post(&author, "Test post", None).await;
    let app = init_app!(fx.state);

    let cases = [
        ("/create/".to_string(), "posts/create_post.html"),
        (format!("/posts/{}/edit/", post.id), "posts/create_post.html"),
        ("/follow/".to_string(), "posts/follow.html"),
        ("/auth/password_change/".to_string(), "users/password_change.html"),
        ("/auth/password_change/done/".to_string(), "users/password_change_done.html"),
    ];

    for (uri, expected) in cases {
        let req = test::TestRequest::get()
            .uri(&uri)
            .cookie(session(&author))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(template(&body), Some(expected), "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_anonymous_is_redirected_to_login() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let post = fx.post(&author, "Test post", None).await;
    let app = init_app!(fx.state);

    for uri in ["/create/", "/follow/", "/auth/password_change/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            location(&resp),
            format!("/auth/login/?next={}", urlencoding::encode(uri))
        );
    }

    let uri = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", post.id));
}

#[actix_web::test]
async fn test_unknown_page_renders_404_template() {
    let fx = fixture();
    let app = init_app!(fx.state);

    for uri in ["/unexisting_page/", "/posts/999/", "/group/nope/", "/profile/nobody/"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", uri);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(template(&body), Some("core/404.html"));
        assert!(body.contains(uri));
    }
}

#[actix_web::test]
async fn test_404_page_keeps_signed_in_navigation() {
    let fx = fixture();
    let user = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::get()
        .uri("/posts/404/")
        .cookie(session(&user))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("/auth/logout/"));
}

#[actix_web::test]
async fn test_group_page_paginates_by_ten() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let group_id = fx.group("test").await;
    for i in 0..13 {
        fx.post(&author, &format!("Post number {}", i), Some(group_id)).await;
    }
    let app = init_app!(fx.state);

    for (uri, expected) in [
        ("/group/test/", 10),
        ("/group/test/?page=2", 3),
        ("/group/test/?page=99", 3),
        ("/group/test/?page=abc", 10),
        ("/group/test/?page=2.0", 10),
        ("/group/test/?page=0", 3),
        ("/group/test/?page=-1", 3),
        ("/", 10),
        ("/?page=0", 3),
        ("/profile/leo/?page=2", 3),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(articles(&body), expected, "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_post_in_group_is_not_listed_in_other_group() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let first = fx.group("first").await;
    fx.group("second").await;
    fx.post(&author, "Grouped post", Some(first)).await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::get().uri("/group/first/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&body).contains("Grouped post"));

    let req = test::TestRequest::get().uri("/group/second/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(!String::from_utf8_lossy(&body).contains("Grouped post"));
}

#[actix_web::test]
async fn test_index_is_cached_until_cleared() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::get().uri("/").to_request();
    let before = test::call_and_read_body(&app, req).await;

    fx.post(&author, "Fresh post", None).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let cached = test::call_and_read_body(&app, req).await;
    assert_eq!(before, cached);
    assert!(!String::from_utf8_lossy(&cached).contains("Fresh post"));

    fx.state.cache.delete_prefix(INDEX_CACHE_PREFIX).await.unwrap();

    let req = test::TestRequest::get().uri("/").to_request();
    let fresh = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&fresh).contains("Fresh post"));
}

#[actix_web::test]
async fn test_index_cache_expires() {
    let mut fx = fixture();
    fx.state.settings = Arc::new(WebSettings {
        index_cache_ttl: Duration::from_millis(50),
        ..WebSettings::default()
    });
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::get().uri("/").to_request();
    test::call_and_read_body(&app, req).await;

    fx.post(&author, "Fresh post", None).await;
    tokio::time::sleep(Duration::from_millis(120)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&body).contains("Fresh post"));
}

#[actix_web::test]
async fn test_create_post_redirects_to_profile() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = multipart_post("/create/", multipart_body("Brand new post", None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");
    assert_eq!(fx.repos.posts.count(PostFilter::All).await.unwrap(), 1);

    let stored = fx.repos.posts.list(PostFilter::All, 0, 1).await.unwrap();
    assert_eq!(stored[0].content.text, "Brand new post");
    assert_eq!(stored[0].author_id(), author.id);
}

#[actix_web::test]
async fn test_create_post_with_image_is_served_from_media() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let body = multipart_body("Post with picture", Some(("small.gif", SMALL_GIF)));
    let req = multipart_post("/create/", body)
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let stored = fx.repos.posts.list(PostFilter::All, 0, 1).await.unwrap();
    let image = stored[0].image.clone().unwrap();
    assert!(image.starts_with("posts/"));

    let req = test::TestRequest::get()
        .uri(&format!("/media/{}", image))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/gif");
    assert_eq!(test::read_body(resp).await.as_ref(), SMALL_GIF);

    // The image shows up on the listing pages.
    let req = test::TestRequest::get().uri("/profile/leo/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&body).contains(&format!("/media/{}", image)));
}

#[actix_web::test]
async fn test_create_post_rejects_non_image_upload() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let body = multipart_body("Text", Some(("notes.gif", b"plain text, not a picture")));
    let req = multipart_post("/create/", body)
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(template(&body), Some("posts/create_post.html"));
    assert_eq!(fx.repos.posts.count(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_post_with_blank_text_redisplays_form() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = multipart_post("/create/", multipart_body("   ", None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fx.repos.posts.count(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_long_post_text_is_stored_whole() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    // Past 64 KiB, with a multibyte character straddling that boundary.
    let text = format!("{}ж{}", "a".repeat(65_535), "b".repeat(4_000));
    let req = multipart_post("/create/", multipart_body(&text, None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let stored = fx.repos.posts.list(PostFilter::All, 0, 1).await.unwrap();
    assert_eq!(stored[0].content.text.len(), text.len());
    assert_eq!(stored[0].content.text, text);
}

#[actix_web::test]
async fn test_oversized_post_text_redisplays_form() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let text = "a".repeat(MAX_TEXT_FIELD_BYTES + 1);
    let req = multipart_post("/create/", multipart_body(&text, None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(template(&body), Some("posts/create_post.html"));
    assert!(body.contains(&format!("at most {} bytes", MAX_TEXT_FIELD_BYTES)));
    assert_eq!(fx.repos.posts.count(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_non_utf8_post_text_redisplays_form() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = multipart_post("/create/", multipart_body_bytes(b"caf\xe9", None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(template(&body), Some("posts/create_post.html"));
    assert!(body.contains("Enter text in UTF-8 encoding."));
    assert_eq!(fx.repos.posts.count(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_author_edits_post() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let post = fx.post(&author, "Original text", None).await;
    let app = init_app!(fx.state);

    let uri = format!("/posts/{}/edit/", post.id);
    let req = multipart_post(&uri, multipart_body("Edited text", None))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    let stored = fx.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.content.text, "Edited text");
    assert_eq!(stored.content.created, post.content.created);
}

#[actix_web::test]
async fn test_non_author_cannot_edit_post() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let intruder = fx.user("mallory").await;
    let post = fx.post(&author, "Original text", None).await;
    let app = init_app!(fx.state);

    let uri = format!("/posts/{}/edit/", post.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(session(&intruder))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = multipart_post(&uri, multipart_body("Hacked", None))
        .cookie(session(&intruder))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = fx.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.content.text, "Original text");
}

#[actix_web::test]
async fn test_delete_post() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let other = fx.user("mallory").await;
    let post = fx.post(&author, "Short-lived", None).await;
    let app = init_app!(fx.state);

    let uri = format!("/posts/{}/delete/", post.id);

    let req = form_post(&uri).cookie(session(&other)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert!(fx.repos.posts.find_by_id(post.id).await.unwrap().is_some());

    let req = form_post(&uri).cookie(session(&author)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/profile/leo/");
    assert!(fx.repos.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_comment_shows_on_post_detail() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let reader = fx.user("reader").await;
    let post = fx.post(&author, "Discuss me", None).await;
    let app = init_app!(fx.state);

    let req = form_post(&format!("/posts/{}/comment/", post.id))
        .cookie(session(&reader))
        .set_form(CommentFormData {
            text: "Great post".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&body).contains("Great post"));
}

#[actix_web::test]
async fn test_anonymous_cannot_comment() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let post = fx.post(&author, "Discuss me", None).await;
    let app = init_app!(fx.state);

    let req = form_post(&format!("/posts/{}/comment/", post.id))
        .set_form(CommentFormData {
            text: "Drive-by".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/auth/login/?next="));
    assert!(fx.repos.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_on_missing_post_is_404() {
    let fx = fixture();
    let reader = fx.user("reader").await;
    let app = init_app!(fx.state);

    let req = form_post("/posts/12345/comment/")
        .cookie(session(&reader))
        .set_form(CommentFormData {
            text: "Hello?".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_follow_and_unfollow() {
    let fx = fixture();
    let author = fx.user("author").await;
    let follower = fx.user("follower").await;
    let bystander = fx.user("bystander").await;
    fx.post(&author, "For my followers", None).await;
    let app = init_app!(fx.state);

    let req = form_post("/profile/author/follow/")
        .cookie(session(&follower))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/follow/");
    assert!(fx.repos.follows.find(follower.id, author.id).await.unwrap().is_some());

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(session(&follower))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(String::from_utf8_lossy(&body).contains("For my followers"));

    let req = test::TestRequest::get()
        .uri("/follow/")
        .cookie(session(&bystander))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(!String::from_utf8_lossy(&body).contains("For my followers"));

    let req = form_post("/profile/author/unfollow/")
        .cookie(session(&follower))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/follow/");
    assert!(fx.repos.follows.find(follower.id, author.id).await.unwrap().is_none());

    let req = form_post("/profile/author/unfollow/")
        .cookie(session(&follower))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_follow_unknown_author_is_404() {
    let fx = fixture();
    let follower = fx.user("follower").await;
    let app = init_app!(fx.state);

    let req = form_post("/profile/ghost/follow/")
        .cookie(session(&follower))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_without_origin_fails_csrf() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let post = fx.post(&author, "Discuss me", None).await;
    let app = init_app!(fx.state);

    let uri = format!("/posts/{}/comment/", post.id);
    let missing = test::TestRequest::post()
        .uri(&uri)
        .insert_header((header::HOST, HOST))
        .cookie(session(&author))
        .set_form(CommentFormData { text: "x".into() })
        .to_request();
    let foreign = test::TestRequest::post()
        .uri(&uri)
        .insert_header((header::HOST, HOST))
        .insert_header((header::ORIGIN, "http://evil.example"))
        .cookie(session(&author))
        .set_form(CommentFormData { text: "x".into() })
        .to_request();

    for req in [missing, foreign] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert_eq!(template(&body), Some("core/403csrf.html"));
    }
    assert!(fx.repos.comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_referer_satisfies_csrf_check() {
    let fx = fixture();
    let author = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = test::TestRequest::post()
        .uri("/profile/leo/follow/")
        .insert_header((header::HOST, HOST))
        .insert_header((header::REFERER, "http://testserver/profile/leo/"))
        .cookie(session(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_signup_logs_user_in() {
    let fx = fixture();
    let app = init_app!(fx.state);

    let req = form_post("/auth/signup/")
        .set_form(SignupFormData {
            first_name: "New".into(),
            last_name: "Comer".into(),
            username: "newcomer".into(),
            email: "newcomer@example.com".into(),
            password1: "Sup3r-secret-pass".into(),
            password2: "Sup3r-secret-pass".into(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
    assert!(
        fx.repos
            .users
            .find_by_username("newcomer")
            .await
            .unwrap()
            .is_some()
    );
}

#[actix_web::test]
async fn test_signup_with_mismatched_passwords_redisplays_form() {
    let fx = fixture();
    let app = init_app!(fx.state);

    let req = form_post("/auth/signup/")
        .set_form(SignupFormData {
            username: "newcomer".into(),
            password1: "Sup3r-secret-pass".into(),
            password2: "different-pass-42".into(),
            ..SignupFormData::default()
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(template(&body), Some("users/signup.html"));
    assert!(!body.contains("Sup3r-secret-pass"));
}

#[actix_web::test]
async fn test_login_honors_local_next_only() {
    let fx = fixture();
    let hash = Argon2PasswordService::new().hash("correct-horse-9").unwrap();
    fx.repos
        .users
        .create(NewUser::new("leo", hash))
        .await
        .unwrap();
    let app = init_app!(fx.state);

    let login = |next: &str| {
        form_post("/auth/login/")
            .set_form(LoginFormData {
                username: "leo".into(),
                password: "correct-horse-9".into(),
                next: Some(next.to_string()),
            })
            .to_request()
    };

    let resp = test::call_service(&app, login("/create/")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));

    let resp = test::call_service(&app, login("https://evil.example/")).await;
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let fx = fixture();
    let hash = Argon2PasswordService::new().hash("correct-horse-9").unwrap();
    fx.repos
        .users
        .create(NewUser::new("leo", hash))
        .await
        .unwrap();
    let app = init_app!(fx.state);

    let req = form_post("/auth/login/")
        .set_form(LoginFormData {
            username: "leo".into(),
            password: "wrong".into(),
            next: None,
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let fx = fixture();
    let user = fx.user("leo").await;
    let app = init_app!(fx.state);

    let req = form_post("/auth/logout/").cookie(session(&user)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cleared.value(), "");
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(template(&body), Some("users/logged_out.html"));
}

#[actix_web::test]
async fn test_session_of_deleted_user_is_anonymous() {
    let fx = fixture();
    let user = fx.user("leo").await;
    fx.repos.users.delete(user.id).await.unwrap();
    let app = init_app!(fx.state);

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(session(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_login_is_rate_limited() {
    let mut fx = fixture();
    fx.state.auth_limiter = Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
    }));
    let app = init_app!(fx.state);

    let attempt = || {
        form_post("/auth/login/")
            .set_form(LoginFormData {
                username: "nobody".into(),
                password: "whatever".into(),
                next: None,
            })
            .to_request()
    };

    for _ in 0..2 {
        let resp = test::call_service(&app, attempt()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, attempt()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key(header::RETRY_AFTER));

    // Rendering the form is never throttled.
    let req = test::TestRequest::get().uri("/auth/login/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_missing_media_is_404() {
    let fx = fixture();
    let app = init_app!(fx.state);

    for uri in ["/media/posts/missing.gif", "/media/../Cargo.toml"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_health_check() {
    let fx = fixture();
    let app = init_app!(fx.state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
