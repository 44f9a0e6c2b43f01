pub mod auth;
pub mod catalog;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                              sign up / resend code (public)
/// /auth/token                                               exchange code for token (public)
///
/// /users                                                    list, create (admin only)
/// /users/me                                                 get, update own profile
/// /users/{username}                                         get, update, delete (admin only)
///
/// /categories                                               list (public), create (admin)
/// /categories/{slug}                                        delete (admin)
/// /genres                                                   list (public), create (admin)
/// /genres/{slug}                                            delete (admin)
///
/// /titles                                                   list (public), create (admin)
/// /titles/{title_id}                                        get (public), update, delete (admin)
/// /titles/{title_id}/reviews                                list (public), create (authenticated)
/// /titles/{title_id}/reviews/{review_id}                    get, update, delete (author/moderator/admin)
/// /titles/{title_id}/reviews/{review_id}/comments           list (public), create (authenticated)
/// /titles/{title_id}/reviews/{review_id}/comments/{id}      get, update, delete (author/moderator/admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", catalog::categories_router())
        .nest("/genres", catalog::genres_router())
        .nest("/titles", titles::router())
}
