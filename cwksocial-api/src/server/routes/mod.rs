use crate::server::ServerRouter;
use axum::Router;

mod identity;
mod posts;
mod user_profiles;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(identity::routes())
        .merge(user_profiles::routes())
        .merge(posts::routes())
}
