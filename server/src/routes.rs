use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;


pub use internal::*;

/// The maximum body size to accept. Metadata payloads are small; the
/// HTTP gateway is expected to enforce the real limit.
const MAX_CONTENT_LENGTH: u64 = 1024 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation(..) => StatusCode::BAD_REQUEST,
        NonExistentRecord { .. } => StatusCode::NOT_FOUND,
        Sqlx { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use serde_json::Value;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete as d, get as g, patch, path as p, path::param as par, post, put};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::audiofile::{AudioKind, Id};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    fn body() -> impl Filter<Extract = (Value,), Error = warp::Rejection> + Clone {
        warp::body::content_length_limit(MAX_CONTENT_LENGTH).and(warp::body::json())
    }

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let r = environment.urls.records_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_create_route => create, rt; end(), post(), body());
    route!(make_count_route => count, rt; p("count"), end(), g());
    route!(make_retrieve_route => retrieve, rt; par::<AudioKind>(), par::<Id>(), end(), g());
    route!(make_list_route => list, rt; par::<AudioKind>(), end(), g());
    route!(make_replace_route => replace, rt; par::<AudioKind>(), par::<Id>(), end(), put(), body());
    route!(make_amend_route => amend, rt; par::<AudioKind>(), par::<Id>(), end(), patch(), body());
    route!(make_delete_route => delete, rt; par::<AudioKind>(), par::<Id>(), end(), d());
}
