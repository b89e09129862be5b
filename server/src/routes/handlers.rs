use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::audiofile::{AudioKind, Id};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::validation;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn create(environment: Environment, body: Value) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| reject::custom(Rejection::new(Context::create(None), e));

        debug!(environment.logger, "Validating audio file type...");
        let kind = validation::validate_kind(&body)
            .map_err(BackendError::Validation)
            .map_err(error_handler)?;

        let error_handler = |e: BackendError| {
            reject::custom(Rejection::new(Context::create(Some(kind.to_string())), e))
        };

        let metadata = body
            .get("audiofilemetadata")
            .ok_or_else(|| BackendError::validation("audiofilemetadata", "This field is required"))
            .map_err(&error_handler)?;

        debug!(environment.logger, "Validating metadata..."; "kind" => kind.as_str());
        let new_file = validation::validate_new(kind, metadata)
            .map_err(BackendError::Validation)
            .map_err(&error_handler)?;

        debug!(environment.logger, "Writing record to database...");
        let record = environment
            .db
            .insert(new_file)
            .await
            .map_err(&error_handler)?;

        let location = environment.urls.record(kind, record.id());

        debug!(environment.logger, "Sending response..."; "id" => record.id());
        with_header(
            with_status(json(&record), StatusCode::CREATED),
            "location",
            location.as_str(),
        )
    }
}

pub async fn count(environment: Environment) -> RouteResult {
    timed! {
        let count = environment
            .db
            .count_all()
            .await
            .map_err(|e: BackendError| reject::custom(Rejection::new(Context::count(), e)))?;

        json(&SuccessResponse::Count(count))
    }
}

pub async fn retrieve(environment: Environment, kind: AudioKind, id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| {
            reject::custom(Rejection::new(Context::retrieve(kind.to_string(), id), e))
        };

        debug!(environment.logger, "Retrieving record..."; "kind" => kind.as_str(), "id" => id);
        let option = environment
            .db
            .retrieve(kind, id)
            .await
            .map_err(error_handler)?;

        match option {
            Some(record) => with_status(json(&record), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn list(environment: Environment, kind: AudioKind) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| reject::custom(Rejection::new(Context::list(kind.to_string()), e));

        debug!(environment.logger, "Listing records..."; "kind" => kind.as_str());
        let records = environment.db.list(kind).await.map_err(error_handler)?;

        json(&records)
    }
}

pub async fn replace(environment: Environment, kind: AudioKind, id: Id, body: Value) -> RouteResult {
    update(environment, kind, id, body, false).await
}

pub async fn amend(environment: Environment, kind: AudioKind, id: Id, body: Value) -> RouteResult {
    update(environment, kind, id, body, true).await
}

async fn update(
    environment: Environment,
    kind: AudioKind,
    id: Id,
    body: Value,
    partial: bool,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| {
            reject::custom(Rejection::new(Context::update(kind.to_string(), id), e))
        };

        debug!(environment.logger, "Looking up record..."; "kind" => kind.as_str(), "id" => id);
        let existing = environment
            .db
            .retrieve(kind, id)
            .await
            .map_err(&error_handler)?;

        // absent records win over invalid payloads
        let option = match existing {
            Some(_) => {
                debug!(environment.logger, "Validating update..."; "partial" => partial);
                let fields = validation::validate_update(kind, &body, partial)
                    .map_err(BackendError::Validation)
                    .map_err(&error_handler)?;

                debug!(environment.logger, "Updating record...");
                environment
                    .db
                    .update(kind, id, fields)
                    .await
                    .map_err(&error_handler)?
            }
            None => None,
        };

        match option {
            Some(record) => with_status(json(&record), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn delete(environment: Environment, kind: AudioKind, id: Id) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| {
            reject::custom(Rejection::new(Context::delete(kind.to_string(), id), e))
        };

        debug!(environment.logger, "Deleting record..."; "kind" => kind.as_str(), "id" => id);
        environment.db.delete(kind, id).await.map_err(error_handler)?;

        StatusCode::NO_CONTENT
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
