use serde::Serialize;
use warp::reject;

use crate::audiofile::Id;
use crate::errors::BackendError;
use crate::validation::FieldErrors;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        match &self.error {
            BackendError::Validation(fields) => FlattenedRejection::Fields(fields.clone()),
            error => FlattenedRejection::Message {
                context: self.context.clone(),
                message: format!("{}", error),
            },
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FlattenedRejection {
    /// Validation failures serialize as the bare field-to-messages map.
    Fields(FieldErrors),
    Message {
        #[serde(flatten)]
        context: Context,
        message: String,
    },
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Count,
    Create { kind: Option<String> },
    Delete { kind: String, id: Id },
    List { kind: String },
    Retrieve { kind: String, id: Id },
    Update { kind: String, id: Id },
}

impl Context {
    pub fn count() -> Context {
        Context::Count
    }

    pub fn create(kind: Option<String>) -> Context {
        Context::Create { kind }
    }

    pub fn delete(kind: String, id: Id) -> Context {
        Context::Delete { kind, id }
    }

    pub fn list(kind: String) -> Context {
        Context::List { kind }
    }

    pub fn retrieve(kind: String, id: Id) -> Context {
        Context::Retrieve { kind, id }
    }

    pub fn update(kind: String, id: Id) -> Context {
        Context::Update { kind, id }
    }
}
