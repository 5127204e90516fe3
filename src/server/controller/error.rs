use actix_web::{error, HttpResponse};
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use crate::server::database::store::StoreError;
use crate::server::model::ErrorResponse;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("server is busy")]
    ServerIsBusy,
    #[display("{message}")]
    BadRequest { message: String },
    #[display("Order id not found")]
    ResourceNotFound,
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
}

impl CustomError {
    pub fn bad_request(message: impl ToString) -> Self {
        CustomError::BadRequest {
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for CustomError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => CustomError::ResourceNotFound,
            StoreError::Invalid { message } => CustomError::BadRequest { message },
            StoreError::Busy => CustomError::ServerIsBusy,
            StoreError::Timeout => CustomError::Timeout,
            StoreError::Db(_) | StoreError::Migration(_) | StoreError::Join(_) => CustomError::DbError,
        }
    }
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ServerIsBusy => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            CustomError::ResourceNotFound => StatusCode::NOT_FOUND,
            CustomError::DbError => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error_code: status.as_u16().to_string(),
            message: self.to_string(),
        })
    }
}
