//! Decoding of the `{"response": {code, data?, errors?}}` envelope.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiErrorDetail, ClientError};

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Inner,
}

#[derive(Debug, Deserialize)]
struct Inner {
    code: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<ApiErrorDetail>>,
}

fn parse(status: StatusCode, body: &[u8]) -> Result<Inner, ClientError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| {
        ClientError::InvalidResponse(format!(
            "Response was not valid JSON: {}",
            String::from_utf8_lossy(body)
        ))
    })?;

    let envelope: Envelope = serde_json::from_value(value.clone()).map_err(|e| {
        ClientError::InvalidResponse(format!(
            "Response did not match expected format ({e}): {value}"
        ))
    })?;
    let inner = envelope.response;

    if inner.data.is_some() && inner.errors.is_some() {
        return Err(ClientError::InvalidResponse(format!(
            "Response contained both data and errors: {value}"
        )));
    }

    if !status.is_success() {
        return match inner.errors {
            Some(errors) => Err(ClientError::FailedResponse {
                status: status.as_u16(),
                code: inner.code,
                errors,
            }),
            None => Err(ClientError::InvalidResponse(format!(
                "Error response without errors ({status}): {value}"
            ))),
        };
    }

    Ok(inner)
}

/// Decode a response whose `data` must be present and of type `T`.
pub(crate) fn decode_data<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ClientError> {
    let inner = parse(status, body)?;
    let data = inner.data.ok_or_else(|| {
        ClientError::InvalidResponse(format!("Response {} carried no data", inner.code))
    })?;
    serde_json::from_value(data.clone()).map_err(|e| {
        ClientError::InvalidResponse(format!(
            "Response data did not match expected format ({e}): {data}"
        ))
    })
}

/// Decode a response from an asynchronous endpoint, where `ACCEPTED` with
/// null data is a success.
pub(crate) fn decode_accepted(status: StatusCode, body: &[u8]) -> Result<String, ClientError> {
    let inner = parse(status, body)?;
    if inner.data.is_none() && inner.code != "ACCEPTED" && inner.code != "SUCCESS" {
        return Err(ClientError::InvalidResponse(format!(
            "Unexpected response code {} without data",
            inner.code
        )));
    }
    Ok(inner.code)
}

/// Decode an error body. Only used where success is not a JSON envelope.
pub(crate) fn decode_error(status: StatusCode, body: &[u8]) -> ClientError {
    match parse(status, body) {
        Err(err) => err,
        Ok(inner) => ClientError::InvalidResponse(format!(
            "Expected an error response for status {status}, got {}",
            inner.code
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Batch {
        #[serde(rename = "batchUid")]
        batch_uid: String,
    }

    #[test]
    fn test_decode_data() {
        let body = br#"{"response":{"code":"SUCCESS","data":{"batchUid":"b1"}}}"#;
        let batch: Batch = decode_data(StatusCode::OK, body).unwrap();
        assert_eq!(batch.batch_uid, "b1");
    }

    #[test]
    fn test_invalid_json() {
        let result = decode_data::<Batch>(StatusCode::OK, b"<html>oops</html>");
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_both_data_and_errors_rejected() {
        let body = br#"{"response":{"code":"SUCCESS","data":{"batchUid":"b1"},"errors":[]}}"#;
        let result = decode_data::<Batch>(StatusCode::OK, body);
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_error_envelope_is_failed_response() {
        let body = br#"{"response":{"code":"NOT_FOUND_ERROR","errors":[{"key":"not_found","message":"Job not found","details":{"uid":"x"}}]}}"#;
        let result = decode_data::<Batch>(StatusCode::NOT_FOUND, body);
        match result {
            Err(ClientError::FailedResponse {
                status,
                code,
                errors,
            }) => {
                assert_eq!(status, 404);
                assert_eq!(code, "NOT_FOUND_ERROR");
                assert_eq!(errors[0].key, "not_found");
                assert!(errors[0].details.is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_error_status_with_bad_schema_is_invalid() {
        let body = br#"{"message":"Internal Server Error"}"#;
        let result = decode_data::<Batch>(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_wrong_data_shape_is_invalid() {
        let body = br#"{"response":{"code":"SUCCESS","data":{"other":1}}}"#;
        let result = decode_data::<Batch>(StatusCode::OK, body);
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_accepted_null_data() {
        let body = br#"{"response":{"code":"ACCEPTED","data":null}}"#;
        assert_eq!(decode_accepted(StatusCode::ACCEPTED, body).unwrap(), "ACCEPTED");

        let result = decode_data::<Batch>(StatusCode::ACCEPTED, body);
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_error_body() {
        let body = br#"{"response":{"code":"AUTHENTICATION_ERROR","errors":[{"key":"invalid_token","message":"Invalid token"}]}}"#;
        let err = decode_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.code(), Some("AUTHENTICATION_ERROR"));
    }
}
