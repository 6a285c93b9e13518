// tests/wire_codec.rs

use codexec::errors::{ClientError, ProtocolError};
use codexec::protocol::{Response, decode_response, encode_error, encode_result};
use codexec::types::ExecutionResult;
use proptest::prelude::*;

#[test]
fn test_encode_result_layout() {
    let result = ExecutionResult::new(0, "ok\n", "");

    assert_eq!(
        encode_result(&result),
        "--- Execution Result ---\nReturn Code: 0\n\n--- STDOUT ---\nok\n\n--- STDERR ---\n"
    );
}

#[test]
fn test_encode_errors_use_client_and_server_prefixes() {
    assert_eq!(
        encode_error(&ProtocolError::SizeLimitExceeded),
        "ERROR: Script size exceeds limit."
    );
    assert_eq!(
        encode_error(&ProtocolError::DecodeError),
        "ERROR: Invalid UTF-8 data received."
    );
    assert_eq!(
        encode_error(&ProtocolError::TimeoutExpired),
        "ERROR: Execution timed out"
    );
    assert_eq!(
        encode_error(&ProtocolError::InternalError),
        "SERVER ERROR: An internal error occurred."
    );
}

#[test]
fn test_response_encode_dispatches_on_variant() {
    let ok = Response::from(Ok::<_, ProtocolError>(ExecutionResult::new(3, "a", "b")));
    assert!(ok.encode().starts_with("--- Execution Result ---\nReturn Code: 3\n"));

    let failed = Response::from(Err::<ExecutionResult, _>(ProtocolError::TimeoutExpired));
    assert_eq!(failed.encode(), "ERROR: Execution timed out");
}

#[test]
fn test_decode_stderr_and_nonzero_exit() {
    let text = "--- Execution Result ---\nReturn Code: 42\n\n--- STDOUT ---\nThis will go to stdout.\n\n--- STDERR ---\nThis is an error message.\n";

    let result = decode_response(text).unwrap();
    assert_eq!(result.return_code(), 42);
    assert_eq!(result.stdout(), "This will go to stdout.\n");
    assert_eq!(result.stderr(), "This is an error message.\n");
}

#[test]
fn test_decode_negative_return_code_and_empty_streams() {
    let text = "--- Execution Result ---\nReturn Code: -9\n\n--- STDOUT ---\n\n--- STDERR ---\n";

    let result = decode_response(text).unwrap();
    assert_eq!(result.return_code(), -9);
    assert_eq!(result.stdout(), "");
    assert_eq!(result.stderr(), "");
}

#[test]
fn test_decode_error_lines_are_returned_verbatim() {
    for line in [
        "ERROR: Execution timed out",
        "SERVER ERROR: An internal error occurred.",
    ] {
        match decode_response(line) {
            Err(ClientError::Server(msg)) => assert_eq!(msg, line),
            other => panic!("Expected Server error, got: {:?}", other),
        }
    }
}

#[test]
fn test_decode_rejects_malformed_responses() {
    let cases = [
        "",
        "hello world",
        "--- Execution Result ---\nReturn Code: zero\n\n--- STDOUT ---\n\n--- STDERR ---\n",
        "--- Execution Result ---\n\n--- STDOUT ---\n\n--- STDERR ---\n",
        "--- Execution Result ---\nReturn Code: 0\n\n--- STDERR ---\n",
        "--- Execution Result ---\nReturn Code: 0\n\n--- STDOUT ---\nno stderr marker",
        "Return Code: 0\n\n--- STDOUT ---\n\n--- STDERR ---\n",
    ];

    for text in cases {
        match decode_response(text) {
            Err(ClientError::MalformedResponse(raw)) => assert_eq!(raw, text),
            other => panic!("Expected MalformedResponse for {text:?}, got: {other:?}"),
        }
    }
}

#[test]
fn test_output_containing_stderr_marker_is_rejected() {
    let result = ExecutionResult::new(0, "line\n--- STDERR ---\nfake\n", "real");
    let encoded = encode_result(&result);

    assert!(matches!(
        decode_response(&encoded),
        Err(ClientError::MalformedResponse(_))
    ));
}

proptest! {
    #[test]
    fn test_round_trip_without_markers(
        return_code in any::<i32>(),
        stdout in "(?s).{0,64}",
        stderr in "(?s).{0,64}",
    ) {
        prop_assume!(!stdout.contains("--- STDOUT ---") && !stdout.contains("--- STDERR ---"));
        prop_assume!(!stderr.contains("--- STDOUT ---") && !stderr.contains("--- STDERR ---"));

        let original = ExecutionResult::new(return_code, stdout, stderr);
        let decoded = decode_response(&encode_result(&original)).unwrap();

        prop_assert_eq!(decoded, original);
    }
}
