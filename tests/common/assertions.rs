//! Assertion helpers shared by the integration tests

/// Unwrap an `Ok`, panicking with the error otherwise
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a `Vec<ServerEvent>` contains exactly the given event names, in order
#[macro_export]
macro_rules! assert_event_names {
    ($events:expr, [$($name:expr),* $(,)?]) => {
        let names: Vec<&str> = $events.iter().map(|event| event.name()).collect();
        let expected: Vec<&str> = vec![$($name),*];
        assert_eq!(names, expected, "unexpected realtime events: {:?}", $events);
    };
}

/// Assert that a JSON error body carries the given status
#[macro_export]
macro_rules! assert_error_body {
    ($body:expr, $status:expr) => {
        assert_eq!($body["success"], false, "expected an error body: {}", $body);
        assert_eq!($body["status"], $status, "unexpected status in {}", $body);
    };
}
