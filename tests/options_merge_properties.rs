//! Property-based tests for client reconfiguration
//!
//! Applying a partial patch changes exactly the fields it names, keeps the
//! rest, and never disturbs callbacks the patch leaves out.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use proptest::prelude::*;
use readlog_http::{
    ErrorCallbacks, ErrorHandler, HttpClient, MemoryTokenStore, RequestOptions,
    RequestOptionsPatch,
};

fn base_options() -> RequestOptions {
    RequestOptions::new()
        .with_base_url("https://books.example.com/api")
        .with_timeout(Duration::from_secs(15))
        .with_token_store(Arc::new(MemoryTokenStore::new()))
        .with_success_codes(vec![200, 0])
}

fn base_url_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}".prop_map(|host| format!("https://{host}.example.com/api"))
}

proptest! {
    #[test]
    fn prop_patch_replaces_only_named_fields(
        base_url in proptest::option::of(base_url_strategy()),
        timeout_ms in proptest::option::of(1u64..60_000),
        raw_response in proptest::option::of(any::<bool>()),
        success_codes in proptest::option::of(proptest::collection::vec(-5i64..300, 1..4)),
    ) {
        let current = base_options();
        let mut patch = RequestOptionsPatch::new();
        patch.base_url = base_url.clone();
        patch.timeout = timeout_ms.map(Duration::from_millis);
        patch.raw_response = raw_response;
        patch.success_codes = success_codes.clone();

        let next = current.merged(patch);

        prop_assert_eq!(next.base_url, base_url.unwrap_or(current.base_url.clone()));
        prop_assert_eq!(
            next.timeout,
            timeout_ms.map(Duration::from_millis).unwrap_or(current.timeout)
        );
        prop_assert_eq!(next.raw_response, raw_response.unwrap_or(current.raw_response));
        prop_assert_eq!(
            next.success_codes,
            success_codes.unwrap_or(current.success_codes.clone())
        );
        prop_assert!(Arc::ptr_eq(&next.token_store, &current.token_store));
    }

    #[test]
    fn prop_configure_keeps_unpatched_callbacks(server_errors in 1usize..5) {
        let forbidden = Arc::new(AtomicUsize::new(0));
        let server = Arc::new(AtomicUsize::new(0));
        let (f, s) = (forbidden.clone(), server.clone());

        let client = HttpClient::new(
            base_options().with_error_handler(ErrorCallbacks::new().with_forbidden(move || {
                f.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

        let options = client
            .configure(RequestOptionsPatch::new().error_handler(
                ErrorCallbacks::new().with_server_error(move || {
                    s.fetch_add(1, Ordering::SeqCst);
                }),
            ))
            .unwrap();

        options.error_handler.on_forbidden();
        for _ in 0..server_errors {
            options.error_handler.on_server_error();
        }

        prop_assert_eq!(forbidden.load(Ordering::SeqCst), 1);
        prop_assert_eq!(server.load(Ordering::SeqCst), server_errors);
    }

    #[test]
    fn prop_configure_rejects_empty_success_codes(base_url in base_url_strategy()) {
        let client = HttpClient::new(base_options()).unwrap();
        let before = client.options();

        let result = client.configure(
            RequestOptionsPatch::new()
                .base_url(base_url)
                .success_codes(Vec::new()),
        );

        prop_assert!(result.is_err());
        prop_assert_eq!(&client.options().base_url, &before.base_url);
    }
}
