//! Load phase behavior through the public facade.

use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tapwire::{
    Dispatcher, HandlerId, LoadOutcome, RegistryBuilder, ResponseEvent, SinkError, StatusCode,
    handlers::{EmptyResponse, SchemeRewrite, StaticContent},
    testing::{CountingLoader, RecordingCallbacks},
};

mod common;
use common::{MisbehavingLoader, SpawningLoader, request};

fn scenario() -> Dispatcher {
    Dispatcher::new(
        RegistryBuilder::new()
            .register(SchemeRewrite::new("foo", "file"))
            .register(EmptyResponse::new("gap-exec"))
            .build(),
    )
}

#[tokio::test]
async fn test_gap_exec_gets_empty_response() {
    let dispatcher = scenario();
    let recorder = RecordingCallbacks::new();

    let outcome = dispatcher
        .dispatch(request("gap-exec://1"), recorder.clone())
        .await
        .unwrap();

    assert_eq!(outcome.handler(), Some(HandlerId::new(1)));
    let meta = recorder.meta().unwrap();
    assert_eq!(meta.status(), StatusCode::OK);
    assert_eq!(meta.content_length(), Some(0));
    assert_eq!(recorder.data_calls(), 0);
    assert!(recorder.is_finished());
}

#[tokio::test]
async fn test_https_is_left_to_the_network() {
    let dispatcher = scenario();
    let recorder = RecordingCallbacks::new();

    assert!(!dispatcher.will_handle(request("https://example.com/")).unwrap());

    let outcome = dispatcher
        .dispatch(request("https://example.com/"), recorder.clone())
        .await
        .unwrap();
    match outcome {
        LoadOutcome::NotHandled(request) => {
            assert_eq!(request.url().as_str(), "https://example.com/")
        }
        LoadOutcome::Handled(id) => panic!("unexpectedly handled by {id}"),
    }
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn test_rewritten_file_request_is_unclaimed_without_loader() {
    let dispatcher = scenario();

    let outcome = dispatcher
        .dispatch(request("foo://bar/index.html"), RecordingCallbacks::new())
        .await
        .unwrap();
    let unhandled = outcome.into_unhandled().unwrap();
    assert_eq!(unhandled.url().as_str(), "file://bar/index.html");
}

#[tokio::test]
async fn test_earlier_registration_wins() {
    let first = CountingLoader::new("gap-exec", "first");
    let second = CountingLoader::new("gap-exec", "second");
    let dispatcher = Dispatcher::new(
        RegistryBuilder::new()
            .register(first.clone())
            .register(second.clone())
            .build(),
    );

    for _ in 0..3 {
        dispatcher
            .dispatch(request("gap-exec://1"), RecordingCallbacks::new())
            .await
            .unwrap();
    }

    assert_eq!(first.count(), 3);
    assert_eq!(second.count(), 0);
}

#[tokio::test]
async fn test_events_arrive_in_order() {
    let dispatcher = Dispatcher::new(
        RegistryBuilder::new()
            .register(
                StaticContent::new()
                    .with_entry("app://shell/a.js".parse().unwrap(), "abcdefg", None)
                    .with_chunk_size(3),
            )
            .build(),
    );
    let recorder = RecordingCallbacks::new();

    dispatcher
        .dispatch(request("app://shell/a.js"), recorder.clone())
        .await
        .unwrap();

    let events = recorder.events();
    assert!(matches!(events.first(), Some(ResponseEvent::Response(_))));
    assert!(matches!(events.last(), Some(ResponseEvent::Finished)));
    assert!(
        events[1..events.len() - 1]
            .iter()
            .all(|event| matches!(event, ResponseEvent::Data(chunk) if !chunk.is_empty()))
    );
    assert_eq!(recorder.chunks(), vec!["abc", "def", "g"]);
}

#[tokio::test]
async fn test_sink_rejects_misuse() {
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(
        RegistryBuilder::new()
            .register(MisbehavingLoader {
                rejected: rejected.clone(),
            })
            .build(),
    );
    let recorder = RecordingCallbacks::new();

    dispatcher
        .dispatch(request("rude://x"), recorder.clone())
        .await
        .unwrap();

    assert_eq!(
        *rejected.lock().unwrap(),
        vec![
            SinkError::NotResponded,
            SinkError::NotResponded,
            SinkError::AlreadyResponded,
            SinkError::Finished,
            SinkError::Finished,
        ]
    );
    assert_eq!(recorder.events().len(), 3);
    assert_eq!(recorder.body(), "body");
}

#[tokio::test]
async fn test_spawned_delivery_stays_ordered() {
    let dispatcher = Dispatcher::new(
        RegistryBuilder::new()
            .register(SpawningLoader {
                scheme: "later",
                chunks: vec!["one", "", "two", "three"],
            })
            .build(),
    );

    let stream = dispatcher.open(request("later://x")).await.unwrap().unwrap();
    let response = stream.collect_body().await.unwrap();

    assert_eq!(response.meta.status(), StatusCode::OK);
    assert_eq!(response.body, "onetwothree");
    assert_eq!(response.chunks, 3);
}

#[tokio::test]
async fn test_open_unclaimed_is_none() {
    let dispatcher = scenario();
    assert!(
        dispatcher
            .open(request("https://example.com/"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_open_streams_events() {
    let dispatcher = scenario();

    let events: Vec<_> = dispatcher
        .open(request("gap-exec://7"))
        .await
        .unwrap()
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ResponseEvent::Response(_)));
    assert_eq!(events[1], ResponseEvent::Finished);
}
