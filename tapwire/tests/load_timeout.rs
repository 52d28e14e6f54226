#![cfg(feature = "timeout")]
//! Handler-side load timeouts.

use std::time::Duration;
use tapwire::{
    BoxError, Dispatcher, LoadError, RegistryBuilder, Request, ResourceHandler, ResponseMeta,
    ResponseSink,
    layers::{HandlerTimeout, TimeoutLoader},
    testing::RecordingCallbacks,
};

mod common;
use common::request;

struct Stalled;

impl ResourceHandler for Stalled {
    fn will_load(&self, _request: &Request) -> bool {
        true
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        sink.respond(ResponseMeta::ok(request.url().clone()))?;
        sink.send_data("partial")?;
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test]
async fn test_stalled_handler_times_out_and_sink_is_aborted() {
    let dispatcher = Dispatcher::new(
        RegistryBuilder::new()
            .register(TimeoutLoader::new(Stalled, Duration::from_millis(20)))
            .build(),
    );
    let recorder = RecordingCallbacks::new();

    let err = dispatcher
        .load(request("slow://x"), recorder.clone())
        .await
        .unwrap_err();

    let LoadError::Handler { source, .. } = err;
    assert_eq!(
        source.downcast_ref::<HandlerTimeout>(),
        Some(&HandlerTimeout(Duration::from_millis(20)))
    );
    assert_eq!(recorder.data_calls(), 1);
    assert!(!recorder.is_finished());
}
