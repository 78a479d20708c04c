//! The stdio line codec driven through in-memory pipes.

use std::sync::Arc;
use std::time::Duration;

use route_bridge::config::WorkerConfig;
use route_bridge::ipc::Dispatcher;
use route_bridge::lifecycle::Shutdown;
use route_bridge::transport::{self, serve_lines, OutboundFrame};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

mod common;

async fn read_replies(output: tokio::io::DuplexStream, count: usize) -> Vec<OutboundFrame> {
    let mut lines = BufReader::new(output).lines();
    let mut replies = Vec::new();
    while replies.len() < count {
        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .expect("reply in time")
            .unwrap()
            .expect("output still open");
        replies.push(serde_json::from_str(&line).unwrap());
    }
    replies.sort_by_key(|frame: &OutboundFrame| frame.id);
    replies
}

#[tokio::test]
async fn test_frames_are_answered_by_id() {
    let dispatcher = Arc::new(Dispatcher::new(common::test_registry()).with_metrics(false));
    let config = WorkerConfig::default();
    let shutdown = Shutdown::new();
    let (handle, service) = transport::spawn(dispatcher, &config, shutdown.clone());

    let (mut input, worker_in) = tokio::io::duplex(4096);
    let (worker_out, output) = tokio::io::duplex(4096);

    let server = {
        let config = config.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            serve_lines(BufReader::new(worker_in), worker_out, handle, &config, shutdown).await
        })
    };

    let requests = [
        r#"{"id":1,"data":{"route":"sleep","payload":150}}"#,
        r#"{"id":2,"data":{"route":"ping","payload":{}}}"#,
        "this is not json",
        "",
        r#"{"id":3,"data":{"route":"ping"}}"#,
        r#"{"id":4,"data":{"route":"user","payload":{"id":"9"}}}"#,
        r#"{"id":5}"#,
    ];
    for line in requests {
        input.write_all(line.as_bytes()).await.unwrap();
        input.write_all(b"\n").await.unwrap();
    }
    drop(input);

    let replies = read_replies(output, 5).await;
    let by_id: Vec<_> = replies
        .iter()
        .map(|f| (f.id, serde_json::to_value(&f.data).unwrap()))
        .collect();
    assert_eq!(
        by_id,
        vec![
            (1, json!({ "success": true, "message": 150 })),
            (2, json!({ "success": true, "message": 42 })),
            (3, json!({ "success": false, "message": "MISSING_PAYLOAD" })),
            (4, json!({ "success": true, "message": "{ id: '9', name: 'user-9', profile: [Object] }" })),
            (5, json!({ "success": false, "message": "UNKNOWN_ROUTE" })),
        ]
    );

    server.await.unwrap().unwrap();
    shutdown.trigger();
    service.await.unwrap();
}

#[tokio::test]
async fn test_fast_reply_overtakes_slow_one() {
    let dispatcher = Arc::new(Dispatcher::new(common::test_registry()).with_metrics(false));
    let config = WorkerConfig::default();
    let shutdown = Shutdown::new();
    let (handle, _service) = transport::spawn(dispatcher, &config, shutdown.clone());

    let (mut input, worker_in) = tokio::io::duplex(4096);
    let (worker_out, output) = tokio::io::duplex(4096);
    let serve_config = config.clone();
    let serve_shutdown = shutdown.clone();
    tokio::spawn(async move {
        serve_lines(BufReader::new(worker_in), worker_out, handle, &serve_config, serve_shutdown).await
    });

    input
        .write_all(b"{\"id\":10,\"data\":{\"route\":\"sleep\",\"payload\":300}}\n{\"id\":11,\"data\":{\"route\":\"ping\",\"payload\":0}}\n")
        .await
        .unwrap();

    let mut lines = BufReader::new(output).lines();
    let first = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let first: OutboundFrame = serde_json::from_str(&first).unwrap();
    assert_eq!(first.id, 11);

    shutdown.trigger();
}

#[tokio::test]
async fn test_bad_lines_do_not_end_the_session() {
    let dispatcher = Arc::new(Dispatcher::new(common::test_registry()).with_metrics(false));
    let config = WorkerConfig {
        max_frame_bytes: 256,
        ..WorkerConfig::default()
    };
    let shutdown = Shutdown::new();
    let (handle, service) = transport::spawn(dispatcher, &config, shutdown.clone());

    let (mut input, worker_in) = tokio::io::duplex(4096);
    let (worker_out, output) = tokio::io::duplex(4096);

    let server = {
        let config = config.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            serve_lines(BufReader::new(worker_in), worker_out, handle, &config, shutdown).await
        })
    };

    let mut oversized = br#"{"id":20,"data":{"route":"ping","payload":""#.to_vec();
    oversized.extend(std::iter::repeat(b'x').take(10_000));
    oversized.extend_from_slice(b"\"}}\n");

    input.write_all(b"\xff\xfe garbage\n").await.unwrap();
    input.write_all(&oversized).await.unwrap();
    input
        .write_all(b"{\"id\":21,\"data\":{\"route\":\"ping\",\"payload\":{}}}\n")
        .await
        .unwrap();
    drop(input);

    let replies = read_replies(output, 1).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, 21);
    assert_eq!(
        serde_json::to_value(&replies[0].data).unwrap(),
        json!({ "success": true, "message": 42 })
    );

    server.await.unwrap().unwrap();
    shutdown.trigger();
    service.await.unwrap();
}
