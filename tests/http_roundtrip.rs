//! End-to-end requests against the demo worker over real sockets.

use std::time::{Duration, Instant};

use httpy::config::HostConfig;
use httpy::worker::{DemoWorker, WorkerHandle};

mod common;

async fn demo_host(config: HostConfig) -> common::TestHost {
    common::start_host(WorkerHandle::new("demo", DemoWorker::new()), config).await
}

#[tokio::test]
async fn test_hello_route() {
    let host = demo_host(HostConfig::default()).await;
    let client = common::client();

    let res = client
        .get(host.url("/hello/world?greeting=hi"))
        .send()
        .await
        .expect("host unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("x-test").unwrap(), "1");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "request #1");
}

#[tokio::test]
async fn test_unknown_path_and_wrong_method() {
    let host = demo_host(HostConfig::default()).await;
    let client = common::client();

    let res = client.get(host.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = client.post(host.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.headers().get("allow").unwrap(), "GET");

    // Neither reached the worker.
    let res = client.get(host.url("/ping")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "request #1");
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let host = demo_host(common::config_with_timeout(Duration::from_millis(200))).await;
    let client = common::client();

    let started = Instant::now();
    let res = client
        .get(host.url("/hello/slow"))
        .header("X-Sleep", "1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_slow_request_does_not_block_others() {
    let host = demo_host(common::config_with_timeout(Duration::from_secs(5))).await;
    let client = common::client();

    let slow = {
        let client = client.clone();
        let url = host.url("/hello/slow");
        tokio::spawn(async move { client.get(url).header("X-Sleep", "1").send().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let res = client.get(host.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(500));

    let res = slow.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_timeout_alongside_fast_request() {
    let host = demo_host(common::config_with_timeout(Duration::from_millis(300))).await;
    let client = common::client();

    let slow = {
        let client = client.clone();
        let url = host.url("/hello/slow");
        tokio::spawn(async move {
            let started = Instant::now();
            let res = client.get(url).header("X-Sleep", "2").send().await;
            (res, started.elapsed())
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let res = client.get(host.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(250));

    let (res, elapsed) = slow.await.unwrap();
    assert_eq!(res.unwrap().status(), 504);
    assert!(elapsed < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_invalid_sleep_header_is_worker_error() {
    let host = demo_host(HostConfig::default()).await;
    let client = common::client();

    let res = client
        .get(host.url("/"))
        .header("X-Sleep", "soon")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    let res = client.get(host.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_client_request_id_echoed() {
    let host = demo_host(HostConfig::default()).await;
    let res = common::client()
        .get(host.url("/ping"))
        .header("x-request-id", "trace-7")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "trace-7");
}
