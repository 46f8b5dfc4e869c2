//! End-to-end exchanges against a real HTTP server on the loopback
//! interface, driving the default TCP transport.

use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use courier_client::RestClient;
use courier_core::{BodyStream, Request, ResponseMode};
use courier_transport::HttpTerminator;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

async fn handler(
    request: http::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let path = request.uri().path().to_string();
    let response = match path.as_str() {
        "/hello" => http::Response::builder()
            .status(200)
            .body(Full::new(Bytes::from_static(b"hello world")))
            .unwrap(),
        "/gzip" => http::Response::builder()
            .status(200)
            .header("content-encoding", "gzip")
            .body(Full::new(Bytes::from(gzip(b"compressed greetings"))))
            .unwrap(),
        "/echo" => {
            let body = request.into_body().collect().await.unwrap().to_bytes();
            http::Response::builder()
                .status(200)
                .body(Full::new(body))
                .unwrap()
        }
        _ => http::Response::builder()
            .status(404)
            .body(Full::new(Bytes::new()))
            .unwrap(),
    };
    Ok(response)
}

/// Starts a loopback server and returns its address.
async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(handler))
                    .await;
            });
        }
    });

    address
}

fn client() -> RestClient {
    RestClient::new().with(HttpTerminator::new())
}

#[tokio::test]
async fn plain_get_round_trip() {
    let address = spawn_server().await;

    let response = client()
        .send(Request::get(format!("http://{address}/hello")))
        .await
        .unwrap();

    assert_eq!(response.status, http::StatusCode::OK);
    assert_eq!(response.message, "OK");
    assert_eq!(response.success, None);
    assert_eq!(response.body.unwrap().as_text(), Some("hello world"));
}

#[tokio::test]
async fn gzip_round_trip_decodes_and_strips_header() {
    let address = spawn_server().await;

    let response = client()
        .send(Request::get(format!("http://{address}/gzip")))
        .await
        .unwrap();

    assert_eq!(response.status, http::StatusCode::OK);
    assert_eq!(
        response.body.unwrap().as_text(),
        Some("compressed greetings")
    );
    assert!(response.headers.get("content-encoding").is_none());
}

#[tokio::test]
async fn buffered_post_round_trip() {
    let address = spawn_server().await;

    let response = client()
        .send(Request::post(format!("http://{address}/echo")).body("payload over the wire"))
        .await
        .unwrap();

    assert_eq!(
        response.body.unwrap().as_text(),
        Some("payload over the wire")
    );
}

#[tokio::test]
async fn chunked_stream_request_round_trip() {
    let address = spawn_server().await;

    let stream = BodyStream::from_chunks(vec![
        Bytes::from_static(b"alpha "),
        Bytes::from_static(b"beta "),
        Bytes::from_static(b"gamma"),
    ]);

    let response = client()
        .send(Request::post(format!("http://{address}/echo")).body(stream))
        .await
        .unwrap();

    assert_eq!(response.body.unwrap().as_text(), Some("alpha beta gamma"));
}

#[tokio::test]
async fn stream_mode_round_trip() {
    use futures_util::StreamExt;

    let address = spawn_server().await;

    let response = client()
        .send(Request::get(format!("http://{address}/hello")).mode(ResponseMode::Stream))
        .await
        .unwrap();

    let mut stream = response.body.unwrap().into_stream().unwrap();
    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected, b"hello world");
}

#[tokio::test]
async fn missing_route_is_explicit_failure() {
    let address = spawn_server().await;

    let response = client()
        .send(Request::get(format!("http://{address}/nope")))
        .await
        .unwrap();

    assert_eq!(response.status, http::StatusCode::NOT_FOUND);
    assert_eq!(response.success, Some(false));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Bind and immediately drop a listener to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let error = client()
        .send(Request::get(format!("http://{address}/")))
        .await
        .unwrap_err();

    assert!(matches!(error, courier_core::Error::Transport { .. }));
}
