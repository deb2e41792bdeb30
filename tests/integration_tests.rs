//! Full pipeline integration tests.

use std::io::Write;

use bytes::Bytes;
use serde_json::json;
use tempfile::NamedTempFile;
use unistorage::{Action, Client, ClientConfig, FileRecord, Resource, TemplateFamily, UploadOptions};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::new(ClientConfig::new(format!("{}/", server.uri()), "token")).unwrap()
}

fn jpeg_bytes() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
    jpeg.extend_from_slice(&[0; 100]);
    jpeg
}

async fn mount_uploaded_image(server: &MockServer, uri: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path(uri))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "extra": {"width": 64, "height": 48},
                "mimetype": "image/jpeg",
                "name": name,
                "size": 104,
                "unistorage_type": "image",
                "url": format!("http://cdn.local{uri}")
            },
            "ttl": 604800
        })))
        .mount(server)
        .await;
}

/// Full pipeline: upload from disk -> template -> apply -> re-fetch until ready
#[tokio::test]
async fn test_upload_template_pipeline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/upl/"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_uploaded_image(&server, "/upl/", "photo.jpg").await;

    Mock::given(method("POST"))
        .and(path("/template/"))
        .and(body_string_contains("applicable_for=image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/template/1/"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/upl/"))
        .and(query_param("template", "/template/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/thumb/"})))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    // First fetch of the result is pending, later ones are ready.
    Mock::given(method("GET"))
        .and(path("/thumb/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "wait", "ttl": 1})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_uploaded_image(&server, "/thumb/", "photo_thumb.jpg").await;

    let mut tmp = NamedTempFile::with_suffix(".jpg").unwrap();
    tmp.write_all(&jpeg_bytes()).unwrap();
    tmp.flush().unwrap();

    let client = client_for(&server);
    let uploaded = client
        .upload_path(tmp.path(), &UploadOptions::default())
        .await
        .unwrap();
    let uploaded = uploaded.into_regular().unwrap();
    assert_eq!(uploaded.name(), "photo.jpg");

    let image = uploaded.as_image().unwrap();
    let template = client
        .create_template(
            TemplateFamily::Image,
            &[image.resize("keep", 32, 32), image.grayscale()],
        )
        .await
        .unwrap();

    let result = client
        .apply_template(&uploaded, &template, false)
        .await
        .unwrap();
    assert!(matches!(result, FileRecord::Pending(_)));

    // Records never change in place; fetching again observes the new status.
    let ready = client.fetch(result.resource_uri()).await.unwrap();
    let thumb = ready.as_regular().unwrap();
    assert_eq!(thumb.name(), "photo_thumb.jpg");
    assert_eq!(thumb.url(), "http://cdn.local/thumb/");

    let requests = server.received_requests().await.unwrap();
    let upload = requests.iter().find(|r| r.url.path() == "/").unwrap();
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("Content-Type: image/jpeg"));
    assert!(body.contains(&format!(
        "filename=\"{}\"",
        tmp.path().file_name().unwrap().to_str().unwrap()
    )));
}

/// Pipeline: stream upload -> archive with another file
#[tokio::test]
async fn test_stream_upload_and_archive() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/streamed/"})))
        .mount(&server)
        .await;
    mount_uploaded_image(&server, "/streamed/", "streamed.jpg").await;
    mount_uploaded_image(&server, "/other/", "other.jpg").await;

    Mock::given(method("POST"))
        .and(path("/zip/"))
        .and(body_string_contains("file=%2Fstreamed%2F"))
        .and(body_string_contains("file=%2Fother%2F"))
        .and(body_string_contains("filename=files.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/zip/9/"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zip/9/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {"url": "http://cdn.local/files.zip"},
            "ttl": 3600
        })))
        .mount(&server)
        .await;

    let jpeg = jpeg_bytes();
    let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::copy_from_slice(&jpeg[..4])),
        Ok(Bytes::copy_from_slice(&jpeg[4..])),
    ];
    let stream = futures::stream::iter(chunks);

    let client = client_for(&server);
    let streamed = client
        .upload_stream("streamed.jpg", stream, &UploadOptions::type_id("gallery"))
        .await
        .unwrap();
    let other = client.fetch("/other/").await.unwrap();

    let archive = client
        .archive("files.zip", &[streamed, other])
        .await
        .unwrap();
    assert_eq!(archive.resource_uri(), "/zip/9/");
    assert_eq!(archive.url(), "http://cdn.local/files.zip");
    assert_eq!(archive.ttl(), 3600);

    let requests = server.received_requests().await.unwrap();
    let upload = requests.iter().find(|r| r.url.path() == "/").unwrap();
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("filename=\"streamed.jpg\""));
    assert!(body.contains("gallery"));
}

/// Pipeline: family view builds the action, client applies it
#[tokio::test]
async fn test_video_capture_frame_pipeline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movie/"))
        .and(query_param("action", "capture_frame"))
        .and(query_param("to", "jpeg"))
        .and(query_param("position", "2.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource_uri": "/frame/"})))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "extra": {"video": {"width": 1280, "height": 720, "codec": "h264"}},
                "mimetype": "video/mp4",
                "name": "movie.mp4",
                "size": 99999,
                "unistorage_type": "video",
                "url": "http://cdn.local/movie"
            },
            "ttl": 600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/frame/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "just_uri",
            "data": {"url": "http://cdn.local/frame.jpeg"},
            "ttl": 30
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let movie = client.fetch("/movie/").await.unwrap();
    let video = movie.as_regular().unwrap().as_video().unwrap();
    assert_eq!(video.codec(), "h264");

    let frame = client
        .apply_action(&video, &video.capture_frame("jpeg", 2.5))
        .await
        .unwrap();
    assert!(matches!(frame, FileRecord::Temporary(_)));
    assert_eq!(frame.url(), Some("http://cdn.local/frame.jpeg"));
}

/// An action round-trips through its query-string encoding
#[test]
fn test_action_encoding_roundtrip() {
    let action = Action::new("convert")
        .arg("to", "mp4")
        .arg("vcodec", "h264")
        .with_low_priority();
    let decoded = Action::decode(&action.encode()).unwrap();
    assert_eq!(decoded, action);
    assert_eq!(decoded.get("vcodec"), Some("h264"));
}
