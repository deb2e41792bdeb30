//! The Unistorage API client.
//!
//! Every operation is a short sequence of awaited requests. Mutating calls
//! (upload, apply, archive) only answer with a `resource_uri`, so the client
//! always fetches that reference afterwards and classifies the body.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::action::Action;
use crate::classify::{classify, classify_archive};
use crate::config::ClientConfig;
use crate::detection::upload_content_type;
use crate::error::{Result, UnistorageError};
use crate::family::TemplateFamily;
use crate::record::{
    ArchiveRecord, FileRecord, Resource, Template, WatermarkPlacement, Watermarkable,
};

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "Token";

/// Optional settings for an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Type identifier attached to the uploaded file.
    pub type_id: Option<String>,
    /// Overrides the client timeout for this upload only.
    pub timeout: Option<Duration>,
}

impl UploadOptions {
    /// Options that tag the upload with `type_id`.
    pub fn type_id(type_id: impl Into<String>) -> Self {
        Self {
            type_id: Some(type_id.into()),
            ..Default::default()
        }
    }

    /// Override the client timeout for this upload.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the Unistorage API.
///
/// # Examples
///
/// ```no_run
/// # use unistorage::{Action, Client, ClientConfig, TemplateFamily};
/// # async fn example() -> unistorage::error::Result<()> {
/// let client = Client::new(ClientConfig::new(
///     "http://localhost:5000/",
///     "dc363e85965d461b81a4f78df45f636f",
/// ))?;
///
/// let file = client.upload("jpg.jpg", b"...".to_vec(), Some("bubu")).await?;
/// let template = client
///     .create_template(
///         TemplateFamily::Image,
///         &[
///             Action::new("resize").arg("mode", "keep").arg("w", 50).arg("h", 50),
///             Action::new("grayscale"),
///         ],
///     )
///     .await?;
/// let thumbnail = client.apply_template(&file, &template, false).await?;
/// println!("{thumbnail} ready in {}s", thumbnail.ttl());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    base_url: Url,
    token: String,
}

impl Client {
    /// Build a client from its configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token,
        })
    }

    /// Build a client from `UNISTORAGE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Fetching
    // -----------------------------------------------------------------------

    /// Fetch and classify a file resource.
    pub async fn fetch(&self, resource_uri: &str) -> Result<FileRecord> {
        let body = self.get(resource_uri, &[] as &[(&str, &str)]).await?;
        classify(resource_uri, &body)
    }

    /// Fetch a ZIP archive resource.
    pub async fn fetch_archive(&self, resource_uri: &str) -> Result<ArchiveRecord> {
        let body = self.get(resource_uri, &[] as &[(&str, &str)]).await?;
        classify_archive(resource_uri, &body)
    }

    // -----------------------------------------------------------------------
    // Uploads
    // -----------------------------------------------------------------------

    /// Upload `content` under `name`, optionally tagged with a type identifier.
    pub async fn upload(
        &self,
        name: &str,
        content: impl Into<Bytes>,
        type_id: Option<&str>,
    ) -> Result<FileRecord> {
        let options = UploadOptions {
            type_id: type_id.map(str::to_string),
            ..Default::default()
        };
        self.upload_with_options(name, content, &options).await
    }

    /// Upload `content` under `name` with explicit options.
    pub async fn upload_with_options(
        &self,
        name: &str,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> Result<FileRecord> {
        let content: Bytes = content.into();
        let content_type = upload_content_type(&content, name);
        tracing::info!(
            name,
            size = content.len(),
            content_type = %content_type,
            type_id = ?options.type_id,
            "Uploading file"
        );

        let part = Part::stream(content)
            .file_name(name.to_string())
            .mime_str(&content_type)?;
        let mut form = Form::new().part("file", part);
        if let Some(type_id) = &options.type_id {
            form = form.text("type_id", type_id.clone());
        }

        let mut request = self.request(Method::POST, "/")?.multipart(form);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        let body = self.send(request).await?;
        let uploaded = resource_uri_of(&body)?;
        self.fetch(&uploaded).await
    }

    /// Upload a file from the local filesystem, named after its file name.
    pub async fn upload_path<P: AsRef<Path>>(
        &self,
        path: P,
        options: &UploadOptions,
    ) -> Result<FileRecord> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                UnistorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                ))
            })?;
        let data = tokio::fs::read(path).await?;
        self.upload_with_options(&name, data, options).await
    }

    /// Upload the contents of an async byte stream.
    ///
    /// The stream is fully consumed and buffered into memory first.
    pub async fn upload_stream<S>(
        &self,
        name: &str,
        mut stream: S,
        options: &UploadOptions,
    ) -> Result<FileRecord>
    where
        S: futures::Stream<Item = std::result::Result<Bytes, std::io::Error>> + Unpin,
    {
        let mut buf = Vec::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        self.upload_with_options(name, buf, options).await
    }

    // -----------------------------------------------------------------------
    // Actions and templates
    // -----------------------------------------------------------------------

    /// Create a template applying `actions` in order to files of one family.
    pub async fn create_template(
        &self,
        applicable_for: TemplateFamily,
        actions: &[Action],
    ) -> Result<Template> {
        let mut form: Vec<(&str, String)> = Vec::with_capacity(actions.len() + 1);
        form.push(("applicable_for", applicable_for.to_string()));
        form.extend(actions.iter().map(|action| ("action[]", action.encode())));

        let request = self.request(Method::POST, "/template/")?.form(&form);
        let body = self.send(request).await?;
        let template = Template::new(resource_uri_of(&body)?);
        tracing::info!(
            template = %template,
            applicable_for = %applicable_for,
            actions = actions.len(),
            "Template created"
        );
        Ok(template)
    }

    /// Apply `action` to `file` and fetch the resulting file.
    pub async fn apply_action<R: Resource + ?Sized>(
        &self,
        file: &R,
        action: &Action,
    ) -> Result<FileRecord> {
        tracing::info!(
            source = file.resource_uri(),
            action = action.name(),
            "Applying action"
        );
        let body = self.get(file.resource_uri(), action).await?;
        self.fetch(&resource_uri_of(&body)?).await
    }

    /// Apply `template` to `file` and fetch the resulting file.
    pub async fn apply_template<R: Resource + ?Sized>(
        &self,
        file: &R,
        template: &Template,
        with_low_priority: bool,
    ) -> Result<FileRecord> {
        let mut query = vec![("template", template.resource_uri())];
        if with_low_priority {
            query.push(("with_low_priority", "1"));
        }
        tracing::info!(
            source = file.resource_uri(),
            template = %template,
            with_low_priority,
            "Applying template"
        );
        let body = self.get(file.resource_uri(), &query).await?;
        self.fetch(&resource_uri_of(&body)?).await
    }

    /// Burn `watermark` into an image or video file.
    pub async fn watermark<W: Watermarkable + ?Sized>(
        &self,
        file: &W,
        watermark: &dyn Resource,
        placement: &WatermarkPlacement,
    ) -> Result<FileRecord> {
        let action = file.watermark(watermark, placement);
        self.apply_action(file, &action).await
    }

    // -----------------------------------------------------------------------
    // Archives
    // -----------------------------------------------------------------------

    /// Pack `files` into a ZIP archive called `name`.
    pub async fn archive<R: Resource>(&self, name: &str, files: &[R]) -> Result<ArchiveRecord> {
        let mut form: Vec<(&str, &str)> = files
            .iter()
            .map(|file| ("file", file.resource_uri()))
            .collect();
        form.push(("filename", name));

        tracing::info!(name, files = files.len(), "Creating archive");
        let request = self.request(Method::POST, "/zip/")?.form(&form);
        let body = self.send(request).await?;
        self.fetch_archive(&resource_uri_of(&body)?).await
    }

    // -----------------------------------------------------------------------
    // HTTP plumbing
    // -----------------------------------------------------------------------

    fn request(&self, method: Method, reference: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(reference)?;
        tracing::debug!(%method, %url, "Unistorage request");
        Ok(self
            .http
            .request(method, url)
            .header(TOKEN_HEADER, &self.token))
    }

    async fn get<Q: serde::Serialize + ?Sized>(&self, reference: &str, query: &Q) -> Result<Value> {
        let request = self.request(Method::GET, reference)?.query(query);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        let json = serde_json::from_str::<Value>(&body);

        if status.is_success() {
            return json.map_err(|_| UnistorageError::MalformedResponse(body));
        }

        let message = json
            .ok()
            .and_then(|v| v.get("msg").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        tracing::debug!(status = status.as_u16(), %message, "Unistorage API error");
        Err(UnistorageError::Api {
            status_code: status.as_u16(),
            message,
        })
    }
}

fn transport_error(err: reqwest::Error) -> UnistorageError {
    if err.is_timeout() {
        UnistorageError::Timeout
    } else {
        UnistorageError::Http(err)
    }
}

/// Extract the `resource_uri` every mutating endpoint answers with.
fn resource_uri_of(body: &Value) -> Result<String> {
    body.get("resource_uri")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            UnistorageError::UnrecognizedShape(format!("expected `resource_uri` in {body}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_uri_of() {
        let uri = resource_uri_of(&json!({"resource_uri": "/abc/"})).unwrap();
        assert_eq!(uri, "/abc/");
        assert!(resource_uri_of(&json!({"status": "ok"})).is_err());
        assert!(resource_uri_of(&json!({"resource_uri": 5})).is_err());
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let err = Client::new(ClientConfig::new("not a url", "t")).unwrap_err();
        assert!(matches!(err, UnistorageError::InvalidUrl(_)));
    }

    #[test]
    fn test_references_join_onto_base() {
        let client = Client::new(ClientConfig::new("http://localhost:5000/api/", "t")).unwrap();
        assert_eq!(
            client.base_url().join("/zip/").unwrap().as_str(),
            "http://localhost:5000/zip/"
        );
        assert_eq!(
            client.base_url().join("template/").unwrap().as_str(),
            "http://localhost:5000/api/template/"
        );
    }

    #[test]
    fn test_upload_options() {
        let options = UploadOptions::type_id("bubu").with_timeout(Duration::from_secs(5));
        assert_eq!(options.type_id.as_deref(), Some("bubu"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }
}
