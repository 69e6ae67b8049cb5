//! Tool implementations for the image MCP server.

use crate::{
    ImageServer, ToolProfile,
    dirs::DirectoryList,
    error::ImageError,
    images::{fetch_image, list_directories, list_images},
};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A `filename` argument as sent by the client.
///
/// Deserialization never fails: a missing or non-string value becomes
/// `None` so the tool can answer with an error result instead of the router
/// rejecting the call.
#[derive(Debug, Default, Clone)]
pub struct FilenameArg(Option<String>);

impl FilenameArg {
    /// The file name, if the client sent a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for FilenameArg {
    fn from(name: &str) -> Self {
        Self(Some(name.to_string()))
    }
}

impl<'de> Deserialize<'de> for FilenameArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(name)) => Self(Some(name)),
            _ => Self(None),
        })
    }
}

/// Parameters for fetching an image.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetImageParams {
    /// Name of the image file including extension (e.g. "Wardley Map.png",
    /// "diagrams/architecture.png").
    #[schemars(with = "String")]
    pub filename: FilenameArg,
}

/// Parameters for listing images in one directory.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListImagesParams {
    /// Index of the directory (from list_directories). Use 0 for the first
    /// directory, 1 for the second, etc. Defaults to 0.
    #[schemars(with = "Option<f64>")]
    pub directory_index: Option<Value>,
}

/// Turn a per-request failure into a tool error result.
fn error_result(err: ImageError) -> CallToolResult {
    tracing::error!("tool execution failed: {err}");
    CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
}

impl ImageServer {
    /// Create a new image server over the given directories.
    pub fn new(dirs: DirectoryList, profile: ToolProfile) -> Self {
        let tool_router = match profile {
            ToolProfile::Minimal => Self::fetch_router(),
            ToolProfile::Full => Self::fetch_router() + Self::listing_router(),
        };
        Self { dirs, tool_router }
    }
}

#[tool_router(router = fetch_router)]
impl ImageServer {
    /// Resolve an image by file name and return it inline.
    #[tool(
        description = "Retrieve an image from the configured directories and return it as viewable content.\n\n\
                       Supported formats: PNG, JPG, JPEG, GIF, WEBP\n\n\
                       Directories are searched in order; the first match wins.\n\n\
                       Example usage:\n\
                       - \"Show me the diagram.png\"\n\
                       - \"Get the screenshot.jpg\"\n\
                       - \"Display architecture.png\""
    )]
    async fn get_image(
        &self,
        Parameters(params): Parameters<GetImageParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(filename) = params.filename.as_str() else {
            return Ok(error_result(ImageError::InvalidArgument(
                "filename parameter is required and must be a string".into(),
            )));
        };
        tracing::info!(filename, "get_image");
        let dirs = self.dirs.snapshot().await;
        Ok(match fetch_image(&dirs, filename).await {
            Ok(image) => {
                tracing::info!(path = %image.path.display(), mime = image.mime_type, "returning image");
                CallToolResult::success(vec![Content::image(image.data, image.mime_type)])
            }
            Err(e) => error_result(e),
        })
    }
}

#[tool_router(router = listing_router)]
impl ImageServer {
    /// Report every configured directory and whether it is usable.
    #[tool(
        description = "List all configured image directories and their status. Useful for troubleshooting."
    )]
    async fn list_directories(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("list_directories");
        let dirs = self.dirs.snapshot().await;
        let report = list_directories(&dirs).await;
        Ok(CallToolResult::success(vec![Content::text(report)]))
    }

    /// List supported images in one configured directory.
    #[tool(description = "List all images in a specific configured directory.")]
    async fn list_images(
        &self,
        Parameters(params): Parameters<ListImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(directory_index = ?params.directory_index, "list_images");
        let dirs = self.dirs.snapshot().await;
        Ok(match list_images(&dirs, params.directory_index.as_ref()).await {
            Ok(report) => CallToolResult::success(vec![Content::text(report)]),
            Err(e) => error_result(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ImageServer, ToolProfile,
        dirs::DirectoryList,
        tools::{GetImageParams, ListImagesParams},
    };
    use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
    use rmcp::{handler::server::wrapper::Parameters, model::CallToolResult};
    use serde_json::{Value, json};
    use std::{fs, path::PathBuf};

    fn server(dirs: Vec<PathBuf>) -> ImageServer {
        ImageServer::new(DirectoryList::with_dirs(dirs), ToolProfile::Full)
    }

    fn to_json(result: CallToolResult) -> Value {
        serde_json::to_value(&result).expect("result serializes")
    }

    fn is_error(json: &Value) -> bool {
        json["isError"].as_bool().unwrap_or(false)
    }

    fn first_text(json: &Value) -> String {
        json["content"][0]["text"].as_str().unwrap_or_default().to_string()
    }

    async fn get(server: &ImageServer, filename: &str) -> Value {
        let result = server
            .get_image(Parameters(GetImageParams {
                filename: filename.into(),
            }))
            .await
            .expect("tool errors are reported in the result");
        to_json(result)
    }

    #[tokio::test]
    async fn get_image_returns_image_block() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(b.path().join("photo.png"), b"\x89PNG\r\n").unwrap();

        let server = server(vec![a.path().to_path_buf(), b.path().to_path_buf()]);
        let json = get(&server, "photo.png").await;
        assert!(!is_error(&json));
        let block = &json["content"][0];
        assert_eq!(block["type"], "image");
        assert_eq!(block["mimeType"], "image/png");
        let data = BASE64.decode(block["data"].as_str().unwrap()).unwrap();
        assert_eq!(data, b"\x89PNG\r\n");
    }

    #[tokio::test]
    async fn get_image_without_dirs_is_error_result() {
        let json = get(&server(Vec::new()), "x.png").await;
        assert!(is_error(&json));
        assert_eq!(json["content"][0]["type"], "text");
        assert!(first_text(&json).starts_with("Error: No directories configured"));
    }

    #[tokio::test]
    async fn get_image_unsupported_is_error_result() {
        let json = get(&server(Vec::new()), "notes.txt").await;
        assert!(is_error(&json));
        assert!(first_text(&json).contains("Unsupported format '.txt'"));
    }

    #[tokio::test]
    async fn get_image_traversal_is_error_result() {
        let a = tempfile::tempdir().unwrap();
        let json = get(&server(vec![a.path().to_path_buf()]), "../../etc/passwd.png").await;
        assert!(is_error(&json));
        assert!(first_text(&json).contains("Access denied"));
    }

    async fn get_raw(server: &ImageServer, arguments: Value) -> Value {
        let params: GetImageParams =
            serde_json::from_value(arguments).expect("arguments always deserialize");
        to_json(server.get_image(Parameters(params)).await.unwrap())
    }

    async fn list_raw(server: &ImageServer, arguments: Value) -> Value {
        let params: ListImagesParams =
            serde_json::from_value(arguments).expect("arguments always deserialize");
        to_json(server.list_images(Parameters(params)).await.unwrap())
    }

    #[tokio::test]
    async fn get_image_missing_filename_is_error_result() {
        let json = get_raw(&server(Vec::new()), json!({})).await;
        assert!(is_error(&json));
        assert!(first_text(&json).starts_with("Error: filename parameter is required"));
    }

    #[tokio::test]
    async fn get_image_non_string_filename_is_error_result() {
        let server = server(Vec::new());
        for filename in [json!(42), json!(null), json!(["a.png"])] {
            let json = get_raw(&server, json!({ "filename": filename })).await;
            assert!(is_error(&json), "{filename}");
            assert!(first_text(&json).starts_with("Error: filename parameter is required"));
        }
    }

    #[tokio::test]
    async fn list_images_accepts_whole_float_index() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(b.path().join("second.gif"), b"gif").unwrap();

        let server = server(vec![a.path().to_path_buf(), b.path().to_path_buf()]);
        let json = list_raw(&server, json!({ "directory_index": 1.0 })).await;
        assert!(!is_error(&json));
        assert!(first_text(&json).contains("second.gif"));
    }

    #[tokio::test]
    async fn list_images_rejects_non_integer_index() {
        let a = tempfile::tempdir().unwrap();
        let server = server(vec![a.path().to_path_buf(), a.path().to_path_buf()]);
        for index in [json!(0.5), json!("1"), json!(-1), json!(true)] {
            let json = list_raw(&server, json!({ "directory_index": index })).await;
            assert!(is_error(&json), "{index}");
            let text = first_text(&json);
            assert!(text.starts_with("Error: Invalid directory index"), "{text}");
            assert!(text.contains("Valid range: 0-1"), "{text}");
        }
    }

    #[tokio::test]
    async fn list_images_null_index_defaults_to_first_dir() {
        let a = tempfile::tempdir().unwrap();
        fs::write(a.path().join("first.png"), b"png").unwrap();
        let json = list_raw(&server(vec![a.path().to_path_buf()]), json!({ "directory_index": null })).await;
        assert!(!is_error(&json));
        assert!(first_text(&json).contains("first.png"));
    }

    #[tokio::test]
    async fn list_directories_empty_is_not_error() {
        let result = server(Vec::new()).list_directories().await.unwrap();
        let json = to_json(result);
        assert!(!is_error(&json));
        assert!(first_text(&json).contains("(0)"));
    }

    #[tokio::test]
    async fn list_images_out_of_range_names_range() {
        let a = tempfile::tempdir().unwrap();
        let result = server(vec![a.path().to_path_buf()])
            .list_images(Parameters(ListImagesParams {
                directory_index: Some(json!(3)),
            }))
            .await
            .unwrap();
        let json = to_json(result);
        assert!(is_error(&json));
        assert!(first_text(&json).contains("Valid range: 0-0"));
    }

    #[tokio::test]
    async fn list_images_defaults_to_first_dir() {
        let a = tempfile::tempdir().unwrap();
        fs::write(a.path().join("only.webp"), b"riff").unwrap();
        let result = server(vec![a.path().to_path_buf()])
            .list_images(Parameters(ListImagesParams::default()))
            .await
            .unwrap();
        let json = to_json(result);
        assert!(!is_error(&json));
        assert!(first_text(&json).contains("only.webp"));
    }

    #[test]
    fn profiles_expose_expected_tools() {
        let names = |profile| {
            let server = ImageServer::new(DirectoryList::with_dirs(Vec::new()), profile);
            let mut names: Vec<String> = server
                .tool_router
                .list_all()
                .into_iter()
                .map(|tool| tool.name.to_string())
                .collect();
            names.sort();
            names
        };
        assert_eq!(names(ToolProfile::Minimal), vec!["get_image"]);
        assert_eq!(
            names(ToolProfile::Full),
            vec!["get_image", "list_directories", "list_images"]
        );
    }

    #[test]
    fn get_image_schema_requires_filename() {
        let server = ImageServer::new(DirectoryList::with_dirs(Vec::new()), ToolProfile::Minimal);
        let tool = server
            .tool_router
            .list_all()
            .into_iter()
            .find(|tool| tool.name == "get_image")
            .expect("get_image registered");
        let schema = serde_json::to_value(&*tool.input_schema).unwrap();
        assert_eq!(schema["required"], json!(["filename"]));
        assert_eq!(schema["properties"]["filename"]["type"], "string");
    }
}
