//! MCP server that hands images from local directories to the client.
//!
//! Images are looked up by file name across an ordered list of directories
//! and returned as base64 image content blocks. The directory list comes from
//! a fixed media directory, the `--roots` flag, or the client's MCP roots.

use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{Implementation, ServerCapabilities, ServerInfo},
    service::{NotificationContext, Peer, RoleServer},
    tool_handler,
};
pub mod dirs;
pub mod error;
pub mod format;
pub mod images;
pub mod tools;
pub mod validate;

use dirs::{DirectoryList, dirs_from_root_uris, display_all};

/// Which tools the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ToolProfile {
    /// Only `get_image`.
    Minimal,
    /// `get_image` plus the `list_directories` and `list_images` helpers.
    #[default]
    Full,
}

/// MCP image server.
#[derive(Debug, Clone)]
pub struct ImageServer {
    pub(crate) dirs: DirectoryList,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl ImageServer {
    /// Replace the directory list with the client's roots, if this server
    /// follows them and the client supports roots.
    async fn sync_roots(&self, peer: &Peer<RoleServer>) {
        if !self.dirs.follows_roots() {
            return;
        }
        let supports_roots = peer
            .peer_info()
            .is_some_and(|info| info.capabilities.roots.is_some());
        if !supports_roots {
            tracing::warn!("client does not support roots; no image directories configured");
            return;
        }
        self.dirs
            .refresh(|| async {
                match peer.list_roots().await {
                    Ok(result) => {
                        let uris: Vec<&str> =
                            result.roots.iter().map(|root| root.uri.as_str()).collect();
                        let dirs = dirs_from_root_uris(&uris);
                        tracing::info!(
                            count = dirs.len(),
                            dirs = %display_all(&dirs),
                            "directories updated from client roots"
                        );
                        Some(dirs)
                    }
                    Err(e) => {
                        tracing::warn!("failed to list client roots: {e}");
                        None
                    }
                }
            })
            .await;
    }
}

#[tool_handler]
impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "wmcp-images".into(),
                title: Some("Walrus MCP Image Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Image server returning PNG, JPEG, GIF and WEBP files from configured directories \
                 as viewable content. Use list_directories and list_images to discover files."
                    .into(),
            ),
        }
    }

    async fn on_initialized(&self, context: NotificationContext<RoleServer>) {
        tracing::info!("client initialized");
        self.sync_roots(&context.peer).await;
    }

    async fn on_roots_list_changed(&self, context: NotificationContext<RoleServer>) {
        tracing::info!("client roots changed");
        self.sync_roots(&context.peer).await;
    }
}
