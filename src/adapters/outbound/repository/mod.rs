/// Maven repository adapter: POM reading, workspace discovery and artifact transport
mod http_transport;
mod interpolation;
mod maven_repository;
mod pom_parser;
mod workspace;

pub use http_transport::HttpTransport;
pub use maven_repository::{MavenRepository, RemoteRepository};
pub use workspace::{Workspace, WorkspaceModule};
