pub mod app_context;
pub mod project_root;

pub use app_context::AppContext;
pub use project_root::resolve_project_root;
