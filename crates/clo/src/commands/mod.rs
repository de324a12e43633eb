pub mod apply;
pub mod destroy;
pub mod read;
pub mod refresh;
pub mod schema;
pub mod state;
