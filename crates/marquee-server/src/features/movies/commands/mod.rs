pub mod create;
pub mod delete;
pub mod update;

pub use create::CreateMovieCommand;
pub use delete::{DeleteMovieCommand, DeleteMovieResponse};
pub use update::UpdateMovieCommand;
