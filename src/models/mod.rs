pub mod response;
pub mod todo;
pub mod user;

pub use response::ApiMessage;
pub use todo::{InsertTodoParams, NewTodo, PatchValue, Todo, TodoPatch, UpdateTodoParams};
pub use user::User;
