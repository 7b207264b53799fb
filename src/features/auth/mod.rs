pub mod guards;
pub mod model;
pub mod validator;

pub use model::{AuthenticatedUser, Role};
pub use validator::JwtValidator;
