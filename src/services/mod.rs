// Service exports
pub mod auth;
pub mod matches;
pub mod pets;
pub mod sitters;
pub mod users;
pub mod vision;

pub use auth::{AuthService, Claims};
pub use matches::MatchService;
pub use pets::PetService;
pub use sitters::SitterService;
pub use users::{NewUser, UserService};
pub use vision::VisionClient;
