pub mod auth;
pub mod models;
mod publisher;
pub mod token;

pub use models::{CreatedEvent, NewCalendarEvent};
pub use publisher::{EventPublisher, GoogleCalendarPublisher};
pub use token::{StoredToken, TokenManager};
