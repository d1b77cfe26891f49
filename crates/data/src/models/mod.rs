//! Persisted entities and the display read model.
//!
//! Each entity mirrors one backend collection; field names match the wire
//! columns (snake_case), with any divergence declared via serde attributes.
//! Display-only projections live in [`view`], never on the entities.

pub mod item;
pub mod offering;
pub mod payment;
pub mod request;
pub mod shop;
pub mod status_update;
pub mod user;
pub mod vehicle;
pub mod view;

pub use item::RequestItem;
pub use offering::ServiceOffering;
pub use payment::Payment;
pub use request::ServiceRequest;
pub use shop::MechanicShop;
pub use status_update::ServiceStatusUpdate;
pub use user::User;
pub use vehicle::Vehicle;
pub use view::RequestView;
