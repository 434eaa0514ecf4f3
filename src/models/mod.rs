pub mod booking;
pub mod salon;
pub mod user;

pub use booking::{Booking, BookingEvent, BookingRequest, BookingStatus, Slot};
pub use salon::{NewSalon, NewService, Salon, Service};
pub use user::User;
