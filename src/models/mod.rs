pub mod itinerary;
pub mod session;
pub mod stop;
pub mod trip;
