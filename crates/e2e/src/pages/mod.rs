//! Page objects for the shop

pub mod home;

pub use home::HomePage;
