//! Domain models for the API.

pub mod favorite;
pub mod place;
pub mod user;
pub mod visit;

pub use favorite::{Favorite, NewFavorite};
pub use place::{CoffeeShop, CoffeeShopDetails};
pub use user::{NewUser, Principal, User};
pub use visit::{NewVisit, Visit};
