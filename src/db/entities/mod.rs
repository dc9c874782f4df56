//! Database entities

pub mod family;
pub mod farmer;
pub mod farmer_family;
pub mod user;
pub mod vegetable;
pub mod vegetable_family;
pub mod vegetable_instance;

pub use family::Entity as Family;
pub use farmer::Entity as Farmer;
pub use farmer_family::Entity as FarmerFamily;
pub use user::Entity as User;
pub use vegetable::Entity as Vegetable;
pub use vegetable_family::Entity as VegetableFamily;
pub use vegetable_instance::Entity as VegetableInstance;
