pub mod clothing;
pub mod cooking;
pub mod fuel;
pub mod pet_age;
pub mod shoe;
pub mod speed;
pub mod unit;

pub use clothing::ClothingSizeConverter;
pub use cooking::CookingConverter;
pub use fuel::FuelEconomyConverter;
pub use pet_age::PetAgeConverter;
pub use shoe::ShoeSizeConverter;
pub use speed::SpeedConverter;
pub use unit::UnitConverter;
