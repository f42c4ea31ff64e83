pub mod cloudinary;
pub mod db;
pub mod stripe;
