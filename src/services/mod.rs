pub mod aspect_ratio;
pub mod keys;
pub mod object_storage;
