pub mod context;
pub mod curve;
pub mod items;
pub mod meta;
pub mod profile;
pub mod scoring;
pub mod story;
pub mod tags;
