pub mod coach;
pub mod courses;
pub mod lessons;
pub mod orders;
pub mod reviews;
