pub mod education;
pub mod experience;
pub mod skills;
pub mod text;
