pub mod learning;
pub mod note_name;
pub mod practice;
