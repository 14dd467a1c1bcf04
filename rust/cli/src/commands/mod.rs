pub mod collection;
pub mod execute;
