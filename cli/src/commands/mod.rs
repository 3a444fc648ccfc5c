pub mod compose;
pub mod export;
pub mod fetch;
pub mod inspect;
