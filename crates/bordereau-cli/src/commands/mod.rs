pub mod columns;
pub mod export;
pub mod inspect;
