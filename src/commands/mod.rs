pub mod export;
pub mod harvest;
pub mod run;
