pub mod completion;
pub mod subscription;
pub mod workout;
