pub mod builder;
pub mod smoothing;
pub mod snapshot;
pub mod sync;
pub mod topk;
