pub mod catalog;
pub mod frame_id;
pub mod sequence;
