//! 워크스페이스 전반에서 사용되는 공통 타입.

mod entity;
mod metric;
mod series;

pub use entity::*;
pub use metric::*;
pub use series::*;
